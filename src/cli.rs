//! Command-line surface over the registry
//!
//! A thin administrative front end: every subcommand delegates to
//! [`Registry`] and prints plain-text results. The graphical client talks
//! to the same library.

use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::app::{AppPaths, Registry};
use crate::error::AppError;
use crate::license;
use crate::models::{
    IncomingMail, IncomingMailPatch, MailMedium, MailStatus, MailType, OutgoingMail,
    OutgoingMailPatch,
};
use crate::stats::calculator::prepare_bar_chart_data;

/// Registre de courrier administratif
#[derive(Parser)]
#[command(name = "courrier")]
#[command(about = "Registre de courrier administratif d'un service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Racine des répertoires de configuration et de données
    /// (répertoires de la plateforme par défaut)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Enregistrer un courrier entrant
    RegisterIncoming(RegisterIncomingArgs),
    /// Enregistrer un courrier sortant
    RegisterOutgoing(RegisterOutgoingArgs),
    /// Lister les courriers enregistrés
    List {
        #[arg(value_enum)]
        direction: Direction,
    },
    /// Changer le statut d'un courrier
    SetStatus {
        #[arg(value_enum)]
        direction: Direction,
        id: String,
        #[arg(value_enum)]
        status: StatusArg,
    },
    /// Supprimer un courrier
    Delete {
        #[arg(value_enum)]
        direction: Direction,
        id: String,
    },
    /// Statistiques mensuelles
    Stats,
    /// Courriers entrants en retard
    Overdue,
    /// Vue d'ensemble du registre
    Dashboard,
    /// Gestion de la licence
    License {
        #[command(subcommand)]
        action: LicenseAction,
    },
    /// Exporter toutes les données vers un fichier JSON daté
    Export {
        /// Dossier de destination (dossier de données par défaut)
        #[arg(long)]
        dest: Option<PathBuf>,
    },
    /// Importer les courriers d'un fichier exporté
    Import {
        file: PathBuf,
    },
    /// Activer le stockage fichier dans un dossier choisi
    EnableFileStorage {
        dir: PathBuf,
    },
    /// État du stockage et de la configuration
    Status,
}

#[derive(Subcommand)]
pub enum LicenseAction {
    /// État de la licence
    Status,
    /// Appliquer une clé d'activation
    Activate { key: String },
    /// Générer une clé d'activation bien formée
    GenerateKey,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Direction {
    Incoming,
    Outgoing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MediumArg {
    Email,
    Physical,
    Fax,
    Other,
}

impl From<MediumArg> for MailMedium {
    fn from(value: MediumArg) -> Self {
        match value {
            MediumArg::Email => MailMedium::Email,
            MediumArg::Physical => MailMedium::Physical,
            MediumArg::Fax => MailMedium::Fax,
            MediumArg::Other => MailMedium::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MailTypeArg {
    Administrative,
    Technical,
    Commercial,
    Financial,
    Other,
}

impl From<MailTypeArg> for MailType {
    fn from(value: MailTypeArg) -> Self {
        match value {
            MailTypeArg::Administrative => MailType::Administrative,
            MailTypeArg::Technical => MailType::Technical,
            MailTypeArg::Commercial => MailType::Commercial,
            MailTypeArg::Financial => MailType::Financial,
            MailTypeArg::Other => MailType::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Pending,
    Processing,
    Completed,
    Overdue,
}

impl From<StatusArg> for MailStatus {
    fn from(value: StatusArg) -> Self {
        match value {
            StatusArg::Pending => MailStatus::Pending,
            StatusArg::Processing => MailStatus::Processing,
            StatusArg::Completed => MailStatus::Completed,
            StatusArg::Overdue => MailStatus::Overdue,
        }
    }
}

#[derive(Args)]
pub struct RegisterIncomingArgs {
    /// Numéro chrono du courrier
    pub chrono_number: String,
    pub subject: String,
    pub sender_name: String,
    pub sender_address: String,
    /// Service destinataire
    pub recipient_service: String,
    #[arg(long, value_enum, default_value_t = MailTypeArg::Other)]
    pub mail_type: MailTypeArg,
    #[arg(long, value_enum, default_value_t = MediumArg::Physical)]
    pub medium: MediumArg,
    /// Date d'enregistrement (AAAA-MM-JJ, aujourd'hui par défaut)
    #[arg(long)]
    pub date: Option<String>,
    /// Date d'émission (AAAA-MM-JJ)
    #[arg(long)]
    pub issue_date: Option<String>,
    /// Date limite de réponse (AAAA-MM-JJ)
    #[arg(long)]
    pub response_date: Option<String>,
    #[arg(long)]
    pub observations: Option<String>,
    #[arg(long)]
    pub document_link: Option<String>,
}

#[derive(Args)]
pub struct RegisterOutgoingArgs {
    /// Numéro chrono du courrier
    pub chrono_number: String,
    pub subject: String,
    /// Destinataire de la correspondance
    pub correspondent: String,
    pub address: String,
    /// Service émetteur
    pub service: String,
    /// Rédacteur
    pub writer: String,
    #[arg(long, value_enum, default_value_t = MediumArg::Physical)]
    pub medium: MediumArg,
    /// Date d'enregistrement (AAAA-MM-JJ, aujourd'hui par défaut)
    #[arg(long)]
    pub date: Option<String>,
    #[arg(long)]
    pub observations: Option<String>,
}

/// Parse an `AAAA-MM-JJ` argument to a UTC timestamp at midnight
fn parse_date(value: &str) -> Result<DateTime<Utc>, AppError> {
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| AppError::internal(format!("date invalide (AAAA-MM-JJ attendu): {value}")))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| AppError::internal(format!("date invalide: {value}")))?;
    Ok(Utc.from_utc_datetime(&midnight))
}

fn parse_date_arg(value: &Option<String>) -> Result<DateTime<Utc>, AppError> {
    match value {
        Some(v) => parse_date(v),
        None => Ok(Utc::now()),
    }
}

fn parse_opt_date_arg(value: &Option<String>) -> Result<Option<DateTime<Utc>>, AppError> {
    value.as_deref().map(parse_date).transpose()
}

fn day(date: &DateTime<Utc>) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Execute a parsed command
pub fn run(cli: Cli) -> Result<(), AppError> {
    let paths = match &cli.data_dir {
        Some(root) => AppPaths::rooted_at(root),
        None => AppPaths::discover()
            .ok_or_else(|| AppError::internal("répertoires utilisateur introuvables"))?,
    };
    let mut registry = Registry::open(paths)?;

    match cli.command {
        Command::RegisterIncoming(args) => {
            let mail = IncomingMail {
                id: String::new(),
                chrono_number: args.chrono_number.clone(),
                date: parse_date_arg(&args.date)?,
                issue_date: parse_opt_date_arg(&args.issue_date)?,
                medium: args.medium.into(),
                subject: args.subject.clone(),
                observations: args.observations.clone(),
                document_link: args.document_link.clone(),
                status: MailStatus::default(),
                mail_type: args.mail_type.into(),
                response_date: parse_opt_date_arg(&args.response_date)?,
                sender_name: args.sender_name.clone(),
                sender_address: args.sender_address.clone(),
                recipient_service: args.recipient_service.clone(),
            };
            let id = registry.register_incoming(mail)?;
            println!("Courrier entrant {} enregistré ({id})", args.chrono_number);
        }
        Command::RegisterOutgoing(args) => {
            let mail = OutgoingMail {
                id: String::new(),
                chrono_number: args.chrono_number.clone(),
                date: parse_date_arg(&args.date)?,
                issue_date: None,
                medium: args.medium.into(),
                subject: args.subject.clone(),
                observations: args.observations.clone(),
                document_link: None,
                status: MailStatus::default(),
                correspondent: args.correspondent.clone(),
                address: args.address.clone(),
                service: args.service.clone(),
                writer: args.writer.clone(),
            };
            let id = registry.register_outgoing(mail)?;
            println!("Courrier sortant {} enregistré ({id})", args.chrono_number);
        }
        Command::List { direction } => match direction {
            Direction::Incoming => {
                for mail in registry.all_incoming()? {
                    println!(
                        "{}  {}  {}  [{}]  {}  ({})",
                        mail.id,
                        mail.chrono_number,
                        day(&mail.date),
                        mail.status.as_str(),
                        mail.subject,
                        mail.sender_name
                    );
                }
            }
            Direction::Outgoing => {
                for mail in registry.all_outgoing()? {
                    println!(
                        "{}  {}  {}  [{}]  {}  ({})",
                        mail.id,
                        mail.chrono_number,
                        day(&mail.date),
                        mail.status.as_str(),
                        mail.subject,
                        mail.correspondent
                    );
                }
            }
        },
        Command::SetStatus {
            direction,
            id,
            status,
        } => {
            let updated = match direction {
                Direction::Incoming => registry
                    .update_incoming(&id, &IncomingMailPatch::status(status.into()))?,
                Direction::Outgoing => registry
                    .update_outgoing(&id, &OutgoingMailPatch::status(status.into()))?,
            };
            if updated {
                println!("Statut mis à jour");
            } else {
                println!("Aucun courrier avec l'identifiant {id}");
            }
        }
        Command::Delete { direction, id } => {
            let deleted = match direction {
                Direction::Incoming => registry.delete_incoming(&id)?,
                Direction::Outgoing => registry.delete_outgoing(&id)?,
            };
            if deleted {
                println!("Courrier supprimé");
            } else {
                println!("Aucun courrier avec l'identifiant {id}");
            }
        }
        Command::Stats => {
            let stats = registry.monthly_stats()?;
            if stats.is_empty() {
                println!("Aucun courrier enregistré");
            } else {
                for row in prepare_bar_chart_data(&stats) {
                    println!(
                        "{:<20} entrants: {:>4}  départs: {:>4}",
                        row.name, row.incoming, row.outgoing
                    );
                }
            }
        }
        Command::Overdue => {
            let overdue = registry.overdue()?;
            if overdue.is_empty() {
                println!("Aucun courrier en retard");
            } else {
                println!("Courriers en retard ({})", overdue.len());
                for mail in overdue {
                    println!(
                        "{}  {}  {}  {}",
                        mail.id,
                        mail.chrono_number,
                        day(&mail.date),
                        mail.subject
                    );
                }
            }
        }
        Command::Dashboard => {
            let summary = registry.dashboard()?;
            let report = registry.performance()?;
            println!("Courriers entrants : {}", summary.total_incoming);
            println!("Courriers sortants : {}", summary.total_outgoing);
            println!("En attente         : {}", summary.pending);
            println!("Traités            : {}", summary.processed);
            println!("En retard          : {}", summary.overdue_mails.len());
            for metric in report.metric_rows() {
                println!("{:<24}: {} ({})", metric.label, metric.value, metric.description);
            }
        }
        Command::License { action } => match action {
            LicenseAction::Status => {
                let check = registry.license_status()?;
                println!("Statut           : {}", check.license.status.as_str());
                println!("Jours restants   : {}", check.days_remaining);
                println!("Identifiant      : {}", check.license.user_id);
                if !check.is_valid {
                    println!("Licence expirée, saisir une clé d'activation");
                }
                if check.license.status != crate::models::LicenseStatus::Active {
                    println!("Prix licence     : {} FCFA", license::LICENSE_PRICE_FCFA);
                }
            }
            LicenseAction::Activate { key } => {
                let outcome = registry.activate_license(&key)?;
                println!("{}", outcome.message);
                if !outcome.success {
                    std::process::exit(1);
                }
            }
            LicenseAction::GenerateKey => {
                println!("{}", license::generate_key());
            }
        },
        Command::Export { dest } => {
            let path = registry.export(dest.as_deref())?;
            println!("Données exportées vers {}", path.display());
        }
        Command::Import { file } => {
            let report = registry.import(&file)?;
            println!("{} courriers importés", report.imported_count);
            for error in &report.errors {
                eprintln!("  {error}");
            }
        }
        Command::EnableFileStorage { dir } => {
            let result = registry.enable_file_system_storage(&dir)?;
            println!(
                "Stockage fichier activé: {} entrants et {} sortants migrés",
                result.incoming_count, result.outgoing_count
            );
            for error in &result.errors {
                eprintln!("  {error}");
            }
        }
        Command::Status => {
            let info = registry.storage_info();
            let check = registry.license_status()?;
            println!("Service   : {}", registry.config().service_name);
            println!("Stockage  : {} ({})", info.kind.as_str(), info.location);
            println!(
                "Licence   : {} ({} jours restants)",
                if check.is_valid { "valide" } else { "expirée" },
                check.days_remaining
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        let date = parse_date("2024-03-10").unwrap();
        assert_eq!(day(&date), "10/03/2024");
        assert!(parse_date("10/03/2024").is_err());
        assert!(parse_date("2024-13-40").is_err());
    }

    #[test]
    fn test_cli_parses_register_incoming() {
        let cli = Cli::try_parse_from([
            "courrier",
            "register-incoming",
            "ARR-2024-001",
            "Demande de certification",
            "Société Exemple",
            "BP 164 Douala",
            "Normalisation",
            "--mail-type",
            "administrative",
            "--date",
            "2024-03-10",
        ])
        .unwrap();

        match cli.command {
            Command::RegisterIncoming(args) => {
                assert_eq!(args.chrono_number, "ARR-2024-001");
                assert_eq!(args.mail_type, MailTypeArg::Administrative);
                assert_eq!(args.medium, MediumArg::Physical);
            }
            _ => panic!("mauvaise commande"),
        }
    }

    #[test]
    fn test_cli_parses_license_activate() {
        let cli = Cli::try_parse_from([
            "courrier",
            "license",
            "activate",
            "ANOR-AB12-CD34-EF56-GH78",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::License {
                action: LicenseAction::Activate { .. }
            }
        ));
    }

    #[test]
    fn test_cli_rejects_unknown_status() {
        assert!(Cli::try_parse_from(["courrier", "set-status", "incoming", "id", "archived"])
            .is_err());
    }
}
