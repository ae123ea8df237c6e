//! Application configuration
//!
//! Loaded from `config.toml` in the configuration directory. Missing or
//! unreadable files fall back to the built-in defaults; unknown fields are
//! ignored so older files keep loading after upgrades.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::storage::atomic_fs::atomic_write_str;

/// Configuration file name inside the configuration directory
pub const CONFIG_FILENAME: &str = "config.toml";

/// Configuration persistence error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("erreur d'accès au fichier de configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("erreur d'écriture de la configuration: {0}")]
    Encode(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Fr,
    En,
}

/// General application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: Theme,
    pub language: Language,
    pub auto_save: bool,
    /// Minutes between best-effort export snapshots
    pub backup_frequency_minutes: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            language: Language::Fr,
            auto_save: true,
            backup_frequency_minutes: 5,
        }
    }
}

/// One office bureau and its staff
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bureau {
    pub name: String,
    #[serde(default)]
    pub employees: Vec<String>,
}

/// Persisted application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub service_name: String,
    pub custom_logo: Option<String>,
    /// User-chosen directory for the file-bridge backend; `None` keeps the
    /// registry on the structured database
    pub storage_location: Option<PathBuf>,
    pub bureaus: BTreeMap<String, Bureau>,
    pub settings: Settings,
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut bureaus = BTreeMap::new();
        bureaus.insert(
            "normalisation".to_string(),
            Bureau {
                name: "Normalisation".to_string(),
                employees: vec!["Jean Dupont".to_string(), "Marie Martin".to_string()],
            },
        );
        bureaus.insert(
            "promotion".to_string(),
            Bureau {
                name: "Promotion".to_string(),
                employees: vec!["Kome Ntengue".to_string(), "Amougou Noelle".to_string()],
            },
        );
        bureaus.insert(
            "controle".to_string(),
            Bureau {
                name: "Contrôle Qualité".to_string(),
                employees: vec!["Pierre Durand".to_string(), "Sophie Lambert".to_string()],
            },
        );
        bureaus.insert(
            "pecae".to_string(),
            Bureau {
                name: "PECAE".to_string(),
                employees: vec!["Michel Bernard".to_string(), "Julie Moreau".to_string()],
            },
        );
        bureaus.insert(
            "certification".to_string(),
            Bureau {
                name: "Certification Produits Locaux".to_string(),
                employees: vec!["Ngam Giovanni".to_string(), "Ondoa Magalie".to_string()],
            },
        );

        Self {
            service_name: "ANOR - Service Technique".to_string(),
            custom_logo: None,
            storage_location: None,
            bureaus,
            settings: Settings::default(),
        }
    }
}

impl AppConfig {
    /// Load the configuration at `path`
    ///
    /// A missing file yields the defaults; an unreadable one is logged and
    /// also yields the defaults, so a corrupt configuration never prevents
    /// startup.
    pub fn load(path: &Path) -> Self {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                warn!("lecture de la configuration impossible: {e}");
                return Self::default();
            }
        };
        match toml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!("configuration illisible, valeurs par défaut utilisées: {e}");
                Self::default()
            }
        }
    }

    /// Load the configuration, writing the default file on first use
    pub fn load_or_init(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }
        Ok(Self::load(path))
    }

    /// Persist the configuration at `path`
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        atomic_write_str(path, &content)?;
        Ok(())
    }

    /// Every employee across bureaus, sorted and deduplicated
    pub fn all_employees(&self) -> Vec<String> {
        let set: BTreeSet<String> = self
            .bureaus
            .values()
            .flat_map(|b| b.employees.iter().cloned())
            .collect();
        set.into_iter().collect()
    }

    /// Add an employee to a bureau; `false` when the bureau is unknown or
    /// the name is already present
    pub fn add_employee(&mut self, bureau_key: &str, name: &str) -> bool {
        match self.bureaus.get_mut(bureau_key) {
            Some(bureau) if !bureau.employees.iter().any(|e| e == name) => {
                bureau.employees.push(name.to_string());
                true
            }
            _ => false,
        }
    }

    /// Remove an employee from a bureau; `false` when nothing was removed
    pub fn remove_employee(&mut self, bureau_key: &str, name: &str) -> bool {
        match self.bureaus.get_mut(bureau_key) {
            Some(bureau) => {
                let before = bureau.employees.len();
                bureau.employees.retain(|e| e != name);
                bureau.employees.len() < before
            }
            None => false,
        }
    }
}
