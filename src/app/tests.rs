//! Unit tests for the application root

use chrono::{TimeZone, Utc};
use tempfile::TempDir;

use crate::audit::AuditEntityType;
use crate::models::{
    IncomingMail, MailMedium, MailStatus, MailType, OutgoingMail, OutgoingMailPatch,
};
use crate::storage::BackendKind;

use super::*;

fn incoming(day: u32) -> IncomingMail {
    IncomingMail {
        id: String::new(),
        chrono_number: format!("ARR-2024-{day:03}"),
        date: Utc.with_ymd_and_hms(2024, 3, day, 9, 0, 0).unwrap(),
        issue_date: None,
        medium: MailMedium::Physical,
        subject: "Demande de certification".to_string(),
        observations: None,
        document_link: None,
        status: MailStatus::default(),
        mail_type: MailType::Administrative,
        response_date: None,
        sender_name: "Société Exemple".to_string(),
        sender_address: "BP 164 Douala".to_string(),
        recipient_service: "Normalisation".to_string(),
    }
}

fn outgoing(day: u32) -> OutgoingMail {
    OutgoingMail {
        id: String::new(),
        chrono_number: format!("DEP-2024-{day:03}"),
        date: Utc.with_ymd_and_hms(2024, 3, day, 15, 0, 0).unwrap(),
        issue_date: None,
        medium: MailMedium::Email,
        subject: "Réponse certification".to_string(),
        observations: None,
        document_link: None,
        status: MailStatus::Completed,
        correspondent: "Société Exemple".to_string(),
        address: "BP 164 Douala".to_string(),
        service: "Normalisation".to_string(),
        writer: "Jean Dupont".to_string(),
    }
}

fn open_registry(root: &TempDir) -> Registry {
    Registry::open(AppPaths::rooted_at(root.path())).unwrap()
}

#[test]
fn test_open_selects_database_backend_by_default() {
    let root = TempDir::new().unwrap();
    let registry = open_registry(&root);
    assert_eq!(registry.storage_info().kind, BackendKind::Database);
    assert!(root.path().join("config/config.toml").exists());
}

#[test]
fn test_register_assigns_id_and_audits() {
    let root = TempDir::new().unwrap();
    let registry = open_registry(&root);

    let id = registry.register_incoming(incoming(10)).unwrap();
    assert!(!id.is_empty());

    let all = registry.all_incoming().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].id, id);
    // New records default to Pending
    assert_eq!(all[0].status, MailStatus::Pending);

    let entries = registry.audit().entries_for(AuditEntityType::IncomingMail, &id);
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, "CREATE");
}

#[test]
fn test_update_and_delete_audit_only_on_success() {
    let root = TempDir::new().unwrap();
    let registry = open_registry(&root);
    let id = registry.register_outgoing(outgoing(15)).unwrap();

    assert!(!registry
        .update_outgoing("absent", &OutgoingMailPatch::default())
        .unwrap());
    assert!(registry
        .update_outgoing(&id, &OutgoingMailPatch::status(MailStatus::Processing))
        .unwrap());
    assert!(registry.delete_outgoing(&id).unwrap());
    assert!(!registry.delete_outgoing(&id).unwrap());

    let actions: Vec<String> = registry
        .audit()
        .entries_for(AuditEntityType::OutgoingMail, &id)
        .into_iter()
        .map(|e| e.action)
        .collect();
    assert_eq!(actions, vec!["CREATE", "EDIT", "DELETE"]);
}

#[test]
fn test_monthly_stats_through_registry() {
    let root = TempDir::new().unwrap();
    let registry = open_registry(&root);
    registry.register_incoming(incoming(10)).unwrap();
    registry.register_outgoing(outgoing(15)).unwrap();

    let stats = registry.monthly_stats().unwrap();
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].month, "Mars");
    assert_eq!(stats[0].year, 2024);
    assert_eq!(stats[0].incoming_count, 1);
    assert_eq!(stats[0].outgoing_count, 1);
}

#[test]
fn test_license_through_registry() {
    let root = TempDir::new().unwrap();
    let registry = open_registry(&root);

    let check = registry.license_status().unwrap();
    assert!(check.is_valid);
    assert_eq!(check.days_remaining, 90);

    let outcome = registry.activate_license("pas-une-clé").unwrap();
    assert!(!outcome.success);
}

#[test]
fn test_export_writes_snapshot_and_audits() {
    let root = TempDir::new().unwrap();
    let registry = open_registry(&root);
    registry.register_incoming(incoming(10)).unwrap();

    let path = registry.export(None).unwrap();
    assert!(path.exists());
    assert!(path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("export-courriers-"));

    let exports = registry
        .audit()
        .entries_for(AuditEntityType::System, "statistics");
    assert_eq!(exports.len(), 1);
    assert_eq!(exports[0].action, "EXPORT");
}

#[test]
fn test_enable_file_system_storage_migrates_and_repoints() {
    let root = TempDir::new().unwrap();
    let storage = TempDir::new().unwrap();

    let mut registry = open_registry(&root);
    registry.register_incoming(incoming(10)).unwrap();
    registry.register_outgoing(outgoing(15)).unwrap();

    let result = registry
        .enable_file_system_storage(storage.path())
        .unwrap();
    assert!(result.success);
    assert_eq!(result.incoming_count, 1);
    assert_eq!(result.outgoing_count, 1);

    // The running registry switched backends
    assert_eq!(registry.storage_info().kind, BackendKind::FileSystem);
    assert_eq!(registry.all_incoming().unwrap().len(), 1);

    // A later startup honors the repointed configuration
    let reopened = open_registry(&root);
    assert_eq!(reopened.storage_info().kind, BackendKind::FileSystem);
    assert_eq!(reopened.all_incoming().unwrap().len(), 1);
}
