//! Audit trail of registry actions
//!
//! Append-only JSON log next to the mail data, capped to the most recent
//! 1000 entries. Writing an audit entry never blocks the operation being
//! audited: failures are logged and swallowed.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::storage::atomic_fs::atomic_write_str;

/// Audit file name inside the application data directory
const AUDIT_FILENAME: &str = "audit-log.json";

/// Entries kept when the log is trimmed
const MAX_ENTRIES: usize = 1000;

/// Placeholder until an account system exists
const DEFAULT_USER: &str = "current_user";

/// Kind of entity an audit entry refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEntityType {
    IncomingMail,
    OutgoingMail,
    Document,
    System,
}

/// One recorded action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub user_id: String,
    /// Action verb: CREATE, EDIT, DELETE, VIEW, EXPORT
    pub action: String,
    pub entity_type: AuditEntityType,
    pub entity_id: String,
    pub details: String,
}

/// Capped audit log backed by one JSON file
pub struct AuditLog {
    path: PathBuf,
}

impl AuditLog {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(AUDIT_FILENAME),
        }
    }

    /// Record an action; never fails the caller
    pub fn log(
        &self,
        action: &str,
        entity_type: AuditEntityType,
        entity_id: &str,
        details: String,
    ) {
        let entry = AuditEntry {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            user_id: DEFAULT_USER.to_string(),
            action: action.to_string(),
            entity_type,
            entity_id: entity_id.to_string(),
            details,
        };

        let mut entries = self.entries();
        entries.push(entry);
        if entries.len() > MAX_ENTRIES {
            let excess = entries.len() - MAX_ENTRIES;
            entries.drain(..excess);
        }

        let json = match serde_json::to_string_pretty(&entries) {
            Ok(json) => json,
            Err(e) => {
                warn!("sérialisation du journal d'audit impossible: {e}");
                return;
            }
        };
        if let Err(e) = atomic_write_str(&self.path, &json) {
            warn!("écriture du journal d'audit impossible: {e}");
        }
    }

    /// All recorded entries, oldest first
    pub fn entries(&self) -> Vec<AuditEntry> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!("lecture du journal d'audit impossible: {e}");
                return Vec::new();
            }
        };
        match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("journal d'audit illisible: {e}");
                Vec::new()
            }
        }
    }

    /// Entries about one specific entity
    pub fn entries_for(&self, entity_type: AuditEntityType, entity_id: &str) -> Vec<AuditEntry> {
        self.entries()
            .into_iter()
            .filter(|e| e.entity_type == entity_type && e.entity_id == entity_id)
            .collect()
    }

    /// Drop all recorded entries
    pub fn clear(&self) -> std::io::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    // Helpers for the common registry actions

    pub fn log_mail_create(&self, entity_type: AuditEntityType, mail_id: &str, chrono: &str) {
        self.log(
            "CREATE",
            entity_type,
            mail_id,
            format!("Création du courrier {chrono}"),
        );
    }

    pub fn log_mail_edit(&self, entity_type: AuditEntityType, mail_id: &str, chrono: &str) {
        let details = if chrono.is_empty() {
            "Modification du courrier".to_string()
        } else {
            format!("Modification du courrier {chrono}")
        };
        self.log("EDIT", entity_type, mail_id, details);
    }

    pub fn log_mail_delete(&self, entity_type: AuditEntityType, mail_id: &str) {
        self.log(
            "DELETE",
            entity_type,
            mail_id,
            "Suppression du courrier".to_string(),
        );
    }

    pub fn log_export(&self, count: usize) {
        self.log(
            "EXPORT",
            AuditEntityType::System,
            "statistics",
            format!("Export de {count} enregistrements"),
        );
    }
}
