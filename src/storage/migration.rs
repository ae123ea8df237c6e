//! Cross-backend record migration
//!
//! Used by the "enable file-system storage" action: records are copied one
//! by one into the target backend under fresh ids, and per-record failures
//! are collected instead of aborting the whole migration.

use serde::Serialize;
use tracing::error;
use uuid::Uuid;

use super::{MailStore, StorageError};

/// Outcome of a backend-to-backend migration
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationResult {
    pub success: bool,
    pub incoming_count: u32,
    pub outgoing_count: u32,
    pub errors: Vec<String>,
}

/// Copy every record from `source` into `target`
pub fn migrate_store(
    source: &dyn MailStore,
    target: &dyn MailStore,
) -> Result<MigrationResult, StorageError> {
    let mut result = MigrationResult::default();

    for mut mail in source.all_incoming()? {
        let chrono = mail.chrono_number.clone();
        mail.id = Uuid::new_v4().to_string();
        match target.save_incoming(mail) {
            Ok(_) => result.incoming_count += 1,
            Err(e) => {
                error!("migration du courrier entrant {chrono} échouée: {e}");
                result
                    .errors
                    .push(format!("courrier entrant {chrono}: {e}"));
            }
        }
    }

    for mut mail in source.all_outgoing()? {
        let chrono = mail.chrono_number.clone();
        mail.id = Uuid::new_v4().to_string();
        match target.save_outgoing(mail) {
            Ok(_) => result.outgoing_count += 1,
            Err(e) => {
                error!("migration du courrier sortant {chrono} échouée: {e}");
                result
                    .errors
                    .push(format!("courrier sortant {chrono}: {e}"));
            }
        }
    }

    result.success = result.errors.is_empty();
    Ok(result)
}
