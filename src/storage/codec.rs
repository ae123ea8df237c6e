//! Persisted archive document
//!
//! All JSON-backed persistence (file bridge, exports, in-memory snapshots)
//! goes through this one document shape:
//! `{ incomingMails, outgoingMails, version, lastModified }`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{IncomingMail, OutgoingMail};

/// Format version written into new documents
pub const ARCHIVE_VERSION: &str = "1.0.0";

/// File name of the main data document in a storage directory
pub const ARCHIVE_FILENAME: &str = "courriers-data.json";

/// Full registry snapshot as persisted on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MailArchive {
    #[serde(default)]
    pub incoming_mails: Vec<IncomingMail>,
    #[serde(default)]
    pub outgoing_mails: Vec<OutgoingMail>,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default = "Utc::now")]
    pub last_modified: DateTime<Utc>,
}

fn default_version() -> String {
    ARCHIVE_VERSION.to_string()
}

impl Default for MailArchive {
    fn default() -> Self {
        Self {
            incoming_mails: Vec::new(),
            outgoing_mails: Vec::new(),
            version: default_version(),
            last_modified: Utc::now(),
        }
    }
}

impl MailArchive {
    /// Refresh the modification stamp before a write
    pub fn touch(&mut self) {
        self.last_modified = Utc::now();
    }
}

/// Strictly decode an archive document
///
/// Used for imports, where a broken file must be reported to the user.
pub fn decode_archive_strict(content: &str) -> Result<MailArchive, serde_json::Error> {
    serde_json::from_str(content)
}

/// Leniently decode an archive document
///
/// Malformed persisted data is treated as an empty collection: the error is
/// logged and a fresh archive returned, so a corrupt file never wedges the
/// application.
pub fn decode_archive(content: &str) -> MailArchive {
    match serde_json::from_str(content) {
        Ok(archive) => archive,
        Err(e) => {
            warn!("document de courriers illisible, collections réinitialisées: {e}");
            MailArchive::default()
        }
    }
}

/// Encode an archive document for persistence (pretty-printed, like the
/// documents the desktop shell historically wrote)
pub fn encode_archive(archive: &MailArchive) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(archive)
}

#[cfg(test)]
mod tests;
