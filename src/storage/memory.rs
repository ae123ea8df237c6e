//! Ephemeral in-memory backend
//!
//! Keeps the archive document behind a mutex, with the same merge and
//! delete semantics as the durable backends. Contents are lost when the
//! process exits; this is the fallback when no storage location is usable,
//! and the fixture backend for tests.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::Utc;
use tracing::error;
use uuid::Uuid;

use crate::models::{IncomingMail, IncomingMailPatch, OutgoingMail, OutgoingMailPatch};

use super::codec::{decode_archive_strict, encode_archive, MailArchive};
use super::{BackendKind, ImportReport, MailStore, StorageError, StorageInfo};

/// In-process key-value backend
pub struct MemoryStore {
    inner: Mutex<MailArchive>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MailArchive::default()),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, MailArchive>, StorageError> {
        self.inner.lock().map_err(|_| StorageError::Lock)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MailStore for MemoryStore {
    fn save_incoming(&self, mail: IncomingMail) -> Result<String, StorageError> {
        let mut archive = self.lock()?;
        let id = mail.id.clone();
        archive.incoming_mails.push(mail);
        archive.touch();
        Ok(id)
    }

    fn save_outgoing(&self, mail: OutgoingMail) -> Result<String, StorageError> {
        let mut archive = self.lock()?;
        let id = mail.id.clone();
        archive.outgoing_mails.push(mail);
        archive.touch();
        Ok(id)
    }

    fn update_incoming(&self, id: &str, patch: &IncomingMailPatch) -> Result<bool, StorageError> {
        let mut archive = self.lock()?;
        match archive.incoming_mails.iter_mut().find(|m| m.id == id) {
            Some(mail) => {
                patch.apply_to(mail);
                archive.touch();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn update_outgoing(&self, id: &str, patch: &OutgoingMailPatch) -> Result<bool, StorageError> {
        let mut archive = self.lock()?;
        match archive.outgoing_mails.iter_mut().find(|m| m.id == id) {
            Some(mail) => {
                patch.apply_to(mail);
                archive.touch();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn all_incoming(&self) -> Result<Vec<IncomingMail>, StorageError> {
        Ok(self.lock()?.incoming_mails.clone())
    }

    fn all_outgoing(&self) -> Result<Vec<OutgoingMail>, StorageError> {
        Ok(self.lock()?.outgoing_mails.clone())
    }

    fn delete_incoming(&self, id: &str) -> Result<bool, StorageError> {
        let mut archive = self.lock()?;
        let before = archive.incoming_mails.len();
        archive.incoming_mails.retain(|m| m.id != id);
        let removed = archive.incoming_mails.len() < before;
        if removed {
            archive.touch();
        }
        Ok(removed)
    }

    fn delete_outgoing(&self, id: &str) -> Result<bool, StorageError> {
        let mut archive = self.lock()?;
        let before = archive.outgoing_mails.len();
        archive.outgoing_mails.retain(|m| m.id != id);
        let removed = archive.outgoing_mails.len() < before;
        if removed {
            archive.touch();
        }
        Ok(removed)
    }

    fn export_all(&self, dest_dir: &Path) -> Result<PathBuf, StorageError> {
        let mut snapshot = self.lock()?.clone();
        snapshot.touch();
        let path = dest_dir.join(super::export_filename(Utc::now()));
        let json = encode_archive(&snapshot)?;
        super::atomic_fs::atomic_write_str(&path, &json)?;
        Ok(path)
    }

    fn import_all(&self, src: &Path) -> Result<ImportReport, StorageError> {
        let content = std::fs::read_to_string(src)?;
        let imported = match decode_archive_strict(&content) {
            Ok(archive) => archive,
            Err(e) => {
                error!("document d'import illisible: {e}");
                return Err(e.into());
            }
        };

        let mut report = ImportReport::default();
        let mut archive = self.lock()?;
        for mut mail in imported.incoming_mails {
            mail.id = Uuid::new_v4().to_string();
            archive.incoming_mails.push(mail);
            report.imported_count += 1;
        }
        for mut mail in imported.outgoing_mails {
            mail.id = Uuid::new_v4().to_string();
            archive.outgoing_mails.push(mail);
            report.imported_count += 1;
        }
        archive.touch();
        report.success = report.errors.is_empty();
        Ok(report)
    }

    fn info(&self) -> StorageInfo {
        StorageInfo {
            kind: BackendKind::Memory,
            location: "mémoire".to_string(),
        }
    }
}
