//! File-bridge backend
//!
//! One JSON document (`courriers-data.json`) in a user-chosen directory,
//! the layout the desktop shell historically wrote. Every operation loads
//! the whole document, mutates it in memory and writes it back atomically;
//! the last writer wins.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::warn;
use uuid::Uuid;

use crate::models::{IncomingMail, IncomingMailPatch, OutgoingMail, OutgoingMailPatch};

use super::atomic_fs::atomic_write_str;
use super::codec::{decode_archive, decode_archive_strict, encode_archive, MailArchive, ARCHIVE_FILENAME};
use super::{BackendKind, ImportReport, MailStore, StorageError, StorageInfo};

/// JSON-document backend rooted at a storage directory
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a storage directory, creating it if needed
    pub fn open(dir: &Path) -> Result<Self, StorageError> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn document_path(&self) -> PathBuf {
        self.dir.join(ARCHIVE_FILENAME)
    }

    /// Load the current document; a missing file is an empty archive and a
    /// malformed one is logged and reset
    fn load(&self) -> MailArchive {
        match fs::read_to_string(self.document_path()) {
            Ok(content) => decode_archive(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => MailArchive::default(),
            Err(e) => {
                warn!("lecture du document de courriers impossible: {e}");
                MailArchive::default()
            }
        }
    }

    fn store(&self, archive: &mut MailArchive) -> Result<(), StorageError> {
        archive.touch();
        let json = encode_archive(archive)?;
        atomic_write_str(&self.document_path(), &json)?;
        Ok(())
    }
}

impl MailStore for FileStore {
    fn save_incoming(&self, mail: IncomingMail) -> Result<String, StorageError> {
        let mut archive = self.load();
        let id = mail.id.clone();
        archive.incoming_mails.push(mail);
        self.store(&mut archive)?;
        Ok(id)
    }

    fn save_outgoing(&self, mail: OutgoingMail) -> Result<String, StorageError> {
        let mut archive = self.load();
        let id = mail.id.clone();
        archive.outgoing_mails.push(mail);
        self.store(&mut archive)?;
        Ok(id)
    }

    fn update_incoming(&self, id: &str, patch: &IncomingMailPatch) -> Result<bool, StorageError> {
        let mut archive = self.load();
        match archive.incoming_mails.iter_mut().find(|m| m.id == id) {
            Some(mail) => {
                patch.apply_to(mail);
                self.store(&mut archive)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn update_outgoing(&self, id: &str, patch: &OutgoingMailPatch) -> Result<bool, StorageError> {
        let mut archive = self.load();
        match archive.outgoing_mails.iter_mut().find(|m| m.id == id) {
            Some(mail) => {
                patch.apply_to(mail);
                self.store(&mut archive)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn all_incoming(&self) -> Result<Vec<IncomingMail>, StorageError> {
        Ok(self.load().incoming_mails)
    }

    fn all_outgoing(&self) -> Result<Vec<OutgoingMail>, StorageError> {
        Ok(self.load().outgoing_mails)
    }

    fn delete_incoming(&self, id: &str) -> Result<bool, StorageError> {
        let mut archive = self.load();
        let before = archive.incoming_mails.len();
        archive.incoming_mails.retain(|m| m.id != id);
        if archive.incoming_mails.len() == before {
            return Ok(false);
        }
        self.store(&mut archive)?;
        Ok(true)
    }

    fn delete_outgoing(&self, id: &str) -> Result<bool, StorageError> {
        let mut archive = self.load();
        let before = archive.outgoing_mails.len();
        archive.outgoing_mails.retain(|m| m.id != id);
        if archive.outgoing_mails.len() == before {
            return Ok(false);
        }
        self.store(&mut archive)?;
        Ok(true)
    }

    fn export_all(&self, dest_dir: &Path) -> Result<PathBuf, StorageError> {
        let mut snapshot = self.load();
        snapshot.touch();
        let path = dest_dir.join(super::export_filename(Utc::now()));
        let json = encode_archive(&snapshot)?;
        atomic_write_str(&path, &json)?;
        Ok(path)
    }

    fn import_all(&self, src: &Path) -> Result<ImportReport, StorageError> {
        let content = fs::read_to_string(src)?;
        let imported = decode_archive_strict(&content)?;

        let mut report = ImportReport::default();
        let mut archive = self.load();
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
        self.store(&mut archive)?;
        report.success = report.errors.is_empty();
        Ok(report)
    }

    fn info(&self) -> StorageInfo {
        StorageInfo {
            kind: BackendKind::FileSystem,
            location: self.dir.display().to_string(),
        }
    }
}
