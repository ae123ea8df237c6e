//! Local storage module for the mail registry
//!
//! One CRUD contract, three interchangeable backends:
//!
//! - [`MemoryStore`]: ephemeral in-process key-value store, lost at exit
//! - [`SqliteStore`]: structured local database in the application data dir
//! - [`FileStore`]: one JSON document in a user-chosen directory, for
//!   installations driven through the desktop shell's file bridge
//!
//! The backend is selected once at startup by [`open_store`] and injected
//! into the application root; there is no ambient singleton.

mod archive;
pub(crate) mod atomic_fs;
mod codec;
mod database;
mod error;
mod memory;
mod migration;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::models::{IncomingMail, IncomingMailPatch, OutgoingMail, OutgoingMailPatch};

pub use archive::FileStore;
pub use codec::{MailArchive, ARCHIVE_FILENAME, ARCHIVE_VERSION};
pub use database::SqliteStore;
pub use error::StorageError;
pub use memory::MemoryStore;
pub use migration::{migrate_store, MigrationResult};

/// Which backend a store instance runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Ephemeral in-process store
    Memory,
    /// Structured local database
    Database,
    /// JSON document in a user-chosen directory
    FileSystem,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Memory => "memory",
            BackendKind::Database => "database",
            BackendKind::FileSystem => "filesystem",
        }
    }
}

/// Backend descriptor for the settings surface
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageInfo {
    pub kind: BackendKind,
    /// Human-readable location of the data
    pub location: String,
}

/// Outcome of merging an exported document into the active store
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub success: bool,
    pub imported_count: u32,
    pub errors: Vec<String>,
}

/// Uniform CRUD contract implemented by every backend
///
/// Mutation failures resolve to `false` or an error without partial-write
/// rollback; calls are not serialized against each other and the last write
/// wins on the underlying document.
pub trait MailStore: Send {
    /// Append an incoming record; returns its id
    fn save_incoming(&self, mail: IncomingMail) -> Result<String, StorageError>;

    /// Append an outgoing record; returns its id
    fn save_outgoing(&self, mail: OutgoingMail) -> Result<String, StorageError>;

    /// Merge `patch` into the matching record; `false` when the id is unknown
    fn update_incoming(&self, id: &str, patch: &IncomingMailPatch) -> Result<bool, StorageError>;

    fn update_outgoing(&self, id: &str, patch: &OutgoingMailPatch) -> Result<bool, StorageError>;

    fn all_incoming(&self) -> Result<Vec<IncomingMail>, StorageError>;

    fn all_outgoing(&self) -> Result<Vec<OutgoingMail>, StorageError>;

    /// Remove the matching record; `false` when the id is unknown, so a
    /// repeated delete is a defined result rather than an error
    fn delete_incoming(&self, id: &str) -> Result<bool, StorageError>;

    fn delete_outgoing(&self, id: &str) -> Result<bool, StorageError>;

    /// Snapshot the full archive to a dated JSON file under `dest_dir`
    fn export_all(&self, dest_dir: &Path) -> Result<PathBuf, StorageError>;

    /// Merge records from an exported document, assigning fresh ids;
    /// per-record failures are collected in the report, not fatal
    fn import_all(&self, src: &Path) -> Result<ImportReport, StorageError>;

    fn info(&self) -> StorageInfo;
}

/// Select and open the storage backend for this process
///
/// An explicitly configured storage directory (the desktop file bridge)
/// wins; otherwise the platform data directory hosts the structured
/// database; with neither available the registry runs on the ephemeral
/// in-memory store.
pub fn open_store(
    storage_dir: Option<&Path>,
    data_dir: Option<&Path>,
) -> Result<Box<dyn MailStore>, StorageError> {
    if let Some(dir) = storage_dir {
        let store = FileStore::open(dir)?;
        info!("stockage fichier actif: {}", dir.display());
        return Ok(Box::new(store));
    }

    if let Some(dir) = data_dir {
        std::fs::create_dir_all(dir)?;
        let db_path = dir.join(database::DATABASE_FILENAME);
        let store = SqliteStore::open(&db_path)?;
        info!("base de données locale active: {}", db_path.display());
        return Ok(Box::new(store));
    }

    info!("aucun emplacement de stockage disponible, stockage en mémoire");
    Ok(Box::new(MemoryStore::new()))
}

/// Date suffix used in export file names (`export-courriers-YYYY-MM-DD.json`)
pub(crate) fn export_filename(now: chrono::DateTime<chrono::Utc>) -> String {
    format!("export-courriers-{}.json", now.format("%Y-%m-%d"))
}
