//! Application root
//!
//! [`Registry`] owns the storage backend chosen at startup, the license
//! manager, the audit log and the loaded configuration. The backend is an
//! explicit constructor argument rather than an ambient singleton, so tests
//! and alternative front ends can inject their own.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::audit::{AuditEntityType, AuditLog};
use crate::config::{AppConfig, CONFIG_FILENAME};
use crate::error::AppError;
use crate::license::{ActivationOutcome, LicenseCheck, LicenseManager};
use crate::models::{IncomingMail, IncomingMailPatch, OutgoingMail, OutgoingMailPatch};
use crate::stats::calculator::{
    collect_overdue, compute_monthly_stats, dashboard_summary, performance_report,
};
use crate::stats::{DashboardSummary, MailStats, PerformanceReport};
use crate::storage::{
    migrate_store, open_store, FileStore, ImportReport, MailStore, MigrationResult, StorageInfo,
};

/// Application name used for platform directories
const APP_DIR_NAME: &str = "courrier";

/// Directories the application works from
#[derive(Debug, Clone)]
pub struct AppPaths {
    pub config_dir: PathBuf,
    pub data_dir: PathBuf,
}

impl AppPaths {
    /// Platform configuration and data directories
    pub fn discover() -> Option<Self> {
        Some(Self {
            config_dir: dirs::config_dir()?.join(APP_DIR_NAME),
            data_dir: dirs::data_dir()?.join(APP_DIR_NAME),
        })
    }

    /// Both directories under one root; used by the `--data-dir` override
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            config_dir: root.join("config"),
            data_dir: root.join("data"),
        }
    }

    fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILENAME)
    }
}

/// Application root wiring storage, license, audit and configuration
pub struct Registry {
    store: Box<dyn MailStore>,
    license: LicenseManager,
    audit: AuditLog,
    config: AppConfig,
    paths: AppPaths,
}

impl Registry {
    /// Open the registry at `paths`, selecting the backend once
    pub fn open(paths: AppPaths) -> Result<Self, AppError> {
        fs::create_dir_all(&paths.config_dir)?;
        fs::create_dir_all(&paths.data_dir)?;

        let config = AppConfig::load_or_init(&paths.config_file())?;
        let store = open_store(config.storage_location.as_deref(), Some(&paths.data_dir))?;
        Ok(Self::with_store(store, config, paths))
    }

    /// Assemble a registry around an explicit backend
    pub fn with_store(store: Box<dyn MailStore>, config: AppConfig, paths: AppPaths) -> Self {
        let license = LicenseManager::new(&paths.data_dir);
        let audit = AuditLog::new(&paths.data_dir);
        Self {
            store,
            license,
            audit,
            config,
            paths,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn storage_info(&self) -> StorageInfo {
        self.store.info()
    }

    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    // ===== Mail operations =====

    /// Register an incoming record, assigning an id when none is set
    pub fn register_incoming(&self, mut mail: IncomingMail) -> Result<String, AppError> {
        if mail.id.is_empty() {
            mail.id = Uuid::new_v4().to_string();
        }
        let chrono = mail.chrono_number.clone();
        let id = self.store.save_incoming(mail)?;
        self.audit
            .log_mail_create(AuditEntityType::IncomingMail, &id, &chrono);
        Ok(id)
    }

    /// Register an outgoing record, assigning an id when none is set
    pub fn register_outgoing(&self, mut mail: OutgoingMail) -> Result<String, AppError> {
        if mail.id.is_empty() {
            mail.id = Uuid::new_v4().to_string();
        }
        let chrono = mail.chrono_number.clone();
        let id = self.store.save_outgoing(mail)?;
        self.audit
            .log_mail_create(AuditEntityType::OutgoingMail, &id, &chrono);
        Ok(id)
    }

    pub fn update_incoming(&self, id: &str, patch: &IncomingMailPatch) -> Result<bool, AppError> {
        let updated = self.store.update_incoming(id, patch)?;
        if updated {
            let chrono = patch.chrono_number.clone().unwrap_or_default();
            self.audit
                .log_mail_edit(AuditEntityType::IncomingMail, id, &chrono);
        }
        Ok(updated)
    }

    pub fn update_outgoing(&self, id: &str, patch: &OutgoingMailPatch) -> Result<bool, AppError> {
        let updated = self.store.update_outgoing(id, patch)?;
        if updated {
            let chrono = patch.chrono_number.clone().unwrap_or_default();
            self.audit
                .log_mail_edit(AuditEntityType::OutgoingMail, id, &chrono);
        }
        Ok(updated)
    }

    pub fn delete_incoming(&self, id: &str) -> Result<bool, AppError> {
        let deleted = self.store.delete_incoming(id)?;
        if deleted {
            self.audit
                .log_mail_delete(AuditEntityType::IncomingMail, id);
        }
        Ok(deleted)
    }

    pub fn delete_outgoing(&self, id: &str) -> Result<bool, AppError> {
        let deleted = self.store.delete_outgoing(id)?;
        if deleted {
            self.audit
                .log_mail_delete(AuditEntityType::OutgoingMail, id);
        }
        Ok(deleted)
    }

    pub fn all_incoming(&self) -> Result<Vec<IncomingMail>, AppError> {
        Ok(self.store.all_incoming()?)
    }

    pub fn all_outgoing(&self) -> Result<Vec<OutgoingMail>, AppError> {
        Ok(self.store.all_outgoing()?)
    }

    // ===== Statistics =====

    pub fn monthly_stats(&self) -> Result<Vec<MailStats>, AppError> {
        Ok(compute_monthly_stats(
            &self.store.all_incoming()?,
            &self.store.all_outgoing()?,
        ))
    }

    pub fn dashboard(&self) -> Result<DashboardSummary, AppError> {
        Ok(dashboard_summary(
            &self.store.all_incoming()?,
            &self.store.all_outgoing()?,
            Utc::now(),
        ))
    }

    pub fn performance(&self) -> Result<PerformanceReport, AppError> {
        Ok(performance_report(
            &self.store.all_incoming()?,
            &self.store.all_outgoing()?,
            Utc::now(),
        ))
    }

    pub fn overdue(&self) -> Result<Vec<IncomingMail>, AppError> {
        Ok(collect_overdue(&self.store.all_incoming()?, Utc::now()))
    }

    // ===== License =====

    pub fn license_status(&self) -> Result<LicenseCheck, AppError> {
        Ok(self.license.check_status()?)
    }

    pub fn activate_license(&self, key: &str) -> Result<ActivationOutcome, AppError> {
        Ok(self.license.activate(key)?)
    }

    // ===== Export / import =====

    /// Snapshot the archive; defaults to the data directory
    pub fn export(&self, dest: Option<&Path>) -> Result<PathBuf, AppError> {
        let dest = dest.unwrap_or(&self.paths.data_dir);
        let path = self.store.export_all(dest)?;
        let count = self.store.all_incoming()?.len() + self.store.all_outgoing()?.len();
        self.audit.log_export(count);
        Ok(path)
    }

    pub fn import(&self, src: &Path) -> Result<ImportReport, AppError> {
        Ok(self.store.import_all(src)?)
    }

    // ===== Backend switch =====

    /// Migrate to the file-bridge backend in `dir` and repoint the
    /// configuration; the process keeps running on the new backend
    pub fn enable_file_system_storage(&mut self, dir: &Path) -> Result<MigrationResult, AppError> {
        let target = FileStore::open(dir)?;
        let result = migrate_store(self.store.as_ref(), &target)?;

        self.store = Box::new(target);
        self.config.storage_location = Some(dir.to_path_buf());
        fs::create_dir_all(&self.paths.config_dir)?;
        self.config.save(&self.paths.config_file())?;
        info!("stockage fichier activé: {}", dir.display());

        Ok(result)
    }
}

#[cfg(test)]
mod tests;
