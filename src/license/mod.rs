//! License and trial management
//!
//! A fresh installation starts a 90-day trial; supplying a well-formed
//! activation key switches the license to `active` for one year. Expiration
//! is recomputed lazily whenever the license is read, and persisted only
//! when the status actually changed.
//!
//! The key check is a format check and nothing more; there is no server
//! or cryptographic verification behind it.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, Duration, Utc};
use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::warn;

use crate::models::{License, LicenseStatus};
use crate::storage::atomic_fs::atomic_write_str;

/// Days granted to a new installation
pub const TRIAL_DAYS: i64 = 90;

/// License price communicated on the activation surface (FCFA)
pub const LICENSE_PRICE_FCFA: u32 = 80_000;

/// License file name inside the application data directory
const LICENSE_FILENAME: &str = "license.json";

/// Format: ANOR-XXXX-XXXX-XXXX-XXXX
static KEY_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^ANOR-[A-Z0-9]{4}-[A-Z0-9]{4}-[A-Z0-9]{4}-[A-Z0-9]{4}$").unwrap());

const KEY_CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// License persistence error type
#[derive(Error, Debug)]
pub enum LicenseError {
    #[error("erreur d'accès au fichier de licence: {0}")]
    Io(#[from] std::io::Error),

    #[error("erreur de sérialisation de la licence: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result of a license status check
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseCheck {
    pub is_valid: bool,
    pub license: License,
    /// Whole days until expiration, clamped to zero
    pub days_remaining: i64,
}

/// Result of an activation attempt
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationOutcome {
    pub success: bool,
    pub message: String,
}

/// Manages the persisted license record
pub struct LicenseManager {
    path: PathBuf,
}

impl LicenseManager {
    /// Manage the license stored in `data_dir`
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(LICENSE_FILENAME),
        }
    }

    /// Return the stored license, creating a fresh trial on first run
    pub fn initialize(&self) -> Result<License, LicenseError> {
        if let Some(license) = self.read() {
            return Ok(refresh_status(license, Utc::now()));
        }

        let license = new_trial(Utc::now());
        self.write(&license)?;
        Ok(license)
    }

    /// Check validity, lazily downgrading to `expired` past the deadline
    pub fn check_status(&self) -> Result<LicenseCheck, LicenseError> {
        let now = Utc::now();

        let Some(stored) = self.read() else {
            let license = self.initialize()?;
            return Ok(LicenseCheck {
                is_valid: true,
                days_remaining: TRIAL_DAYS,
                license,
            });
        };

        let refreshed = refresh_status(stored.clone(), now);
        if refreshed.status != stored.status {
            self.write(&refreshed)?;
        }

        Ok(LicenseCheck {
            is_valid: refreshed.status != LicenseStatus::Expired,
            days_remaining: days_remaining(&refreshed, now),
            license: refreshed,
        })
    }

    /// Apply an activation key
    ///
    /// A key that does not match the expected format leaves the stored
    /// record untouched.
    pub fn activate(&self, key: &str) -> Result<ActivationOutcome, LicenseError> {
        if !validate_key(key) {
            return Ok(ActivationOutcome {
                success: false,
                message: "Clé d'activation invalide".to_string(),
            });
        }

        let Some(license) = self.read() else {
            return Ok(ActivationOutcome {
                success: false,
                message: "Aucune licence trouvée".to_string(),
            });
        };

        let now = Utc::now();
        let activated = License {
            status: LicenseStatus::Active,
            activation_date: now,
            expiration_date: one_year_after(now),
            ..license
        };
        self.write(&activated)?;

        Ok(ActivationOutcome {
            success: true,
            message: "Licence activée avec succès!".to_string(),
        })
    }

    fn read(&self) -> Option<License> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("lecture du fichier de licence impossible: {e}");
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(license) => Some(license),
            Err(e) => {
                warn!("fichier de licence illisible: {e}");
                None
            }
        }
    }

    fn write(&self, license: &License) -> Result<(), LicenseError> {
        let json = serde_json::to_string_pretty(license)?;
        atomic_write_str(&self.path, &json)?;
        Ok(())
    }
}

/// Whether a key matches the expected format
pub fn validate_key(key: &str) -> bool {
    KEY_PATTERN.is_match(key)
}

/// Produce a well-formed activation key
pub fn generate_key() -> String {
    let mut rng = rand::thread_rng();
    let mut key = String::from("ANOR");
    for _ in 0..4 {
        key.push('-');
        for _ in 0..4 {
            key.push(KEY_CHARS[rng.gen_range(0..KEY_CHARS.len())] as char);
        }
    }
    key
}

fn new_trial(now: DateTime<Utc>) -> License {
    License {
        activation_date: now,
        expiration_date: now + Duration::days(TRIAL_DAYS),
        user_id: generate_user_id(now),
        status: LicenseStatus::Trial,
        trial_days: TRIAL_DAYS,
        max_trial_days: TRIAL_DAYS,
    }
}

fn generate_user_id(now: DateTime<Utc>) -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .map(|_| {
            let chars = b"abcdefghijklmnopqrstuvwxyz0123456789";
            chars[rng.gen_range(0..chars.len())] as char
        })
        .collect();
    format!("user_{}_{}", suffix, now.timestamp_millis())
}

fn refresh_status(license: License, now: DateTime<Utc>) -> License {
    if license.is_expired_at(now) {
        License {
            status: LicenseStatus::Expired,
            ..license
        }
    } else {
        license
    }
}

/// Whole days until expiration, rounded up and clamped to zero
fn days_remaining(license: &License, now: DateTime<Utc>) -> i64 {
    let secs = (license.expiration_date - now).num_seconds();
    if secs <= 0 {
        0
    } else {
        (secs + 86_399) / 86_400
    }
}

/// One calendar year later; February 29 falls back to March 1
fn one_year_after(now: DateTime<Utc>) -> DateTime<Utc> {
    now.with_year(now.year() + 1)
        .unwrap_or(now + Duration::days(365))
}

#[cfg(test)]
mod tests;
