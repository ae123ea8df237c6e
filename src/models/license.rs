//! License record model
//!
//! Mirrors the `license.json` document written next to the mail data.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of the installed license
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LicenseStatus {
    /// Time-limited evaluation period started on first run
    #[default]
    Trial,
    /// Activated with a key; expires one year after activation
    Active,
    /// Past expiration; terminal unless reactivated with a fresh key
    Expired,
}

impl LicenseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseStatus::Trial => "trial",
            LicenseStatus::Active => "active",
            LicenseStatus::Expired => "expired",
        }
    }
}

/// Persisted license record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct License {
    /// When the trial started or the key was applied
    pub activation_date: DateTime<Utc>,
    pub expiration_date: DateTime<Utc>,
    /// Generated installation identifier (no account system behind it)
    pub user_id: String,
    pub status: LicenseStatus,
    /// Days granted by the current trial window
    pub trial_days: i64,
    pub max_trial_days: i64,
}

impl License {
    /// Whether the record is past its expiration at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expiration_date
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&LicenseStatus::Trial).unwrap(),
            "\"trial\""
        );
        assert_eq!(
            serde_json::to_string(&LicenseStatus::Expired).unwrap(),
            "\"expired\""
        );
    }

    #[test]
    fn test_license_round_trip() {
        let license = License {
            activation_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            expiration_date: Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap(),
            user_id: "user_abc123def_1704067200000".to_string(),
            status: LicenseStatus::Trial,
            trial_days: 90,
            max_trial_days: 90,
        };
        let json = serde_json::to_string(&license).unwrap();
        assert!(json.contains("\"activationDate\""));
        assert!(json.contains("\"maxTrialDays\""));
        let back: License = serde_json::from_str(&json).unwrap();
        assert_eq!(back, license);
    }

    #[test]
    fn test_is_expired_at() {
        let license = License {
            activation_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            expiration_date: Utc.with_ymd_and_hms(2024, 3, 31, 0, 0, 0).unwrap(),
            user_id: "user_x_0".to_string(),
            status: LicenseStatus::Trial,
            trial_days: 90,
            max_trial_days: 90,
        };
        assert!(!license.is_expired_at(Utc.with_ymd_and_hms(2024, 3, 30, 0, 0, 0).unwrap()));
        assert!(license.is_expired_at(Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap()));
    }
}
