//! Unit tests for license and trial management

use chrono::{Duration, TimeZone, Utc};
use tempfile::TempDir;

use super::*;

#[test]
fn test_fresh_installation_starts_trial() {
    let dir = TempDir::new().unwrap();
    let manager = LicenseManager::new(dir.path());

    let license = manager.initialize().unwrap();
    assert_eq!(license.status, LicenseStatus::Trial);
    assert_eq!(license.trial_days, 90);
    assert_eq!(license.max_trial_days, 90);
    assert!(license.user_id.starts_with("user_"));
    assert!(dir.path().join("license.json").exists());
}

#[test]
fn test_fresh_installation_has_ninety_days_remaining() {
    let dir = TempDir::new().unwrap();
    let manager = LicenseManager::new(dir.path());

    let check = manager.check_status().unwrap();
    assert!(check.is_valid);
    assert_eq!(check.license.status, LicenseStatus::Trial);
    assert_eq!(check.days_remaining, 90);
}

#[test]
fn test_initialize_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let manager = LicenseManager::new(dir.path());

    let first = manager.initialize().unwrap();
    let second = manager.initialize().unwrap();
    assert_eq!(first.user_id, second.user_id);
    assert_eq!(first.activation_date, second.activation_date);
}

#[test]
fn test_invalid_key_leaves_license_unchanged() {
    let dir = TempDir::new().unwrap();
    let manager = LicenseManager::new(dir.path());
    let before = manager.initialize().unwrap();

    for key in [
        "",
        "ANOR-123-4567-89AB-CDEF",
        "anor-1234-5678-9abc-def0",
        "AUTRE-1234-5678-9ABC-DEF0",
        "ANOR-1234-5678-9ABC-DEF0-EXTRA",
    ] {
        let outcome = manager.activate(key).unwrap();
        assert!(!outcome.success, "clé acceptée à tort: {key}");
        assert_eq!(outcome.message, "Clé d'activation invalide");
    }

    let after = manager.check_status().unwrap().license;
    assert_eq!(after.status, LicenseStatus::Trial);
    assert_eq!(after.expiration_date, before.expiration_date);
}

#[test]
fn test_valid_key_activates_for_one_year() {
    let dir = TempDir::new().unwrap();
    let manager = LicenseManager::new(dir.path());
    manager.initialize().unwrap();

    let outcome = manager.activate("ANOR-AB12-CD34-EF56-GH78").unwrap();
    assert!(outcome.success);
    assert_eq!(outcome.message, "Licence activée avec succès!");

    let check = manager.check_status().unwrap();
    assert!(check.is_valid);
    assert_eq!(check.license.status, LicenseStatus::Active);
    // A one-year window is at least 365 days
    assert!(check.days_remaining >= 365);
}

#[test]
fn test_activate_without_license_file() {
    let dir = TempDir::new().unwrap();
    let manager = LicenseManager::new(dir.path());

    let outcome = manager.activate("ANOR-AB12-CD34-EF56-GH78").unwrap();
    assert!(!outcome.success);
    assert_eq!(outcome.message, "Aucune licence trouvée");
}

#[test]
fn test_expired_trial_is_detected_and_persisted() {
    let dir = TempDir::new().unwrap();
    let manager = LicenseManager::new(dir.path());

    let past = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let stale = License {
        activation_date: past,
        expiration_date: past + Duration::days(90),
        user_id: "user_test_0".to_string(),
        status: LicenseStatus::Trial,
        trial_days: 90,
        max_trial_days: 90,
    };
    manager.write(&stale).unwrap();

    let check = manager.check_status().unwrap();
    assert!(!check.is_valid);
    assert_eq!(check.license.status, LicenseStatus::Expired);
    assert_eq!(check.days_remaining, 0);

    // The lazy downgrade was written back
    let reread = manager.read().unwrap();
    assert_eq!(reread.status, LicenseStatus::Expired);
}

#[test]
fn test_expired_license_reactivates_with_fresh_key() {
    let dir = TempDir::new().unwrap();
    let manager = LicenseManager::new(dir.path());

    let past = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    manager
        .write(&License {
            activation_date: past,
            expiration_date: past + Duration::days(90),
            user_id: "user_test_0".to_string(),
            status: LicenseStatus::Expired,
            trial_days: 90,
            max_trial_days: 90,
        })
        .unwrap();

    let outcome = manager.activate("ANOR-0000-1111-2222-3333").unwrap();
    assert!(outcome.success);
    assert!(manager.check_status().unwrap().is_valid);
}

#[test]
fn test_malformed_license_file_reads_as_absent() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("license.json"), "{pas du json").unwrap();

    let manager = LicenseManager::new(dir.path());
    // check_status falls back to initializing a fresh trial
    let check = manager.check_status().unwrap();
    assert_eq!(check.license.status, LicenseStatus::Trial);
    assert_eq!(check.days_remaining, 90);
}

#[test]
fn test_generated_keys_validate() {
    for _ in 0..20 {
        let key = generate_key();
        assert!(validate_key(&key), "clé générée invalide: {key}");
    }
}

#[test]
fn test_days_remaining_rounds_up_and_clamps() {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let mut license = License {
        activation_date: now,
        expiration_date: now + Duration::hours(1),
        user_id: "user_test_0".to_string(),
        status: LicenseStatus::Trial,
        trial_days: 90,
        max_trial_days: 90,
    };

    // One hour left still counts as one day
    assert_eq!(days_remaining(&license, now), 1);

    license.expiration_date = now + Duration::days(90);
    assert_eq!(days_remaining(&license, now), 90);

    license.expiration_date = now - Duration::days(3);
    assert_eq!(days_remaining(&license, now), 0);
}
