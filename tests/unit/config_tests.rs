// ==========================
// tests/unit/config_tests.rs
// ==========================
//! Unit tests for the configuration module
use elearn_backend_lib::config::Settings;
use std::fs;
use tempfile::tempdir;

use crate::test_utils::test_settings;

#[test]
fn test_settings_default() {
    let settings = Settings::default();

    assert_eq!(settings.bind_addr.to_string(), "127.0.0.1:8000");
    assert_eq!(settings.tokens.access_ttl_secs, 300);
    assert_eq!(settings.tokens.refresh_ttl_secs, 3 * 24 * 60 * 60);
    assert_eq!(settings.login_throttle.max_attempts, 5);
    assert!(!settings.login_throttle.trust_proxy_header);
    assert!(settings.cookies.secure);

    // Secrets have no default, so the defaults alone do not validate
    assert!(settings.validate().is_err());
}

#[test]
fn test_test_settings_validate() {
    assert!(test_settings().validate().is_ok());
}

#[test]
fn test_settings_load_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("server.toml");
    fs::write(
        &path,
        r#"
bind_addr = "0.0.0.0:9000"
log_level = "debug"

[tokens]
activation_secret = "one"
access_secret = "two"
refresh_secret = "three"
access_ttl_secs = 60
"#,
    )
    .unwrap();

    let settings = Settings::load_from(&path).unwrap();
    assert_eq!(settings.bind_addr.port(), 9000);
    assert_eq!(settings.log_level, "debug");
    assert_eq!(settings.tokens.access_ttl_secs, 60);
    // Unset keys keep their defaults
    assert_eq!(settings.tokens.refresh_ttl_secs, 259_200);
    assert!(settings.validate().is_ok());
}

#[test]
fn test_settings_reject_bad_values() {
    let mut shared = test_settings();
    shared.tokens.refresh_secret = shared.tokens.access_secret.clone();
    assert!(shared.validate().is_err());

    let mut short_refresh = test_settings();
    short_refresh.tokens.refresh_ttl_secs = 10;
    assert!(short_refresh.validate().is_err());

    let mut level = test_settings();
    level.log_level = "loud".to_string();
    assert!(level.validate().is_err());
}
