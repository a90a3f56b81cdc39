// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the settings file.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::fs;

use tempfile::tempdir;

use super::config::{SyncSettings, SETTINGS_FILE_NAME};
use super::error::SyncError;

#[test]
fn missing_file_yields_defaults() {
    let dir = tempdir().unwrap();
    let settings = SyncSettings::load(&dir.path().join(SETTINGS_FILE_NAME)).unwrap();

    assert_eq!(settings.url, "ws://localhost:7411/events");
    assert_eq!(settings.max_attempts, 10);
    assert_eq!(settings.base_delay_ms, 1000);
    assert!((settings.backoff_multiplier - 1.5).abs() < f64::EPSILON);
    assert_eq!(settings.max_delay_ms, 30_000);
    assert!(settings.probe_on_open);
}

#[test]
fn full_file_loads() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(SETTINGS_FILE_NAME);
    fs::write(
        &path,
        r#"
url = "wss://till.example.com/events"
max_attempts = 5
base_delay_ms = 250
backoff_multiplier = 2.0
max_delay_ms = 10000
probe_on_open = false
"#,
    )
    .unwrap();

    let settings = SyncSettings::load(&path).unwrap();
    assert_eq!(settings.url, "wss://till.example.com/events");
    assert_eq!(settings.max_attempts, 5);
    assert_eq!(settings.base_delay_ms, 250);
    assert!(!settings.probe_on_open);
}

#[test]
fn partial_file_fills_in_field_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(SETTINGS_FILE_NAME);
    fs::write(&path, "url = \"wss://till.example.com/events\"\n").unwrap();

    let settings = SyncSettings::load(&path).unwrap();
    assert_eq!(settings.url, "wss://till.example.com/events");
    assert_eq!(settings.max_attempts, 10);
    assert!(settings.probe_on_open);
}

#[test]
fn unparsable_file_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join(SETTINGS_FILE_NAME);
    fs::write(&path, "url = [not toml").unwrap();

    assert!(matches!(
        SyncSettings::load(&path),
        Err(SyncError::Toml(_))
    ));
}

#[test]
fn zero_max_attempts_is_rejected() {
    let settings = SyncSettings {
        max_attempts: 0,
        ..SyncSettings::default()
    };
    assert!(matches!(
        settings.validate(),
        Err(SyncError::InvalidSetting {
            name: "max_attempts",
            ..
        })
    ));
}

#[test]
fn shrinking_backoff_is_rejected() {
    let settings = SyncSettings {
        backoff_multiplier: 0.5,
        ..SyncSettings::default()
    };
    assert!(matches!(
        settings.validate(),
        Err(SyncError::InvalidSetting {
            name: "backoff_multiplier",
            ..
        })
    ));
}

#[test]
fn base_delay_above_cap_is_rejected() {
    let settings = SyncSettings {
        base_delay_ms: 60_000,
        max_delay_ms: 30_000,
        ..SyncSettings::default()
    };
    assert!(matches!(
        settings.validate(),
        Err(SyncError::InvalidSetting {
            name: "base_delay_ms",
            ..
        })
    ));
}

#[test]
fn non_websocket_url_is_rejected() {
    let settings = SyncSettings {
        url: "https://till.example.com/events".to_string(),
        ..SyncSettings::default()
    };
    assert!(matches!(
        settings.validate(),
        Err(SyncError::InvalidSetting { name: "url", .. })
    ));
}

#[test]
fn connection_config_mirrors_settings() {
    let settings = SyncSettings {
        url: "wss://till.example.com/events".to_string(),
        max_attempts: 7,
        base_delay_ms: 500,
        backoff_multiplier: 2.0,
        max_delay_ms: 20_000,
        probe_on_open: false,
    };

    let config = settings.connection();
    assert_eq!(config.url, settings.url);
    assert_eq!(config.max_attempts, 7);
    assert_eq!(config.base_delay_ms, 500);
    assert!((config.backoff_multiplier - 2.0).abs() < f64::EPSILON);
    assert_eq!(config.max_delay_ms, 20_000);
    assert!(!config.probe_on_open);
}
