// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sync layer configuration.
//!
//! Settings are stored in `till.toml` next to the application config.
//! Every field has a default, so a missing file or an empty table is a
//! fully working configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::connection::ConnectionConfig;
use crate::error::{Result, SyncError};

/// Default settings file name.
pub const SETTINGS_FILE_NAME: &str = "till.toml";

/// Sync layer settings, loaded from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Event channel endpoint (`ws://` or `wss://`).
    #[serde(default = "default_url")]
    pub url: String,
    /// Failed reconnect attempts tolerated before giving up (default: 10).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// First backoff delay in milliseconds (default: 1000).
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    /// Backoff growth factor per failed attempt (default: 1.5).
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Ceiling on the backoff delay in milliseconds (default: 30000).
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Send a keepalive probe immediately after connecting (default: true).
    #[serde(default = "default_probe_on_open")]
    pub probe_on_open: bool,
}

fn default_url() -> String {
    "ws://localhost:7411/events".to_string()
}

fn default_max_attempts() -> u32 {
    10
}

fn default_base_delay_ms() -> u64 {
    1000
}

fn default_backoff_multiplier() -> f64 {
    1.5
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_probe_on_open() -> bool {
    true
}

impl Default for SyncSettings {
    fn default() -> Self {
        SyncSettings {
            url: default_url(),
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            max_delay_ms: default_max_delay_ms(),
            probe_on_open: default_probe_on_open(),
        }
    }
}

impl SyncSettings {
    /// Load settings from a TOML file.
    ///
    /// A missing file yields the defaults. Present-but-invalid settings
    /// are an error; silently running with a half-read config hides
    /// operator mistakes.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(SyncSettings::default());
        }
        let raw = fs::read_to_string(path)?;
        let settings: SyncSettings = toml::from_str(&raw)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check cross-field constraints.
    pub fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(SyncError::InvalidSetting {
                name: "max_attempts",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.backoff_multiplier < 1.0 {
            return Err(SyncError::InvalidSetting {
                name: "backoff_multiplier",
                reason: "must be >= 1.0 or the delay would shrink".to_string(),
            });
        }
        if self.base_delay_ms == 0 || self.base_delay_ms > self.max_delay_ms {
            return Err(SyncError::InvalidSetting {
                name: "base_delay_ms",
                reason: format!(
                    "must be between 1 and max_delay_ms ({})",
                    self.max_delay_ms
                ),
            });
        }
        if !(self.url.starts_with("ws://") || self.url.starts_with("wss://")) {
            return Err(SyncError::InvalidSetting {
                name: "url",
                reason: "must start with ws:// or wss://".to_string(),
            });
        }
        Ok(())
    }

    /// Convert into a connection manager configuration.
    pub fn connection(&self) -> ConnectionConfig {
        ConnectionConfig {
            url: self.url.clone(),
            max_attempts: self.max_attempts,
            base_delay_ms: self.base_delay_ms,
            backoff_multiplier: self.backoff_multiplier,
            max_delay_ms: self.max_delay_ms,
            probe_on_open: self.probe_on_open,
        }
    }
}
