// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// All possible errors surfaced by the tl-sync library.
///
/// Transport drops and malformed frames never appear here: both are
/// recovered locally (reconnect with backoff, drop-and-log). Only
/// conditions a host has to act on are surfaced.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The connection manager was torn down.
    #[error("connection manager disposed")]
    Disposed,

    /// The reconnect budget is spent; a manual reconnect is the only
    /// way forward.
    #[error("gave up after {attempts} reconnect attempts")]
    Exhausted { attempts: u32 },

    /// A settings value fails validation.
    #[error("invalid setting '{name}': {reason}")]
    InvalidSetting {
        name: &'static str,
        reason: String,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// A specialized Result type for tl-sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
