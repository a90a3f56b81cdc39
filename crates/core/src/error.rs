// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

/// All possible errors produced by the tl-core data model.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown event kind: '{kind}'")]
    UnknownEventKind { kind: String },

    #[error("malformed envelope: {reason}")]
    MalformedEnvelope { reason: String },

    #[error("invalid date: '{value}'")]
    InvalidDate { value: String },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for tl-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
