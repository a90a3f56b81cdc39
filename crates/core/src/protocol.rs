// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Messages the client writes to the event channel.
//!
//! The channel is almost entirely server-to-client; the client speaks
//! only to probe liveness and to hint at a catch-up point after a
//! reconnect gap. Recovery itself happens through idempotent cache
//! invalidation and refetch, never through event replay.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Keepalive probe, sent immediately after the connection opens.
    ///
    /// A dead socket fails the write right away instead of sitting
    /// silent until the platform timeout notices.
    Probe {
        /// Client-chosen id, monotonically increasing per manager.
        id: u64,
    },

    /// Hint that the client last saw events before `since`.
    ///
    /// Sent after reconnecting so the server can decide whether to
    /// repush recent notifications. Best effort only.
    Resync { since: DateTime<Utc> },
}

impl ClientMessage {
    /// Creates a Probe message.
    pub fn probe(id: u64) -> Self {
        ClientMessage::Probe { id }
    }

    /// Creates a Resync message.
    pub fn resync(since: DateTime<Utc>) -> Self {
        ClientMessage::Resync { since }
    }

    /// Serializes the message to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes the message from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
