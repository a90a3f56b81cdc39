// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Decoded units of server-pushed information.
//!
//! The server's event channel carries JSON frames of the form
//! `{"kind": "...", "payload": {...}}`. The kind set is closed; frames
//! with an unknown kind or without a `kind` field are decode errors that
//! the receiving side drops and logs, never forwards.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// The closed set of event kinds pushed by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A sale changed somewhere; the shared sales collection is stale.
    SaleUpdate,
    /// A change scoped to one seller, in addition to the shared collection.
    SellerUpdate,
    /// Liveness signal. Carries no data and invalidates nothing.
    Heartbeat,
}

impl EventKind {
    /// Get the wire name of this kind (e.g., "sale_update").
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::SaleUpdate => "sale_update",
            EventKind::SellerUpdate => "seller_update",
            EventKind::Heartbeat => "heartbeat",
        }
    }

    /// Parse a wire name into a kind.
    ///
    /// The set is closed: anything else is [`Error::UnknownEventKind`].
    pub fn parse(kind: &str) -> Result<Self> {
        match kind {
            "sale_update" => Ok(EventKind::SaleUpdate),
            "seller_update" => Ok(EventKind::SellerUpdate),
            "heartbeat" => Ok(EventKind::Heartbeat),
            other => Err(Error::UnknownEventKind {
                kind: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded server push event: a kind plus an opaque payload.
///
/// The payload is kept as raw JSON; only the routing layer inspects the
/// few fields it needs (currently `seller_id`). Everything else is passed
/// through verbatim to platform notification listeners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub kind: EventKind,
    #[serde(default)]
    pub payload: Value,
}

impl EventEnvelope {
    /// Decode a raw text frame into an envelope.
    ///
    /// Returns an error for non-JSON input, a missing or non-string
    /// `kind` field, or a kind outside the closed set. Callers drop and
    /// log failures; a failed decode is final for that frame.
    pub fn decode(raw: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(raw).map_err(|e| Error::MalformedEnvelope {
            reason: e.to_string(),
        })?;

        let kind_str = value
            .get("kind")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::MalformedEnvelope {
                reason: "missing 'kind' field".to_string(),
            })?;

        let kind = EventKind::parse(kind_str)?;
        let payload = value.get("payload").cloned().unwrap_or(Value::Null);

        Ok(EventEnvelope { kind, payload })
    }

    /// Creates a sale update envelope.
    pub fn sale_update(payload: Value) -> Self {
        EventEnvelope {
            kind: EventKind::SaleUpdate,
            payload,
        }
    }

    /// Creates a seller update envelope carrying the seller id.
    pub fn seller_update(seller_id: i64) -> Self {
        EventEnvelope {
            kind: EventKind::SellerUpdate,
            payload: serde_json::json!({ "seller_id": seller_id }),
        }
    }

    /// Creates a heartbeat envelope.
    pub fn heartbeat() -> Self {
        EventEnvelope {
            kind: EventKind::Heartbeat,
            payload: Value::Null,
        }
    }

    /// The seller id carried by a seller update payload.
    ///
    /// Returns `None` for other kinds or when the payload does not carry
    /// a numeric `seller_id` field.
    pub fn seller_id(&self) -> Option<i64> {
        if self.kind != EventKind::SellerUpdate {
            return None;
        }
        self.payload.get("seller_id").and_then(Value::as_i64)
    }

    /// Serializes the envelope to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
