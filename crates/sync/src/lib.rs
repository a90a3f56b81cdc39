// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tl-sync: Real-time synchronization layer for the till client.
//!
//! Keeps client-held sales state in step with the server's event channel
//! without flicker, lost local edits, or leaked timers and sockets.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Connection  │────►│  Transport  │────►│   Event     │
//! │   Manager    │◄────│   (trait)   │◄────│   Channel   │
//! └──────┬───────┘     └─────────────┘     └─────────────┘
//!        │ decoded envelopes
//!        ▼
//! ┌──────────────┐     ┌─────────────┐
//! │ EventRouter  │────►│ Invalidation│  (cache marks stale, refetch)
//! │              │     │ Sink (trait)│
//! └──────┬───────┘     └─────────────┘
//!        │ refetched candidate snapshots
//!        ▼
//! ┌──────────────┐
//! │   Stable     │  (admit or hold; anti-flicker)
//! │  Reconciler  │
//! └──────────────┘
//! ```
//!
//! # Features
//!
//! - WebSocket connection with bounded automatic reconnect and
//!   exponential backoff; manual reconnect is never throttled
//! - Event-to-invalidation routing, seller-scoped where the event is
//! - Stable snapshot reconciliation keyed by entity identity
//! - Injectable transport and invalidation sink traits for testing
//!
//! The three components compose but do not depend on one another; each
//! is usable standalone.

pub mod config;
pub mod connection;
pub mod error;
pub mod reconcile;
pub mod router;
pub mod transport;

pub use config::SyncSettings;
pub use connection::{backoff_delay, ConnectionConfig, ConnectionManager, ConnectionState};
pub use error::{Result, SyncError};
pub use reconcile::{Admission, ReconcileError, StableReconciler};
pub use router::{route, EventRouter, InvalidationSink, Notification};
pub use transport::{Transport, TransportError, WebSocketTransport};

#[cfg(test)]
mod test_helpers;

#[cfg(test)]
mod config_tests;



#[cfg(test)]
mod reconcile_tests;
