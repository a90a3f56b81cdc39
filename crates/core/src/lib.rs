// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! tl-core: Shared data model for the till sync layer
//!
//! This crate provides the wire and domain primitives consumed by the
//! `tl-sync` crate and by application code that reads from the cache:
//! event envelopes, cache invalidation targets, snapshot identity, and
//! defensive date normalization. It performs no I/O and owns no sockets.

pub mod date;
pub mod envelope;
pub mod error;
pub mod protocol;
pub mod snapshot;
pub mod target;

pub use envelope::{EventEnvelope, EventKind};
pub use error::{Error, Result};
pub use protocol::ClientMessage;
pub use snapshot::{assert_unique_identities, ItemKey, LineItem, StableIdentity};
pub use target::{InvalidationTarget, ResourceScope};
