// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Event-to-invalidation routing.
//!
//! [`route`] is a pure, total mapping from a decoded envelope to the
//! cache entries it makes stale. [`EventRouter::dispatch`] applies that
//! mapping to an external [`InvalidationSink`] and rebroadcasts the
//! envelope as a platform [`Notification`] for listeners outside the
//! cache system (status toasts, audit trails).
//!
//! Invalidation is idempotent, so dispatching the same envelope twice
//! is harmless; this is what makes at-least-once redelivery safe.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use tl_core::{EventEnvelope, EventKind, InvalidationTarget, ResourceScope};

/// Capacity of the platform notification channel.
const NOTIFY_CHANNEL_CAPACITY: usize = 64;

/// Cache invalidation sink: "mark this resource set stale, refetch on
/// next read". Implementations must tolerate redundant calls and may
/// batch or dedupe further.
pub trait InvalidationSink {
    fn invalidate(&self, target: &InvalidationTarget);
}

/// Fire-and-forget broadcast of an envelope for non-cache listeners.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub kind: EventKind,
    pub payload: serde_json::Value,
    pub timestamp: DateTime<Utc>,
}

/// Map an envelope to the cache entries it invalidates.
///
/// Total over the closed kind set:
/// - `sale_update` → the global sales collection
/// - `seller_update` → the global collection and that seller's scoped
///   entry (a change visible to all is also visible to this seller)
/// - `heartbeat` → nothing; liveness only
pub fn route(envelope: &EventEnvelope) -> Vec<InvalidationTarget> {
    match envelope.kind {
        EventKind::Heartbeat => Vec::new(),
        EventKind::SaleUpdate => vec![InvalidationTarget::global(ResourceScope::sales())],
        EventKind::SellerUpdate => {
            let mut targets = vec![InvalidationTarget::global(ResourceScope::sales())];
            match envelope.seller_id() {
                Some(id) => {
                    targets.push(InvalidationTarget::for_seller(ResourceScope::sales(), id));
                }
                None => {
                    // Still worth invalidating the shared list.
                    warn!("seller_update without seller_id; global scope only");
                }
            }
            targets
        }
    }
}

/// Applies [`route`] to an invalidation sink and republishes envelopes
/// as platform notifications. Stateless beyond the two handles.
pub struct EventRouter<S: InvalidationSink> {
    sink: S,
    notify_tx: broadcast::Sender<Notification>,
}

impl<S: InvalidationSink> EventRouter<S> {
    /// Create a router over the given sink.
    pub fn new(sink: S) -> Self {
        let (notify_tx, _) = broadcast::channel(NOTIFY_CHANNEL_CAPACITY);
        EventRouter { sink, notify_tx }
    }

    /// Subscribe to platform notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notify_tx.subscribe()
    }

    /// Invalidate every distinct routed target once, then rebroadcast
    /// the envelope verbatim (heartbeats included; liveness listeners
    /// want them even though they invalidate nothing).
    pub fn dispatch(&self, envelope: &EventEnvelope) {
        let mut seen = HashSet::new();
        for target in route(envelope) {
            if seen.insert(target.clone()) {
                debug!("invalidating {}", target);
                self.sink.invalidate(&target);
            }
        }

        let _ = self.notify_tx.send(Notification {
            kind: envelope.kind,
            payload: envelope.payload.clone(),
            timestamp: Utc::now(),
        });
    }
}
