// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared helpers for the tl-sync test modules.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::{Arc, Mutex};

use tl_core::{InvalidationTarget, LineItem};

use crate::router::InvalidationSink;

/// Build a persisted line item with the given id and quantity.
pub fn make_item(id: i64, quantity: u32) -> LineItem {
    LineItem {
        id: Some(id),
        service_id: 100 + id,
        position: 0,
        quantity,
        unit_price_cents: 1500,
        notes: None,
    }
}

/// An invalidation sink that records every call for inspection.
#[derive(Clone, Default)]
pub struct RecordingSink {
    calls: Arc<Mutex<Vec<InvalidationTarget>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All invalidation calls so far, in order.
    pub fn calls(&self) -> Vec<InvalidationTarget> {
        self.calls.lock().unwrap().clone()
    }
}

impl InvalidationSink for RecordingSink {
    fn invalidate(&self, target: &InvalidationTarget) {
        self.calls.lock().unwrap().push(target.clone());
    }
}
