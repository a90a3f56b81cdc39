// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Snapshot identity for reconcilable collections.
//!
//! A snapshot is an ordered sequence of items in which every item carries
//! a stable identity. Identity must survive insertions and removals, so it
//! is never the array index: items use their own id when they have one and
//! a `(service_id, position)` composite when they do not.

use std::collections::HashSet;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

/// Stable per-item identity within a snapshot.
///
/// Implementors guarantee the key does not change when surrounding items
/// are inserted or removed.
pub trait StableIdentity {
    type Key: Eq + Hash + std::fmt::Debug;

    fn identity(&self) -> Self::Key;
}

/// Ready-made identity key for items that may not yet have a server id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemKey {
    /// Persisted item, identified by its id.
    Id(i64),
    /// Unsaved item, identified by what it is and where it sits.
    Composite { service_id: i64, position: u32 },
}

/// Assert that every item in a snapshot has a distinct identity.
///
/// Duplicate identities are a data-integrity bug in the producer, not a
/// condition to repair locally, so this fails loudly.
pub fn assert_unique_identities<T: StableIdentity>(items: &[T]) {
    let mut seen = HashSet::with_capacity(items.len());
    for item in items {
        assert!(
            seen.insert(item.identity()),
            "duplicate identity in snapshot: {:?}",
            item.identity()
        );
    }
}

/// One line item of a sale: the collection this application reconciles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    /// Server id; `None` until the line is persisted.
    pub id: Option<i64>,
    pub service_id: i64,
    /// Ordinal within the sale, assigned at creation. Stable across edits.
    pub position: u32,
    pub quantity: u32,
    pub unit_price_cents: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl StableIdentity for LineItem {
    type Key = ItemKey;

    fn identity(&self) -> ItemKey {
        match self.id {
            Some(id) => ItemKey::Id(id),
            None => ItemKey::Composite {
                service_id: self.service_id,
                position: self.position,
            },
        }
    }
}

impl LineItem {
    /// Default equivalence predicate: identity, quantity, and notes.
    ///
    /// `unit_price_cents` is excluded on purpose: totals are recalculated
    /// server-side, and a snapshot that only refreshed a derived price
    /// must not read as a content change.
    pub fn same_content(&self, other: &Self) -> bool {
        self.identity() == other.identity()
            && self.quantity == other.quantity
            && self.notes == other.notes
    }
}

#[cfg(test)]
#[path = "snapshot_tests.rs"]
mod tests;
