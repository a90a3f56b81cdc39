// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Cache invalidation targets.
//!
//! A target names one cached resource set, optionally scoped to a single
//! seller. Equality is structural; the invalidation sink may use targets
//! directly as map keys.

use serde::{Deserialize, Serialize};

const SALES_COLLECTION: &str = "sales-collection";

/// Opaque string key identifying a class of cached resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceScope(String);

impl ResourceScope {
    /// Create a scope from an arbitrary key.
    pub fn new(key: impl Into<String>) -> Self {
        ResourceScope(key.into())
    }

    /// The shared sales collection scope.
    pub fn sales() -> Self {
        ResourceScope::new(SALES_COLLECTION)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ResourceScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One cache entry to mark stale.
///
/// A target with `seller_id` set names only that seller's entry; without
/// it, the global entry. Marking a target stale twice is the same as once,
/// which is what makes invalidation safe under redelivery.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InvalidationTarget {
    pub scope: ResourceScope,
    pub seller_id: Option<i64>,
}

impl InvalidationTarget {
    /// Target the global entry for a scope.
    pub fn global(scope: ResourceScope) -> Self {
        InvalidationTarget {
            scope,
            seller_id: None,
        }
    }

    /// Target one seller's entry for a scope.
    pub fn for_seller(scope: ResourceScope, seller_id: i64) -> Self {
        InvalidationTarget {
            scope,
            seller_id: Some(seller_id),
        }
    }

    pub fn is_seller_scoped(&self) -> bool {
        self.seller_id.is_some()
    }
}

impl std::fmt::Display for InvalidationTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.seller_id {
            Some(id) => write!(f, "{}[seller {}]", self.scope, id),
            None => write!(f, "{}", self.scope),
        }
    }
}

#[cfg(test)]
#[path = "target_tests.rs"]
mod tests;
