// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Stable snapshot reconciliation.
//!
//! Candidate snapshots of a displayed collection arrive continuously
//! from polling fetches, parent updates, and push-triggered refetches.
//! Accepting every one verbatim makes the view flicker: a transient
//! empty read blanks a previously valid list, and a byte-identical
//! refetch resets position-sensitive UI state. The [`StableReconciler`]
//! holds one authoritative accepted snapshot per entity and decides,
//! per arrival, whether to replace it.
//!
//! One reconciler instance is bound to one logical collection (the line
//! items of one sale). When the owning entity changes, the instance is
//! re-keyed with [`StableReconciler::rebind`]; carrying an accepted
//! snapshot across entities would show one sale's items under another.

use std::collections::HashMap;

use tracing::debug;

use tl_core::snapshot::{assert_unique_identities, StableIdentity};

/// Outcome of offering a candidate snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// First non-empty candidate; the reconciler is now initialized.
    Initial,
    /// Candidate accepted as the new authoritative snapshot.
    Replaced,
    /// Transient empty candidate suppressed; the accepted snapshot
    /// stands. The core anti-flicker rule.
    HeldEmpty,
    /// Candidate is equivalent to the accepted snapshot; kept the
    /// current one so reference-holders see no change.
    HeldEquivalent,
    /// Nothing accepted yet and the candidate was empty too.
    StillEmpty,
}

impl Admission {
    /// Whether the accepted snapshot changed.
    pub fn changed(&self) -> bool {
        matches!(self, Admission::Initial | Admission::Replaced)
    }
}

/// Error type for reconciler mutations.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    #[error("index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// Decides whether each incoming candidate snapshot replaces the
/// accepted one. See the module docs for the admission rules.
///
/// Single-threaded by design: candidate admission and local mutation
/// are sequenced by the caller's event loop, never concurrent.
pub struct StableReconciler<T: StableIdentity> {
    /// Identity of the owning entity (e.g., a sale id).
    entity: i64,
    accepted: Vec<T>,
    initialized: bool,
    /// What "unchanged" means for this collection. Parameterized because
    /// significance varies: derived price fields usually don't count.
    equivalent: Box<dyn Fn(&T, &T) -> bool + Send>,
    /// Upstream persistence hook, fired on deliberate local edits.
    on_change: Option<Box<dyn FnMut(&[T]) + Send>>,
}

impl<T: StableIdentity> std::fmt::Debug for StableReconciler<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StableReconciler")
            .field("entity", &self.entity)
            .field("accepted_len", &self.accepted.len())
            .field("initialized", &self.initialized)
            .finish()
    }
}

impl<T: StableIdentity> StableReconciler<T> {
    /// Create a reconciler bound to `entity` with the given equivalence
    /// predicate.
    pub fn new(entity: i64, equivalent: impl Fn(&T, &T) -> bool + Send + 'static) -> Self {
        StableReconciler {
            entity,
            accepted: Vec::new(),
            initialized: false,
            equivalent: Box::new(equivalent),
            on_change: None,
        }
    }

    /// Create a reconciler that reports local edits upstream.
    pub fn with_upstream(
        entity: i64,
        equivalent: impl Fn(&T, &T) -> bool + Send + 'static,
        on_change: impl FnMut(&[T]) + Send + 'static,
    ) -> Self {
        let mut reconciler = Self::new(entity, equivalent);
        reconciler.on_change = Some(Box::new(on_change));
        reconciler
    }

    /// The entity this reconciler is bound to.
    pub fn entity(&self) -> i64 {
        self.entity
    }

    /// The current authoritative snapshot.
    pub fn accepted(&self) -> &[T] {
        &self.accepted
    }

    /// Whether a first non-empty candidate has been accepted.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Offer a candidate snapshot; returns what happened to it.
    ///
    /// Candidates with duplicate identities are a producer bug and
    /// panic rather than being silently repaired.
    pub fn offer(&mut self, candidate: Vec<T>) -> Admission {
        assert_unique_identities(&candidate);

        if !self.initialized {
            if candidate.is_empty() {
                return Admission::StillEmpty;
            }
            self.accepted = candidate;
            self.initialized = true;
            return Admission::Initial;
        }

        if candidate.is_empty() && !self.accepted.is_empty() {
            debug!(
                entity = self.entity,
                held = self.accepted.len(),
                "holding accepted snapshot over transient empty candidate"
            );
            return Admission::HeldEmpty;
        }

        if self.is_equivalent(&candidate) {
            return Admission::HeldEquivalent;
        }

        self.accepted = candidate;
        Admission::Replaced
    }

    /// Remove the item at `index` from the accepted snapshot.
    ///
    /// A deliberate local edit: it bypasses admission, takes effect
    /// synchronously, and fires the upstream callback exactly once with
    /// the new list. Returns the removed item.
    pub fn remove_at(&mut self, index: usize) -> Result<T, ReconcileError> {
        if index >= self.accepted.len() {
            return Err(ReconcileError::IndexOutOfBounds {
                index,
                len: self.accepted.len(),
            });
        }
        let removed = self.accepted.remove(index);
        if let Some(on_change) = self.on_change.as_mut() {
            on_change(&self.accepted);
        }
        Ok(removed)
    }

    /// Re-key to a different owning entity, discarding all state.
    ///
    /// Same entity is a no-op. A stale snapshot must never survive into
    /// another entity's view, not even to bridge a loading gap.
    pub fn rebind(&mut self, entity: i64) {
        if entity == self.entity {
            return;
        }
        debug!(from = self.entity, to = entity, "rebinding reconciler");
        self.entity = entity;
        self.accepted = Vec::new();
        self.initialized = false;
    }

    /// Candidate and accepted hold equivalent items, matched by stable
    /// identity rather than position.
    fn is_equivalent(&self, candidate: &[T]) -> bool {
        if candidate.len() != self.accepted.len() {
            return false;
        }
        let by_key: HashMap<T::Key, &T> = self
            .accepted
            .iter()
            .map(|item| (item.identity(), item))
            .collect();
        candidate.iter().all(|item| {
            by_key
                .get(&item.identity())
                .is_some_and(|accepted| (self.equivalent)(accepted, item))
        })
    }
}
