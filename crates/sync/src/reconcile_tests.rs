// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for stable snapshot reconciliation.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::{Arc, Mutex};

use tl_core::{LineItem, StableIdentity};

use super::reconcile::{Admission, ReconcileError, StableReconciler};
use super::test_helpers::make_item;

const SALE: i64 = 42;

fn make_reconciler() -> StableReconciler<LineItem> {
    StableReconciler::new(SALE, |a: &LineItem, b: &LineItem| a.same_content(b))
}

#[test]
fn first_nonempty_candidate_initializes() {
    let mut reconciler = make_reconciler();
    assert!(!reconciler.is_initialized());

    let admission = reconciler.offer(vec![make_item(1, 2)]);
    assert_eq!(admission, Admission::Initial);
    assert!(admission.changed());
    assert!(reconciler.is_initialized());
    assert_eq!(reconciler.accepted(), &[make_item(1, 2)]);
}

#[test]
fn empty_candidates_before_init_leave_it_uninitialized() {
    let mut reconciler = make_reconciler();
    assert_eq!(reconciler.offer(vec![]), Admission::StillEmpty);
    assert_eq!(reconciler.offer(vec![]), Admission::StillEmpty);
    assert!(!reconciler.is_initialized());
    assert!(reconciler.accepted().is_empty());
}

#[test]
fn transient_empty_candidate_is_held() {
    let mut reconciler = make_reconciler();
    reconciler.offer(vec![make_item(1, 2)]);

    // The anti-flicker rule: a loading gap never blanks a valid view.
    let admission = reconciler.offer(vec![]);
    assert_eq!(admission, Admission::HeldEmpty);
    assert!(!admission.changed());
    assert_eq!(reconciler.accepted(), &[make_item(1, 2)]);
}

#[test]
fn equivalent_candidate_is_held() {
    let mut reconciler = make_reconciler();
    reconciler.offer(vec![make_item(1, 2), make_item(2, 1)]);

    // Fresh values, same content: the accepted snapshot must not churn.
    let mut refetched = vec![make_item(1, 2), make_item(2, 1)];
    refetched[0].unit_price_cents = 9900; // derived field, not significant
    assert_eq!(reconciler.offer(refetched), Admission::HeldEquivalent);
    assert_eq!(reconciler.accepted()[0].unit_price_cents, 1500);
}

#[test]
fn reordered_equivalent_candidate_is_held() {
    let mut reconciler = make_reconciler();
    reconciler.offer(vec![make_item(1, 2), make_item(2, 1)]);

    // Items are matched by identity, not position.
    let admission = reconciler.offer(vec![make_item(2, 1), make_item(1, 2)]);
    assert_eq!(admission, Admission::HeldEquivalent);
}

#[test]
fn quantity_change_replaces() {
    let mut reconciler = make_reconciler();
    reconciler.offer(vec![make_item(1, 2)]);

    let admission = reconciler.offer(vec![make_item(1, 3)]);
    assert_eq!(admission, Admission::Replaced);
    assert_eq!(reconciler.accepted(), &[make_item(1, 3)]);
}

#[test]
fn different_length_replaces() {
    let mut reconciler = make_reconciler();
    reconciler.offer(vec![make_item(1, 2)]);

    let admission = reconciler.offer(vec![make_item(1, 2), make_item(2, 1)]);
    assert_eq!(admission, Admission::Replaced);
    assert_eq!(reconciler.accepted().len(), 2);
}

#[test]
fn swapped_identity_replaces() {
    let mut reconciler = make_reconciler();
    reconciler.offer(vec![make_item(1, 2), make_item(2, 1)]);

    // Same length, one identity differs.
    let admission = reconciler.offer(vec![make_item(1, 2), make_item(3, 1)]);
    assert_eq!(admission, Admission::Replaced);
}

#[test]
fn remove_at_updates_and_reports_upstream_once() {
    let reported: Arc<Mutex<Vec<Vec<LineItem>>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&reported);
    let mut reconciler = StableReconciler::with_upstream(
        SALE,
        |a: &LineItem, b: &LineItem| a.same_content(b),
        move |items: &[LineItem]| sink.lock().unwrap().push(items.to_vec()),
    );
    reconciler.offer(vec![make_item(1, 2), make_item(2, 1)]);

    let removed = reconciler.remove_at(0).unwrap();
    assert_eq!(removed, make_item(1, 2));
    assert_eq!(reconciler.accepted(), &[make_item(2, 1)]);

    let calls = reported.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0], vec![make_item(2, 1)]);
}

#[test]
fn remove_at_out_of_bounds_is_an_error() {
    let mut reconciler = make_reconciler();
    reconciler.offer(vec![make_item(1, 2)]);

    let result = reconciler.remove_at(5);
    assert!(matches!(
        result,
        Err(ReconcileError::IndexOutOfBounds { index: 5, len: 1 })
    ));
    assert_eq!(reconciler.accepted().len(), 1);
}

#[test]
fn removing_the_last_item_keeps_the_view_empty() {
    let mut reconciler = make_reconciler();
    reconciler.offer(vec![make_item(1, 2)]);
    reconciler.remove_at(0).unwrap();

    // A deliberate edit emptied the list; an empty refetch confirming
    // it is a no-op, not flicker suppression.
    assert_eq!(reconciler.offer(vec![]), Admission::HeldEquivalent);
    assert!(reconciler.accepted().is_empty());
}

#[test]
fn rebind_discards_the_previous_entity_state() {
    let mut reconciler = make_reconciler();
    reconciler.offer(vec![make_item(1, 2)]);

    reconciler.rebind(57);
    assert_eq!(reconciler.entity(), 57);
    assert!(!reconciler.is_initialized());
    assert!(reconciler.accepted().is_empty());

    // The old entity's snapshot must not resurface to bridge the gap.
    assert_eq!(reconciler.offer(vec![]), Admission::StillEmpty);
    assert!(reconciler.accepted().is_empty());
}

#[test]
fn rebind_to_the_same_entity_is_a_noop() {
    let mut reconciler = make_reconciler();
    reconciler.offer(vec![make_item(1, 2)]);

    reconciler.rebind(SALE);
    assert!(reconciler.is_initialized());
    assert_eq!(reconciler.accepted(), &[make_item(1, 2)]);
}

#[test]
#[should_panic(expected = "duplicate identity")]
fn duplicate_identities_in_a_candidate_panic() {
    let mut reconciler = make_reconciler();
    reconciler.offer(vec![make_item(1, 2), make_item(1, 3)]);
}

#[test]
fn custom_predicate_controls_equivalence() {
    // A collection where quantity is not significant either.
    let mut reconciler =
        StableReconciler::new(SALE, |a: &LineItem, b: &LineItem| a.identity() == b.identity());
    reconciler.offer(vec![make_item(1, 2)]);

    assert_eq!(
        reconciler.offer(vec![make_item(1, 99)]),
        Admission::HeldEquivalent
    );
}
