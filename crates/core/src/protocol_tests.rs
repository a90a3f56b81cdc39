// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use chrono::TimeZone;

#[test]
fn probe_wire_format() {
    let json = ClientMessage::probe(42).to_json().unwrap();
    assert_eq!(json, r#"{"type":"probe","id":42}"#);
}

#[test]
fn resync_roundtrip() {
    let since = Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).unwrap();
    let msg = ClientMessage::resync(since);
    let back = ClientMessage::from_json(&msg.to_json().unwrap()).unwrap();
    assert_eq!(back, msg);
}

#[test]
fn unknown_type_is_rejected() {
    assert!(ClientMessage::from_json(r#"{"type":"subscribe"}"#).is_err());
}
