// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn session_id_has_date_prefix_and_hex_tail() {
    let id = generate_session_id();
    let parts: Vec<&str> = id.splitn(4, '-').collect();
    assert_eq!(parts.len(), 4, "got: {}", id);
    assert_eq!(parts[3].len(), 8, "got: {}", id);
    assert!(parts[3].chars().all(|c| c.is_ascii_hexdigit()));
    assert!(session_date(&id).is_some());
}

#[test]
fn session_ids_are_unique() {
    let a = generate_session_id();
    let b = generate_session_id();
    assert_ne!(a, b);
}

#[test]
fn session_date_parses_prefix() {
    let date = session_date("2026-08-02-ab12cd34").unwrap();
    assert_eq!(date.to_string(), "2026-08-02");
}

#[test]
fn session_date_rejects_malformed_ids() {
    assert!(session_date("not-a-date").is_none());
    assert!(session_date("").is_none());
    assert!(session_date("2026-13-99-ab12cd34").is_none());
}

#[test]
fn prompt_hash_is_deterministic_and_short() {
    let a = prompt_hash("fix the cart total");
    let b = prompt_hash("fix the cart total");
    assert_eq!(a, b);
    assert_eq!(a.len(), 8);
    assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
}

#[test]
fn prompt_hash_differs_by_text() {
    assert_ne!(prompt_hash("fix"), prompt_hash("fix "));
}
