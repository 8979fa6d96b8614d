// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tag index: tag -> session ids, cached in `tags.json`.
//!
//! The index is rebuildable from session frontmatters; losing a write to a
//! concurrent writer costs one tag addition at worst, repaired by
//! `reindex`. Values are sets kept as insertion-ordered arrays.

use crate::fsutil::{read_or_empty, write_atomic};
use ghost_core::paths;
use indexmap::IndexMap;
use std::path::Path;

pub type TagIndex = IndexMap<String, Vec<String>>;

/// Load the index, tolerating damage: a scalar value becomes a singleton
/// list, anything else non-array is dropped (`validate` reports these).
pub fn load(repo: &Path) -> TagIndex {
    let raw = read_or_empty(&paths::tags_index(repo));
    parse(&raw)
}

/// Tolerant parse of the raw index JSON.
pub fn parse(raw: &str) -> TagIndex {
    let mut index = TagIndex::new();
    let Ok(value) = serde_json::from_str::<serde_json::Value>(raw) else {
        return index;
    };
    let Some(object) = value.as_object() else {
        return index;
    };
    for (tag, sessions) in object {
        match sessions {
            serde_json::Value::Array(items) => {
                let list: Vec<String> = items
                    .iter()
                    .filter_map(|v| v.as_str())
                    .map(str::to_string)
                    .collect();
                index.insert(tag.clone(), list);
            }
            serde_json::Value::String(s) => {
                index.insert(tag.clone(), vec![s.clone()]);
            }
            _ => {}
        }
    }
    index
}

/// Persist the index atomically.
pub fn save(repo: &Path, index: &TagIndex) {
    let Ok(json) = serde_json::to_string_pretty(index) else {
        return;
    };
    if let Err(err) = write_atomic(&paths::tags_index(repo), &json) {
        tracing::debug!(error = %err, "tag index write failed");
    }
}

/// Add `session_id` under `tag`. Appending an existing pair is a no-op.
/// Returns true when the index changed.
pub fn add(repo: &Path, tag: &str, session_id: &str) -> bool {
    let tag = tag.trim();
    if tag.is_empty() {
        return false;
    }
    let mut index = load(repo);
    let sessions = index.entry(tag.to_string()).or_default();
    if sessions.iter().any(|s| s == session_id) {
        return false;
    }
    sessions.push(session_id.to_string());
    save(repo, &index);
    true
}

/// Session ids carrying `tag`.
pub fn sessions_for(repo: &Path, tag: &str) -> Vec<String> {
    load(repo).get(tag).cloned().unwrap_or_default()
}

/// Deep union of two indexes: every tag from either side, each value the
/// ordered union of both session lists. Idempotent and commutative up to
/// ordering.
pub fn union(a: &TagIndex, b: &TagIndex) -> TagIndex {
    let mut merged = a.clone();
    for (tag, sessions) in b {
        let slot = merged.entry(tag.clone()).or_default();
        for session in sessions {
            if !slot.iter().any(|s| s == session) {
                slot.push(session.clone());
            }
        }
    }
    merged
}

#[cfg(test)]
#[path = "tags_tests.rs"]
mod tests;
