// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Agent-session-id to internal-id map.
//!
//! Multiple concurrent host sessions may share one repository; this map is
//! how each hook finds the transcript it should write into. Entries are
//! added at SessionStart and removed at finalize. The file is a flat JSON
//! object rewritten atomically on every change.

use crate::fsutil::{read_or_empty, write_atomic};
use ghost_core::paths;
use indexmap::IndexMap;
use std::path::Path;

/// Load the map, treating a missing or malformed file as empty.
pub fn load(repo: &Path) -> IndexMap<String, String> {
    let raw = read_or_empty(&paths::session_map(repo));
    if raw.trim().is_empty() {
        return IndexMap::new();
    }
    serde_json::from_str(&raw).unwrap_or_default()
}

/// Map `agent_id` to `internal_id`, replacing any stale entry.
pub fn insert(repo: &Path, agent_id: &str, internal_id: &str) {
    let mut map = load(repo);
    map.insert(agent_id.to_string(), internal_id.to_string());
    store(repo, &map);
}

/// Internal id for `agent_id`, if mapped.
pub fn resolve(repo: &Path, agent_id: &str) -> Option<String> {
    load(repo).get(agent_id).cloned()
}

/// Drop the entry for `agent_id` (missing entries are fine).
pub fn remove(repo: &Path, agent_id: &str) {
    let mut map = load(repo);
    if map.shift_remove(agent_id).is_some() {
        store(repo, &map);
    }
}

/// Drop every entry pointing at `internal_id`.
///
/// Used by finalize when resolution went through the current-id marker, so
/// a dangling mapping cannot redirect later hooks into `completed/`.
pub fn remove_by_internal(repo: &Path, internal_id: &str) {
    let mut map = load(repo);
    let before = map.len();
    map.retain(|_, v| v != internal_id);
    if map.len() != before {
        store(repo, &map);
    }
}

fn store(repo: &Path, map: &IndexMap<String, String>) {
    let Ok(json) = serde_json::to_string_pretty(map) else {
        return;
    };
    if let Err(err) = write_atomic(&paths::session_map(repo), &json) {
        tracing::debug!(error = %err, "session map write failed");
    }
}

#[cfg(test)]
#[path = "session_map_tests.rs"]
mod tests;
