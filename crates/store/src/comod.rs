// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Co-modification graph over completed sessions.
//!
//! Two files are co-modified when both appear as `- Modified:` lines inside
//! the same turn (the span between `---` delimiters). Edge weight counts
//! such turns across all completed transcripts. The graph is advisory and
//! cheap to rebuild, so the cache key is simply the completed-session
//! count.

use crate::fsutil::{read_or_empty, write_atomic};
use crate::session;
use ghost_core::paths;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Adjacency lists sorted by weight descending per vertex.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoModGraph {
    #[serde(rename = "sessionCount")]
    pub session_count: usize,
    pub graph: BTreeMap<String, Vec<(String, u32)>>,
}

impl CoModGraph {
    /// Neighbours of the working set: for each file not in `files`, the
    /// number of working-set files whose adjacency list contains it. Top
    /// `k` by count, ties broken lexicographically.
    pub fn neighbours(&self, files: &[String], k: usize) -> Vec<String> {
        let working: BTreeSet<&str> = files.iter().map(String::as_str).collect();
        let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
        for file in files {
            let Some(adjacent) = self.graph.get(file) else {
                continue;
            };
            for (neighbour, _weight) in adjacent {
                if !working.contains(neighbour.as_str()) {
                    *counts.entry(neighbour).or_insert(0) += 1;
                }
            }
        }
        let mut ranked: Vec<(&str, u32)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        ranked
            .into_iter()
            .take(k)
            .map(|(path, _)| path.to_string())
            .collect()
    }
}

/// Per-turn sets of modified paths, in transcript order.
pub fn turn_modified_sets(content: &str) -> Vec<BTreeSet<String>> {
    let mut turns = Vec::new();
    let mut current = BTreeSet::new();
    for line in content.lines() {
        if line.trim_end() == "---" {
            turns.push(std::mem::take(&mut current));
            continue;
        }
        if let Some(path) = line.strip_prefix("- Modified: ") {
            let path = path.trim();
            if !path.is_empty() {
                current.insert(path.to_string());
            }
        }
    }
    turns.push(current);
    turns
}

/// Paths modified in adjacent turn pairs, with how many pairs repeated
/// each. Two or more repeats flag a correction pass worth archiving.
pub fn correction_counts(content: &str) -> BTreeMap<String, u32> {
    let turns = turn_modified_sets(content);
    let mut counts = BTreeMap::new();
    for pair in turns.windows(2) {
        for path in pair[0].intersection(&pair[1]) {
            *counts.entry(path.clone()).or_insert(0) += 1;
        }
    }
    counts
}

/// Build the graph by walking every completed transcript.
pub fn build(repo: &Path) -> CoModGraph {
    let ids = session::list_completed(repo);
    let mut edges: BTreeMap<String, BTreeMap<String, u32>> = BTreeMap::new();

    for id in &ids {
        let Some(content) = session::read_session(repo, id) else {
            continue;
        };
        for turn in turn_modified_sets(&content) {
            let files: Vec<&String> = turn.iter().collect();
            for (i, a) in files.iter().enumerate() {
                for b in files.iter().skip(i + 1) {
                    *edges
                        .entry((*a).clone())
                        .or_default()
                        .entry((*b).clone())
                        .or_insert(0) += 1;
                    *edges
                        .entry((*b).clone())
                        .or_default()
                        .entry((*a).clone())
                        .or_insert(0) += 1;
                }
            }
        }
    }

    let graph = edges
        .into_iter()
        .map(|(vertex, adjacent)| {
            let mut list: Vec<(String, u32)> = adjacent.into_iter().collect();
            list.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
            (vertex, list)
        })
        .collect();

    CoModGraph {
        session_count: ids.len(),
        graph,
    }
}

/// Cached graph when the completed count still matches, else rebuild and
/// refresh the cache.
pub fn load_or_build(repo: &Path) -> CoModGraph {
    let completed = session::list_completed(repo).len();
    let raw = read_or_empty(&paths::comod_cache(repo));
    if !raw.is_empty() {
        if let Ok(cached) = serde_json::from_str::<CoModGraph>(&raw) {
            if cached.session_count == completed {
                return cached;
            }
        }
    }
    let graph = build(repo);
    if let Ok(json) = serde_json::to_string(&graph) {
        let _ = write_atomic(&paths::comod_cache(repo), &json);
    }
    graph
}

#[cfg(test)]
#[path = "comod_tests.rs"]
mod tests;
