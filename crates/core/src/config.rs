// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tunables passed explicitly from the top level.
//!
//! There is no global state: every component that scores, limits or times
//! something receives a [`GhostConfig`] (or a piece of it) as an argument.

use std::time::Duration;

/// Relevance score weights (see the scorer for the formula).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    /// Per file shared with the current working set.
    pub file_match: f64,
    /// Per file shared with the working set's co-modification neighbours.
    pub neighbour_match: f64,
    /// Entry area equals the working set's area (and is not `general`).
    pub area_match: f64,
    /// Scaled by the 30-day recency window.
    pub recency: f64,
    /// Entry carries a rule.
    pub rule: f64,
    /// Entry names no files at all (legacy baseline).
    pub no_files_baseline: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            file_match: 10.0,
            neighbour_match: 5.0,
            area_match: 5.0,
            recency: 3.0,
            rule: 20.0,
            no_files_baseline: 1.0,
        }
    }
}

/// Top-level configuration record.
#[derive(Debug, Clone)]
pub struct GhostConfig {
    pub weights: ScoreWeights,
    /// Days over which the recency bonus decays to zero.
    pub recency_window_days: i64,
    /// Entries probed for staleness: `2 * top_k` highest scored.
    pub top_k: usize,
    /// Files probed per entry during the staleness pass.
    pub staleness_probe_files: usize,
    /// Commits touching a probed file since the entry date that mark it stale.
    pub staleness_commit_threshold: u32,
    /// Score subtracted from stale entries.
    pub staleness_penalty: f64,
    /// Continuity paragraph only considers sessions this recent.
    pub continuity_window: Duration,
    /// Files attributed to an entry when the extractor assigned none.
    pub default_entry_files: usize,
    /// Co-modification neighbours surfaced as review candidates.
    pub neighbour_k: usize,
    /// Subprocess budget inside hook processes.
    pub hook_scm_timeout: Duration,
    /// Subprocess budget for finalizer network calls (fetch/push).
    pub sync_timeout: Duration,
    /// Minimum interval between shared-knowledge pulls.
    pub sync_interval: Duration,
    /// Background log rotation threshold in bytes.
    pub background_log_max_bytes: u64,
    /// Lines kept when the background log rotates.
    pub background_log_keep_lines: usize,
    /// Sessions listed by `log`.
    pub log_list_limit: usize,
}

impl Default for GhostConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            recency_window_days: 30,
            top_k: 5,
            staleness_probe_files: 3,
            staleness_commit_threshold: 10,
            staleness_penalty: 5.0,
            continuity_window: Duration::from_secs(24 * 3600),
            default_entry_files: 5,
            neighbour_k: 5,
            hook_scm_timeout: Duration::from_secs(3),
            sync_timeout: Duration::from_secs(30),
            sync_interval: Duration::from_secs(5 * 60),
            background_log_max_bytes: 50 * 1024,
            background_log_keep_lines: 200,
            log_list_limit: 20,
        }
    }
}
