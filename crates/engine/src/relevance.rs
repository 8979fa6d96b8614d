// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Relevance scoring: which knowledge entries earn a place in a new
//! session's injected context.
//!
//! Scoring is a pure function of the entry and the current working set;
//! the only I/O is the optional staleness probe, which asks git how much
//! churn each candidate's files have seen since the entry was written.

use ghost_adapters::Git;
use ghost_core::entry::{derive_area, KnowledgeEntry, GENERAL_AREA};
use ghost_core::{time_fmt, GhostConfig};

/// An entry with its computed score.
#[derive(Debug, Clone)]
pub struct ScoredEntry {
    pub entry: KnowledgeEntry,
    pub score: f64,
}

/// Score one entry against the working set.
///
/// ```text
/// score = 10 * |files ∩ F|
///       +  5 * |files ∩ neighbours(F)|
///       +  5 * [area != general and area == area(F)]
///       +  3 * max(0, 1 - days_since(date) / 30)
///       + 20 * [rule non-empty]
///       +  1 * [no files at all]      (legacy baseline)
/// ```
pub fn score_entry(
    entry: &KnowledgeEntry,
    files: &[String],
    neighbours: &[String],
    working_area: &str,
    config: &GhostConfig,
) -> f64 {
    let w = &config.weights;
    let mut score = 0.0;

    let file_hits = entry.files.iter().filter(|f| files.contains(f)).count();
    score += w.file_match * file_hits as f64;

    let neighbour_hits = entry
        .files
        .iter()
        .filter(|f| neighbours.contains(f))
        .count();
    score += w.neighbour_match * neighbour_hits as f64;

    if entry.area != GENERAL_AREA && entry.area == working_area {
        score += w.area_match;
    }

    if let Some(date) = entry.date {
        let age = time_fmt::days_since(date) as f64;
        let window = config.recency_window_days as f64;
        score += w.recency * (1.0 - age / window).max(0.0);
    }

    if entry.has_rule() {
        score += w.rule;
    }

    if entry.files.is_empty() {
        score += w.no_files_baseline;
    }

    score
}

/// Score and sort all entries, best first. Ties break newest-first, then
/// by title, so the ordering is stable across runs.
pub fn rank(
    entries: Vec<KnowledgeEntry>,
    files: &[String],
    neighbours: &[String],
    config: &GhostConfig,
) -> Vec<ScoredEntry> {
    let working_area = derive_area(files);
    let mut scored: Vec<ScoredEntry> = entries
        .into_iter()
        .map(|entry| {
            let score = score_entry(&entry, files, neighbours, &working_area, config);
            ScoredEntry { entry, score }
        })
        .collect();
    sort_scored(&mut scored);
    scored
}

fn sort_scored(scored: &mut [ScoredEntry]) {
    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.entry.date.cmp(&a.entry.date))
            .then_with(|| a.entry.title.cmp(&b.entry.title))
    });
}

/// Penalize entries whose files have churned hard since the entry's date.
///
/// Probes the top `2k` entries, first `staleness_probe_files` files each;
/// any file with more than `staleness_commit_threshold` commits since the
/// entry date costs `staleness_penalty`. Skipped entirely without a git
/// handle (the scorer stays useful in tests and plain directories).
pub async fn apply_staleness(scored: &mut Vec<ScoredEntry>, git: &Git, config: &GhostConfig) {
    let probe_count = (config.top_k * 2).min(scored.len());
    for slot in scored.iter_mut().take(probe_count) {
        let Some(date) = slot.entry.date else {
            continue;
        };
        for file in slot.entry.files.iter().take(config.staleness_probe_files) {
            match git.commits_touching_since(file, date).await {
                Some(commits) if commits > config.staleness_commit_threshold => {
                    slot.score -= config.staleness_penalty;
                    break;
                }
                _ => {}
            }
        }
    }
    sort_scored(scored);
}

/// The top `k` positively scored entries, or the `k` most recent when
/// nothing scores positive (a cold start still surfaces something).
pub fn select_top(scored: Vec<ScoredEntry>, config: &GhostConfig) -> Vec<KnowledgeEntry> {
    let positive: Vec<KnowledgeEntry> = scored
        .iter()
        .filter(|s| s.score > 0.0)
        .take(config.top_k)
        .map(|s| s.entry.clone())
        .collect();
    if !positive.is_empty() {
        return positive;
    }

    let mut by_date: Vec<KnowledgeEntry> = scored.into_iter().map(|s| s.entry).collect();
    by_date.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.title.cmp(&b.title)));
    by_date.truncate(config.top_k);
    by_date
}

#[cfg(test)]
#[path = "relevance_tests.rs"]
mod tests;
