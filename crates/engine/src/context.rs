// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SessionStart context assembly.
//!
//! Builds the single text block a new session receives on stdout:
//! continuity from the previous session, standing rules and relevant
//! mistakes, relevant decisions, co-modification review candidates, and
//! the standing briefing. Every subsection is independently best-effort:
//! an error or empty result just omits that subsection.

use crate::extract::Summary;
use crate::relevance;
use chrono::{DateTime, Utc};
use ghost_adapters::Git;
use ghost_core::entry::KnowledgeEntry;
use ghost_core::frontmatter::Frontmatter;
use ghost_core::{time_fmt, GhostConfig};
use ghost_store::{comod, knowledge, session, KnowledgeLog};
use std::path::Path;

/// Fixed closing paragraph reminding the agent to persist knowledge.
pub const STANDING_BRIEFING: &str = "\
Briefing: record noteworthy decisions and mistakes as you work \
(`ghost mistake \"...\"` for anything that cost you a correction pass); \
they are injected into future sessions touching the same files.";

/// Assemble the full SessionStart context block. May be empty.
pub async fn session_start_context(repo: &Path, git: Option<&Git>, config: &GhostConfig) -> String {
    let files = match git {
        Some(git) => git.modified_files().await,
        None => Vec::new(),
    };
    let branch = match git {
        Some(git) => git.current_branch().await,
        None => None,
    };
    let graph = comod::load_or_build(repo);
    let neighbours = graph.neighbours(&files, config.neighbour_k);

    let mut sections: Vec<String> = Vec::new();

    if let Some(block) = continuity_block(repo, branch.as_deref(), config) {
        sections.push(block);
    }
    if let Some(block) =
        scored_block(repo, KnowledgeLog::Mistakes, git, config, &files, &neighbours).await
    {
        sections.push(block);
    }
    if let Some(block) =
        scored_block(repo, KnowledgeLog::Decisions, git, config, &files, &neighbours).await
    {
        sections.push(block);
    }
    if let Some(block) = review_candidates_block(&neighbours) {
        sections.push(block);
    }

    if sections.is_empty() {
        return String::new();
    }
    sections.push(STANDING_BRIEFING.to_string());
    sections.join("\n\n")
}

/// Continuity paragraph: the most recent completed session on this branch
/// that ended within the window and left open items.
pub fn continuity_block(repo: &Path, branch: Option<&str>, config: &GhostConfig) -> Option<String> {
    let now = Utc::now();
    // Newest first; only a handful need checking thanks to the window.
    for id in session::list_completed(repo).into_iter().rev().take(10) {
        let Some(content) = session::read_session(repo, &id) else {
            continue;
        };
        let (fm, _) = Frontmatter::split(&content);
        if let (Some(branch), Some(session_branch)) = (branch, fm.scalar("branch")) {
            if branch != session_branch {
                continue;
            }
        }
        let Some(ended) = fm.scalar("ended").and_then(parse_iso) else {
            continue;
        };
        let age = now.signed_duration_since(ended);
        if age.num_seconds() < 0 || age.num_seconds() as u64 > config.continuity_window.as_secs() {
            continue;
        }
        let Some(open) = transcript_summary(&content).and_then(|s| s.open_items().map(str::to_string))
        else {
            continue;
        };
        let elapsed = time_fmt::format_elapsed(age.num_seconds() as u64);
        return Some(format!(
            "## Continuing from session {}\nThe previous session on this branch ended {} ago with open items:\n{}",
            id, elapsed, open
        ));
    }
    None
}

/// Relevance-ranked entries from one log, rules first.
async fn scored_block(
    repo: &Path,
    log: KnowledgeLog,
    git: Option<&Git>,
    config: &GhostConfig,
    files: &[String],
    neighbours: &[String],
) -> Option<String> {
    let entries = knowledge::read_log(repo, log);
    if entries.is_empty() {
        return None;
    }
    let mut scored = relevance::rank(entries, files, neighbours, config);
    if let Some(git) = git {
        relevance::apply_staleness(&mut scored, git, config).await;
    }
    let selected = relevance::select_top(scored, config);
    if selected.is_empty() {
        return None;
    }
    let heading = match log {
        KnowledgeLog::Mistakes => "Past mistakes near your working set",
        KnowledgeLog::Decisions => "Decisions that apply here",
    };
    Some(format_entries(heading, &selected))
}

/// Rule-bearing entries first under a warning heading (rule text
/// verbatim), then the rest grouped by their leading file.
pub fn format_entries(heading: &str, entries: &[KnowledgeEntry]) -> String {
    let mut out = String::new();

    let rules: Vec<&KnowledgeEntry> = entries.iter().filter(|e| e.has_rule()).collect();
    if !rules.is_empty() {
        out.push_str("## ⚠ Standing rules\n");
        for entry in &rules {
            out.push_str(&format!(
                "- {} ({})\n",
                entry.rule.as_deref().unwrap_or_default(),
                entry.title
            ));
        }
    }

    let rest: Vec<&KnowledgeEntry> = entries.iter().filter(|e| !e.has_rule()).collect();
    if !rest.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("## {}\n", heading));
        let mut last_group: Option<String> = None;
        for entry in &rest {
            let group = entry
                .files
                .first()
                .cloned()
                .unwrap_or_else(|| entry.area.clone());
            if last_group.as_deref() != Some(group.as_str()) {
                out.push_str(&format!("### {}\n", group));
                last_group = Some(group);
            }
            out.push_str(&format!("- {}", entry.title));
            if !entry.description.is_empty() {
                let first_line = entry.description.lines().next().unwrap_or_default();
                out.push_str(&format!(": {}", first_line));
            }
            out.push('\n');
        }
    }

    out.trim_end().to_string()
}

fn review_candidates_block(neighbours: &[String]) -> Option<String> {
    if neighbours.is_empty() {
        return None;
    }
    let mut out = String::from("## Review candidates (co-modified with your working set)\n");
    for path in neighbours {
        out.push_str(&format!("- {}\n", path));
    }
    Some(out.trim_end().to_string())
}

/// `resume [id]`: continuity block for a specific session, or the most
/// recent completed one, regardless of branch or window.
pub fn resume_block(repo: &Path, id: Option<&str>) -> Option<String> {
    let id = match id {
        Some(id) => id.to_string(),
        None => session::latest_completed(repo)?.0,
    };
    let content = session::read_session(repo, &id)?;
    let summary = transcript_summary(&content);

    let mut out = format!("## Resuming session {}\n", id);
    if let Some(intent) = summary.as_ref().and_then(|s| s.section("Intent")) {
        if !intent.is_empty() {
            out.push_str(&format!("Intent: {}\n", intent));
        }
    }
    let modified = session::modified_paths(&content);
    if !modified.is_empty() {
        out.push_str("Touched files:\n");
        for path in modified.iter().take(10) {
            out.push_str(&format!("- {}\n", path));
        }
    }
    if let Some(open) = summary.as_ref().and_then(|s| s.open_items()) {
        out.push_str(&format!("Open items:\n{}\n", open));
    }
    Some(out.trim_end().to_string())
}

/// `brief "<text>"`: knowledge entries whose text or area overlaps the
/// topic, rules first.
pub fn brief_block(repo: &Path, topic: &str) -> Option<String> {
    let needle = topic.to_lowercase();
    let words: Vec<&str> = needle.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }
    let matches: Vec<KnowledgeEntry> = knowledge::read_all(repo)
        .into_iter()
        .filter(|entry| {
            let haystack = format!(
                "{} {} {} {}",
                entry.title.to_lowercase(),
                entry.description.to_lowercase(),
                entry.area.to_lowercase(),
                entry.files.join(" ").to_lowercase()
            );
            words.iter().any(|w| haystack.contains(w))
        })
        .collect();
    if matches.is_empty() {
        return None;
    }
    Some(format_entries(&format!("Brief: {}", topic), &matches))
}

fn transcript_summary(content: &str) -> Option<Summary> {
    let (_, summary_text) = content.split_once("\n# Summary\n")?;
    Some(Summary::parse(summary_text))
}

fn parse_iso(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
