// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only knowledge logs and session tagging.
//!
//! `mistakes.md` and `decisions.md` hold [`KnowledgeEntry`] blocks, newest
//! last. Writers only emit the structured form; the parser accepts legacy
//! `- title` lines interleaved with it forever (see `ghost_core::entry`).

use crate::fsutil::{append_block, read_or_empty, write_atomic};
use crate::{session_map, tags, StoreError};
use ghost_core::entry::{parse_entries, KnowledgeEntry};
use ghost_core::{frontmatter, paths};
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

/// The two entry logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnowledgeLog {
    Mistakes,
    Decisions,
}

impl KnowledgeLog {
    pub fn path(&self, repo: &Path) -> PathBuf {
        match self {
            KnowledgeLog::Mistakes => paths::mistakes_file(repo),
            KnowledgeLog::Decisions => paths::decisions_file(repo),
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            KnowledgeLog::Mistakes => "Mistakes",
            KnowledgeLog::Decisions => "Decisions",
        }
    }
}

/// Append one entry to a log, creating the file on first write.
pub fn append_entry(
    repo: &Path,
    log: KnowledgeLog,
    entry: &KnowledgeEntry,
) -> Result<(), StoreError> {
    let path = log.path(repo);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        // Touch so append_block finds it; the header line keeps the file
        // readable on its own.
        OpenOptions::new().create(true).append(true).open(&path)?;
        append_block(&path, &format!("# {}\n", log.title()));
    }
    append_block(&path, &format!("\n{}", entry.format()));
    Ok(())
}

/// All entries in a log, oldest first. Missing file is an empty log.
pub fn read_log(repo: &Path, log: KnowledgeLog) -> Vec<KnowledgeEntry> {
    parse_entries(&read_or_empty(&log.path(repo)))
}

/// All entries from both logs, oldest first within each log.
pub fn read_all(repo: &Path) -> Vec<KnowledgeEntry> {
    let mut entries = read_log(repo, KnowledgeLog::Mistakes);
    entries.extend(read_log(repo, KnowledgeLog::Decisions));
    entries
}

/// Merge `new_tags` into a session's frontmatter tag sequence (order
/// preserved, duplicates dropped) and mirror them into the tag index.
///
/// The session file is looked up in `completed/` first, then `active/`.
/// Returns the merged tag list, or `None` when the session has no file.
pub fn add_tags(repo: &Path, session_id: &str, new_tags: &[String]) -> Option<Vec<String>> {
    let path = [
        paths::completed_session(repo, session_id),
        paths::active_session(repo, session_id),
    ]
    .into_iter()
    .find(|p| p.exists())?;

    let content = read_or_empty(&path);
    let mut merged: Vec<String> = Vec::new();
    let updated = frontmatter::update_document(&content, |fm| {
        merged = fm.seq("tags");
        for tag in new_tags {
            let tag = tag.trim();
            if !tag.is_empty() && !merged.iter().any(|t| t == tag) {
                merged.push(tag.to_string());
            }
        }
        fm.set_seq("tags", merged.clone());
    });
    if let Err(err) = write_atomic(&path, &updated) {
        tracing::debug!(error = %err, "tag frontmatter write failed");
        return None;
    }

    for tag in &merged {
        tags::add(repo, tag, session_id);
    }
    Some(merged)
}

/// Mark a session's transcript as excluded from knowledge extraction.
pub fn set_skip_knowledge(repo: &Path, session_id: &str) {
    for path in [
        paths::completed_session(repo, session_id),
        paths::active_session(repo, session_id),
    ] {
        if path.exists() {
            let content = read_or_empty(&path);
            let updated =
                frontmatter::update_document(&content, |fm| fm.set_scalar("skip_knowledge", "true"));
            let _ = write_atomic(&path, &updated);
            return;
        }
    }
}

/// Rebuild the tag index from session frontmatters (completed and active).
///
/// The index is a cache; this is the recovery path after a lost write.
pub fn rebuild_tag_index(repo: &Path) -> tags::TagIndex {
    let mut index = tags::TagIndex::new();
    let sessions = crate::session::list_completed(repo)
        .into_iter()
        .chain(crate::session::list_active(repo));
    for id in sessions {
        let Some(content) = crate::session::read_session(repo, &id) else {
            continue;
        };
        let (fm, _) = frontmatter::Frontmatter::split(&content);
        for tag in fm.seq("tags") {
            let slot = index.entry(tag).or_default();
            if !slot.iter().any(|s| s == &id) {
                slot.push(id.clone());
            }
        }
    }
    tags::save(repo, &index);
    index
}

/// Remove session-map entries pointing at ids with no active transcript.
/// Returns the agent ids that were dropped.
pub fn prune_stale_map_entries(repo: &Path) -> Vec<String> {
    let map = session_map::load(repo);
    let mut dropped = Vec::new();
    for (agent_id, internal_id) in &map {
        if !paths::active_session(repo, internal_id).exists() {
            dropped.push(agent_id.clone());
        }
    }
    for agent_id in &dropped {
        session_map::remove(repo, agent_id);
    }
    dropped
}

#[cfg(test)]
#[path = "knowledge_tests.rs"]
mod tests;
