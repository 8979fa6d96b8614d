// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session transcript lifecycle: create, append, finalize.
//!
//! A transcript lives in `active/<id>.md` while the session runs and moves
//! to `completed/<id>.md` exactly once, at finalize. Appends are one
//! open-append-close per call so interleaved hook processes stay safe, and
//! every operation returns quietly when its target is missing; a hook
//! fired without a live session is normal, not an error.

use crate::fsutil::{append_block, read_or_empty, write_atomic};
use crate::{session_map, StoreError};
use ghost_core::{frontmatter, id, paths, time_fmt};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static PROMPT_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^## Prompt (\d+)").expect("prompt heading regex"));

static PROMPT_HASH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!-- ph:([0-9a-f]{8}) -->").expect("prompt hash regex"));

static MODIFIED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^- Modified: (.+)$").expect("modified line regex"));

/// Repository context recorded in a new transcript's frontmatter.
#[derive(Debug, Clone, Default)]
pub struct SessionMeta {
    pub branch: Option<String>,
    pub base_commit: Option<String>,
}

/// Outcome of an append operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Append {
    Written,
    /// No live session, or the write was a deliberate no-op (prompt dedup).
    Skipped,
}

/// A session moved into `completed/`.
#[derive(Debug, Clone)]
pub struct Finalized {
    pub id: String,
    pub path: PathBuf,
}

/// Create a new active session and return its internal id.
///
/// Writes the frontmatter-only transcript, points the current-id marker at
/// it, and records the agent-id mapping when the host provided one.
pub fn create(
    repo: &Path,
    meta: &SessionMeta,
    agent_session_id: Option<&str>,
) -> Result<String, StoreError> {
    let internal_id = id::generate_session_id();

    let mut fm = frontmatter::Frontmatter::new();
    fm.set_scalar("id", internal_id.clone());
    if let Some(branch) = &meta.branch {
        fm.set_scalar("branch", branch.clone());
    }
    if let Some(commit) = &meta.base_commit {
        fm.set_scalar("base_commit", commit.clone());
    }
    fm.set_scalar("started", time_fmt::now_iso());
    fm.set_seq("tags", Vec::new());

    let path = paths::active_session(repo, &internal_id);
    write_atomic(&path, &format!("{}\n", fm.render()))?;

    // Marker last: once it points at the id, legacy callers may read it.
    write_atomic(&paths::current_id_marker(repo), &internal_id)?;
    if let Some(agent_id) = agent_session_id {
        session_map::insert(repo, agent_id, &internal_id);
    }
    Ok(internal_id)
}

/// Resolve the internal id a hook should write into: the session map when
/// an agent id is known, else the current-id marker.
pub fn resolve(repo: &Path, agent_session_id: Option<&str>) -> Option<String> {
    if let Some(agent_id) = agent_session_id {
        if let Some(internal) = session_map::resolve(repo, agent_id) {
            return Some(internal);
        }
    }
    let marker = read_or_empty(&paths::current_id_marker(repo));
    let marker = marker.trim();
    if marker.is_empty() {
        None
    } else {
        Some(marker.to_string())
    }
}

fn active_path(repo: &Path, agent_session_id: Option<&str>) -> Option<PathBuf> {
    let id = resolve(repo, agent_session_id)?;
    let path = paths::active_session(repo, &id);
    path.exists().then_some(path)
}

/// Append a `## Prompt N` block, deduplicating consecutive identical
/// submissions by prompt hash.
pub fn append_prompt(repo: &Path, agent_session_id: Option<&str>, text: &str) -> Append {
    let Some(path) = active_path(repo, agent_session_id) else {
        return Append::Skipped;
    };
    let hash = id::prompt_hash(text);
    let existing = read_or_empty(&path);
    let last_hash = PROMPT_HASH
        .captures_iter(&existing)
        .last()
        .map(|c| c[1].to_string());
    if last_hash.as_deref() == Some(hash.as_str()) {
        return Append::Skipped;
    }

    let n = prompt_count_in(&existing) + 1;
    let mut block = format!("\n## Prompt {} <!-- ph:{} -->\n", n, hash);
    for line in text.lines() {
        block.push_str("> ");
        block.push_str(line);
        block.push('\n');
    }
    if append_block(&path, &block) {
        Append::Written
    } else {
        Append::Skipped
    }
}

/// Append a `- Modified:` line, normalizing absolute paths under the repo
/// root to repo-relative.
pub fn append_file_modification(repo: &Path, agent_session_id: Option<&str>, file: &str) -> Append {
    let Some(path) = active_path(repo, agent_session_id) else {
        return Append::Skipped;
    };
    let rel = Path::new(file)
        .strip_prefix(repo)
        .ok()
        .and_then(|p| p.to_str())
        .unwrap_or(file);
    if append_block(&path, &format!("- Modified: {}\n", rel)) {
        Append::Written
    } else {
        Append::Skipped
    }
}

/// Append a `- Task:` line.
pub fn append_task_note(repo: &Path, agent_session_id: Option<&str>, text: &str) -> Append {
    let Some(path) = active_path(repo, agent_session_id) else {
        return Append::Skipped;
    };
    let text = text.lines().collect::<Vec<_>>().join(" ");
    if append_block(&path, &format!("- Task: {}\n", text)) {
        Append::Written
    } else {
        Append::Skipped
    }
}

/// Close a turn: `---` delimiter, completion timestamp, and an optional
/// fenced diff-stat of the worktree at that moment.
pub fn append_turn_delimiter(
    repo: &Path,
    agent_session_id: Option<&str>,
    diff_stat: Option<&str>,
) -> Append {
    let Some(path) = active_path(repo, agent_session_id) else {
        return Append::Skipped;
    };
    let mut block = format!("\n---\n_turn completed: {}_\n", time_fmt::now_iso());
    if let Some(stat) = diff_stat {
        if !stat.trim().is_empty() {
            block.push_str("\n```diff\n");
            block.push_str(stat.trim_end());
            block.push_str("\n```\n");
        }
    }
    if append_block(&path, &block) {
        Append::Written
    } else {
        Append::Skipped
    }
}

/// Finalize the session: fast-redact, stamp `ended`, move to `completed/`,
/// and drop the map entry and marker.
///
/// `redact` is the fast built-in pass; the deep pass belongs to the
/// background finalizer. Returns `None` when there is nothing to finalize.
pub fn finalize(
    repo: &Path,
    agent_session_id: Option<&str>,
    redact: impl Fn(&str) -> String,
) -> Option<Finalized> {
    let internal_id = resolve(repo, agent_session_id)?;
    let active = paths::active_session(repo, &internal_id);
    if !active.exists() {
        return None;
    }

    let content = redact(&read_or_empty(&active));
    let content =
        frontmatter::update_document(&content, |fm| fm.set_scalar("ended", time_fmt::now_iso()));
    if write_atomic(&active, &content).is_err() {
        return None;
    }

    let completed = paths::completed_session(repo, &internal_id);
    if let Some(parent) = completed.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    // Rename is the commit point: the id is in exactly one directory at
    // any instant.
    if let Err(err) = std::fs::rename(&active, &completed) {
        tracing::debug!(error = %err, "finalize rename failed");
        return None;
    }

    match agent_session_id {
        Some(agent_id) => session_map::remove(repo, agent_id),
        None => session_map::remove_by_internal(repo, &internal_id),
    }
    let marker = paths::current_id_marker(repo);
    if read_or_empty(&marker).trim() == internal_id {
        let _ = std::fs::remove_file(&marker);
    }

    Some(Finalized {
        id: internal_id,
        path: completed,
    })
}

/// Number of `## Prompt N` headings in a session's transcript.
pub fn prompt_count(repo: &Path, session_id: &str) -> usize {
    let path = paths::active_session(repo, session_id);
    let content = if path.exists() {
        read_or_empty(&path)
    } else {
        read_or_empty(&paths::completed_session(repo, session_id))
    };
    prompt_count_in(&content)
}

fn prompt_count_in(content: &str) -> usize {
    PROMPT_HEADING.find_iter(content).count()
}

/// Completed session ids, ascending (ids sort by date then tail).
pub fn list_completed(repo: &Path) -> Vec<String> {
    let mut ids: Vec<String> = std::fs::read_dir(paths::completed_dir(repo))
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter_map(|e| {
                    let name = e.file_name();
                    let name = name.to_str()?;
                    name.strip_suffix(".md").map(str::to_string)
                })
                .collect()
        })
        .unwrap_or_default();
    ids.sort();
    ids
}

/// Active session ids, ascending.
pub fn list_active(repo: &Path) -> Vec<String> {
    let mut ids: Vec<String> = std::fs::read_dir(paths::active_dir(repo))
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter_map(|e| {
                    let name = e.file_name();
                    let name = name.to_str()?;
                    name.strip_suffix(".md").map(str::to_string)
                })
                .collect()
        })
        .unwrap_or_default();
    ids.sort();
    ids
}

/// Transcript text for a session, checking `completed/` then `active/`.
pub fn read_session(repo: &Path, session_id: &str) -> Option<String> {
    let completed = paths::completed_session(repo, session_id);
    if completed.exists() {
        return Some(read_or_empty(&completed));
    }
    let active = paths::active_session(repo, session_id);
    if active.exists() {
        return Some(read_or_empty(&active));
    }
    None
}

/// The session `checkpoint` should attach: the marker when it names a
/// completed transcript, else the greatest completed id.
///
/// The marker races under concurrent sessions (last starter wins), so it
/// is only trusted when its target actually finished; hooks themselves
/// always resolve through the session map instead.
pub fn latest_completed(repo: &Path) -> Option<(String, PathBuf)> {
    let marker = read_or_empty(&paths::current_id_marker(repo));
    let marker = marker.trim();
    if !marker.is_empty() {
        let path = paths::completed_session(repo, marker);
        if path.exists() {
            return Some((marker.to_string(), path));
        }
    }
    let id = list_completed(repo).pop()?;
    let path = paths::completed_session(repo, &id);
    Some((id, path))
}

/// Unique modified paths named anywhere in a transcript, in first-seen order.
pub fn modified_paths(content: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for cap in MODIFIED_LINE.captures_iter(content) {
        let path = cap[1].trim().to_string();
        if !seen.contains(&path) {
            seen.push(path);
        }
    }
    seen
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
