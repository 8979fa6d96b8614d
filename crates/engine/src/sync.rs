// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared knowledge sync over the `ghost/knowledge` orphan branch.
//!
//! The branch carries four files at its root (`knowledge.md`,
//! `mistakes.md`, `decisions.md`, `tags.json`) and is the only channel
//! for cross-clone sharing. All writes go through plumbing (never the
//! worktree), all merges are idempotent, and a missing remote degrades to
//! reconciling against the local branch only.

use chrono::Utc;
use ghost_adapters::Git;
use ghost_core::entry::{parse_entries, KnowledgeEntry};
use ghost_core::{paths, GhostConfig};
use ghost_store::tags;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// Orphan branch carrying the shared knowledge files.
pub const KNOWLEDGE_BRANCH: &str = "ghost/knowledge";

/// The four files at the branch root.
pub const SYNC_FILES: [&str; 4] = ["knowledge.md", "mistakes.md", "decisions.md", "tags.json"];

/// Errors from sync operations. User commands render these; the
/// finalizer logs and moves on.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("could not create {KNOWLEDGE_BRANCH} branch")]
    InitFailed,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn local_path(repo: &Path, name: &str) -> std::path::PathBuf {
    paths::sessions_root(repo).join(name)
}

fn read_local(repo: &Path, name: &str) -> String {
    std::fs::read_to_string(local_path(repo, name)).unwrap_or_default()
}

/// Merge one file by name using its file-specific strategy.
pub fn merge_file(name: &str, local: &str, remote: &str) -> String {
    match name {
        "tags.json" => merge_tags_json(local, remote),
        "knowledge.md" => merge_knowledge(local, remote),
        _ => merge_entry_log(local, remote),
    }
}

/// `knowledge.md`: local wins; the remote side is only used when the
/// local file is empty or whitespace.
pub fn merge_knowledge(local: &str, remote: &str) -> String {
    if local.trim().is_empty() {
        remote.to_string()
    } else {
        local.to_string()
    }
}

/// `mistakes.md` / `decisions.md`: dedup by lowercased (title,
/// description); structured entries first, then legacy lines. When
/// neither side has a structured entry, fall back to block-level dedup.
pub fn merge_entry_log(local: &str, remote: &str) -> String {
    let local_entries = parse_entries(local);
    let remote_entries = parse_entries(remote);
    let any_structured = local_entries
        .iter()
        .chain(remote_entries.iter())
        .any(|e| !e.legacy);
    if !any_structured {
        return merge_blocks(local, remote);
    }

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let mut structured: Vec<KnowledgeEntry> = Vec::new();
    let mut legacy: Vec<KnowledgeEntry> = Vec::new();
    for entry in local_entries.into_iter().chain(remote_entries) {
        if !seen.insert(entry.merge_key()) {
            continue;
        }
        if entry.legacy {
            legacy.push(entry);
        } else {
            structured.push(entry);
        }
    }

    let mut out = String::new();
    for entry in &structured {
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&entry.format());
    }
    if !legacy.is_empty() && !out.is_empty() {
        out.push('\n');
    }
    for entry in &legacy {
        out.push_str(&entry.format());
    }
    out
}

/// Block-level dedup: split on blank-line runs, keep first occurrence.
fn merge_blocks(local: &str, remote: &str) -> String {
    let mut seen: HashSet<String> = HashSet::new();
    let mut blocks: Vec<String> = Vec::new();
    for side in [local, remote] {
        for block in side.split("\n\n") {
            let trimmed = block.trim();
            if trimmed.is_empty() {
                continue;
            }
            if seen.insert(trimmed.to_string()) {
                blocks.push(trimmed.to_string());
            }
        }
    }
    if blocks.is_empty() {
        String::new()
    } else {
        format!("{}\n", blocks.join("\n\n"))
    }
}

/// `tags.json`: deep union of the two indexes.
pub fn merge_tags_json(local: &str, remote: &str) -> String {
    let merged = tags::union(&tags::parse(local), &tags::parse(remote));
    serde_json::to_string_pretty(&merged).unwrap_or_else(|_| "{}".to_string())
}

/// Ensure the orphan branch exists: locally, fetched from the remote, or
/// freshly built from the local files via plumbing.
pub async fn init_shared(repo: &Path, git: &Git) -> Result<String, SyncError> {
    if git.branch_exists(KNOWLEDGE_BRANCH).await {
        return Ok("branch exists".to_string());
    }
    if let Some(remote) = git.first_remote().await {
        if git.fetch_branch(&remote, KNOWLEDGE_BRANCH).await
            && git.branch_exists(KNOWLEDGE_BRANCH).await
        {
            return Ok(format!("fetched from {}", remote));
        }
    }
    let files: Vec<(String, String)> = SYNC_FILES
        .iter()
        .map(|name| (name.to_string(), read_local(repo, name)))
        .collect();
    git.commit_tree_files(KNOWLEDGE_BRANCH, &files, "ghost: init shared knowledge")
        .await
        .map(|_| "created orphan branch".to_string())
        .ok_or(SyncError::InitFailed)
}

/// Pull: fetch (rate-limited), then reconcile each local file against the
/// branch blob, writing the local file only when the merge changed it.
pub async fn pull_shared(repo: &Path, git: &Git, config: &GhostConfig) -> Result<String, SyncError> {
    if let Some(remote) = git.first_remote().await {
        if fetch_due(repo, config) {
            git.fetch_branch(&remote, KNOWLEDGE_BRANCH).await;
            mark_fetched(repo);
        }
    }
    if !git.branch_exists(KNOWLEDGE_BRANCH).await {
        return Ok("no shared branch".to_string());
    }

    let mut updated = 0usize;
    for name in SYNC_FILES {
        let Some(remote_blob) = git.read_blob(KNOWLEDGE_BRANCH, name).await else {
            continue;
        };
        let local = read_local(repo, name);
        let merged = merge_file(name, &local, &remote_blob);
        if merged != local {
            std::fs::create_dir_all(paths::sessions_root(repo))?;
            std::fs::write(local_path(repo, name), &merged)?;
            updated += 1;
        }
    }
    Ok(format!("pulled, {} files updated", updated))
}

/// Push: merge each non-empty local file with the branch blob, commit the
/// results onto the branch via plumbing, and push when a remote exists.
/// Never touches the worktree or the current checkout.
pub async fn push_shared(repo: &Path, git: &Git) -> Result<String, SyncError> {
    init_shared(repo, git).await?;

    let mut files: Vec<(String, String)> = Vec::new();
    for name in SYNC_FILES {
        let local = read_local(repo, name);
        if local.trim().is_empty() {
            continue;
        }
        let remote_blob = git.read_blob(KNOWLEDGE_BRANCH, name).await;
        let merged = merge_file(name, &local, remote_blob.as_deref().unwrap_or(""));
        if remote_blob.as_deref() != Some(merged.as_str()) {
            files.push((name.to_string(), merged));
        }
    }

    if files.is_empty() {
        return Ok("nothing to push".to_string());
    }
    if git
        .commit_tree_files(KNOWLEDGE_BRANCH, &files, "ghost: sync knowledge")
        .await
        .is_none()
    {
        return Err(SyncError::InitFailed);
    }

    if let Some(remote) = git.first_remote().await {
        if git.push_branch(&remote, KNOWLEDGE_BRANCH).await {
            return Ok(format!("pushed {} files to {}", files.len(), remote));
        }
        return Ok(format!("committed {} files, push failed", files.len()));
    }
    Ok(format!("committed {} files locally", files.len()))
}

fn fetch_due(repo: &Path, config: &GhostConfig) -> bool {
    let raw = std::fs::read_to_string(paths::last_sync(repo)).unwrap_or_default();
    let Ok(last) = raw.trim().parse::<i64>() else {
        return true;
    };
    Utc::now().timestamp() - last >= config.sync_interval.as_secs() as i64
}

fn mark_fetched(repo: &Path) {
    let _ = std::fs::create_dir_all(paths::sessions_root(repo));
    let _ = std::fs::write(paths::last_sync(repo), Utc::now().timestamp().to_string());
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
