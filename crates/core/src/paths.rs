// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical filesystem layout under `<repo>/.ai-sessions/`.
//!
//! Every builder is pure and takes the repository root explicitly:
//!
//! ```text
//! <repo>/.ai-sessions/
//!   active/                  in-progress transcripts
//!     <id>.md
//!     .current-id            most recently started session (legacy fallback)
//!     .session-map.json      agent session id -> internal id
//!   completed/               finalized transcripts
//!     <id>.md
//!   knowledge.md             aggregated knowledge base
//!   mistakes.md              mistake entry log
//!   decisions.md             decision entry log
//!   tags.json                tag -> session ids index
//!   .comod-cache.json        co-modification graph cache
//!   .background.pid          detached finalizer pid
//!   .background.log          detached finalizer log
//!   .last-sync               shared-knowledge pull timestamp
//! ```

use std::path::{Path, PathBuf};

/// Directory name of the archive root inside a repository.
pub const SESSIONS_DIR: &str = ".ai-sessions";

/// `<repo>/.ai-sessions`
pub fn sessions_root(repo: &Path) -> PathBuf {
    repo.join(SESSIONS_DIR)
}

/// `<repo>/.ai-sessions/active`
pub fn active_dir(repo: &Path) -> PathBuf {
    sessions_root(repo).join("active")
}

/// `<repo>/.ai-sessions/completed`
pub fn completed_dir(repo: &Path) -> PathBuf {
    sessions_root(repo).join("completed")
}

/// Transcript path for an in-progress session.
pub fn active_session(repo: &Path, id: &str) -> PathBuf {
    active_dir(repo).join(format!("{}.md", id))
}

/// Transcript path for a finalized session.
pub fn completed_session(repo: &Path, id: &str) -> PathBuf {
    completed_dir(repo).join(format!("{}.md", id))
}

/// Marker file holding the most recently started session id.
pub fn current_id_marker(repo: &Path) -> PathBuf {
    active_dir(repo).join(".current-id")
}

/// Agent-session-id to internal-id map.
pub fn session_map(repo: &Path) -> PathBuf {
    active_dir(repo).join(".session-map.json")
}

/// Aggregated knowledge base built from session summaries.
pub fn knowledge_file(repo: &Path) -> PathBuf {
    sessions_root(repo).join("knowledge.md")
}

/// Append-only mistake entry log.
pub fn mistakes_file(repo: &Path) -> PathBuf {
    sessions_root(repo).join("mistakes.md")
}

/// Append-only decision entry log.
pub fn decisions_file(repo: &Path) -> PathBuf {
    sessions_root(repo).join("decisions.md")
}

/// Tag index (tag -> session ids).
pub fn tags_index(repo: &Path) -> PathBuf {
    sessions_root(repo).join("tags.json")
}

/// Co-modification graph cache.
pub fn comod_cache(repo: &Path) -> PathBuf {
    sessions_root(repo).join(".comod-cache.json")
}

/// Pid file of the detached background finalizer.
pub fn background_pid(repo: &Path) -> PathBuf {
    sessions_root(repo).join(".background.pid")
}

/// Log file of the detached background finalizer.
pub fn background_log(repo: &Path) -> PathBuf {
    sessions_root(repo).join(".background.log")
}

/// Timestamp file rate-limiting shared-knowledge pulls.
pub fn last_sync(repo: &Path) -> PathBuf {
    sessions_root(repo).join(".last-sync")
}

/// Session id for a transcript path (`.../2026-08-02-ab12cd34.md`).
pub fn session_id_of(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|s| s.to_str())
}

#[cfg(test)]
#[path = "paths_tests.rs"]
mod tests;
