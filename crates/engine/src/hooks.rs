// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hook dispatch: one short-lived process per host event.
//!
//! Contract: a hook never fails, never blocks past its budget, and never
//! writes anything to stdout except SessionStart's context block. Every
//! handler resolves the repository itself (hooks from different worktrees
//! and sessions share nothing but the filesystem), does its one write,
//! and returns.

use crate::background;
use crate::context;
use crate::redact::redact_fast;
use ghost_adapters::{env, Git, HOOK_SCM_TIMEOUT};
use ghost_core::{GhostConfig, HookEnvelope};
use ghost_store::session::{self, SessionMeta};
use std::path::PathBuf;

/// The recognized hook events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookKind {
    SessionStart,
    SessionEnd,
    Prompt,
    Stop,
    PostWrite,
    PostTask,
    Checkpoint,
}

/// Run one hook against the envelope on stdin.
///
/// Returns the text to print to stdout (empty for everything except
/// SessionStart). All failures are swallowed; the caller exits 0
/// unconditionally.
pub async fn run_hook(kind: HookKind, raw_stdin: &str, config: &GhostConfig) -> String {
    // Re-entrancy guard: the summarizer may run the hosting agent, whose
    // hooks must not write into the session being finalized.
    if env::is_internal_invocation() {
        return String::new();
    }
    let envelope = HookEnvelope::parse(raw_stdin);

    let cwd = envelope
        .cwd
        .clone()
        .map(PathBuf::from)
        .or_else(|| std::env::current_dir().ok());
    let Some(cwd) = cwd else {
        return String::new();
    };
    let Some(git) = Git::discover(&cwd, HOOK_SCM_TIMEOUT).await else {
        return String::new();
    };
    let repo = git.root().to_path_buf();
    let agent_id = envelope.session_id.as_deref();

    match kind {
        HookKind::SessionStart => {
            let meta = SessionMeta {
                branch: git.current_branch().await,
                base_commit: git.head_commit().await,
            };
            if session::create(&repo, &meta, agent_id).is_err() {
                return String::new();
            }
            context::session_start_context(&repo, Some(&git), config).await
        }
        HookKind::Prompt => {
            if let Some(prompt) = &envelope.prompt {
                session::append_prompt(&repo, agent_id, prompt);
            }
            String::new()
        }
        HookKind::PostWrite => {
            if envelope.is_write_tool() {
                if let Some(path) = envelope.tool_input.as_ref().and_then(|t| t.file_path.as_deref())
                {
                    session::append_file_modification(&repo, agent_id, path);
                }
            }
            String::new()
        }
        HookKind::PostTask => {
            if envelope.is_task_tool() {
                if let Some(text) =
                    envelope.tool_input.as_ref().and_then(|t| t.description.as_deref())
                {
                    session::append_task_note(&repo, agent_id, text);
                }
            }
            String::new()
        }
        HookKind::Stop => {
            let diff_stat = git.diff_stat().await;
            session::append_turn_delimiter(&repo, agent_id, diff_stat.as_deref());
            String::new()
        }
        HookKind::SessionEnd => {
            if let Some(done) = session::finalize(&repo, agent_id, redact_fast) {
                // Heavy work happens in the detached child; SessionEnd
                // returns without waiting.
                background::spawn_detached_finalizer(&repo, &done.path, &done.id);
            }
            String::new()
        }
        HookKind::Checkpoint => {
            if let Some((_, path)) = session::latest_completed(&repo) {
                if let Some(head) = git.head_commit().await {
                    git.add_note_from_file(crate::finalize::NOTES_REF, &head, &path)
                        .await;
                }
            }
            String::new()
        }
    }
}

#[cfg(test)]
#[path = "hooks_tests.rs"]
mod tests;
