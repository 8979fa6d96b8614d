// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hook and finalizer entry points.
//!
//! These are the only code paths the hosting agent ever spawns. They exit
//! 0 unconditionally and print nothing except SessionStart's context
//! block, whatever happens inside.

use ghost_adapters::{CommandSummarizer, Git, SemdexEngine, SYNC_TIMEOUT};
use ghost_core::GhostConfig;
use ghost_engine::finalize::Finalizer;
use ghost_engine::hooks::HookKind;
use std::io::Read;
use std::path::Path;

/// Run one hook: read the stdin envelope, dispatch, print the context
/// block if any. Never fails.
pub async fn run(kind: HookKind) {
    let mut raw = String::new();
    let _ = std::io::stdin().read_to_string(&mut raw);

    let config = GhostConfig::default();
    let output = ghost_engine::hooks::run_hook(kind, &raw, &config).await;
    if !output.is_empty() {
        println!("{}", output);
    }
}

/// The detached enrichment pass (hidden `finalize-session` subcommand).
/// Spawned by the SessionEnd hook with stdio nulled; never fails.
pub async fn run_finalizer(repo: &Path, transcript: &Path, session_id: &str) {
    let config = GhostConfig::default();
    let git = Git::discover(repo, SYNC_TIMEOUT).await;
    let summarizer = CommandSummarizer::new();
    let search = SemdexEngine::new();

    Finalizer {
        repo,
        transcript: transcript.to_path_buf(),
        session_id: session_id.to_string(),
        config: &config,
        git: git.as_ref(),
        summarizer: &summarizer,
        search: &search,
    }
    .run()
    .await;
}
