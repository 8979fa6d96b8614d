// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Command handlers for the ghost CLI.

pub mod enable;
pub mod hooks;
pub mod knowledge;
pub mod log;
pub mod maintain;
pub mod resume;
pub mod search;
pub mod stats;
pub mod status;
pub mod tag;

use anyhow::{Context, Result};
use ghost_adapters::{Git, HOOK_SCM_TIMEOUT};

/// Resolve the repository for a user command, or fail with a diagnostic.
pub async fn require_repo() -> Result<Git> {
    let cwd = std::env::current_dir().context("cannot determine working directory")?;
    Git::discover(&cwd, HOOK_SCM_TIMEOUT)
        .await
        .context("not inside a git repository")
}
