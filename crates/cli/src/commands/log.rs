// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ghost log` and `ghost show`.

use super::require_repo;
use anyhow::{bail, Result};
use ghost_core::frontmatter::Frontmatter;
use ghost_core::{GhostConfig, time_fmt};
use ghost_engine::finalize::NOTES_REF;
use ghost_store::session;

/// List the most recent completed sessions, newest first.
pub async fn log_sessions() -> Result<()> {
    let git = require_repo().await?;
    let repo = git.root().to_path_buf();
    let config = GhostConfig::default();

    let ids = session::list_completed(&repo);
    if ids.is_empty() {
        println!("No completed sessions");
        return Ok(());
    }

    for id in ids.iter().rev().take(config.log_list_limit) {
        let Some(content) = session::read_session(&repo, id) else {
            continue;
        };
        let (fm, _) = Frontmatter::split(&content);
        let branch = fm.scalar("branch").unwrap_or("-");
        let tags = fm.seq("tags");
        let prompts = session::prompt_count(&repo, id);
        let age = fm
            .scalar("ended")
            .and_then(|e| chrono::DateTime::parse_from_rfc3339(e).ok())
            .map(|ended| {
                let secs = (chrono::Utc::now() - ended.with_timezone(&chrono::Utc)).num_seconds();
                format!("{} ago", time_fmt::format_elapsed(secs.max(0) as u64))
            })
            .unwrap_or_else(|| "-".to_string());

        let mut line = format!("{}  {}  {} prompts  {}", id, branch, prompts, age);
        if !tags.is_empty() {
            line.push_str(&format!("  [{}]", tags.join(", ")));
        }
        println!("{}", line);
    }
    Ok(())
}

/// Print the session note attached to a commit.
pub async fn show_note(commit: &str) -> Result<()> {
    let git = require_repo().await?;
    match git.show_note(NOTES_REF, commit).await {
        Some(note) => {
            print!("{}", note);
            Ok(())
        }
        None => bail!("no session note on {}", commit),
    }
}
