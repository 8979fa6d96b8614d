// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ghost knowledge` - build, inject, show and diff the knowledge base.

use super::require_repo;
use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use ghost_core::entry::parse_entries;
use ghost_core::{paths, time_fmt};
use ghost_engine::extract::Summary;
use ghost_engine::sync::KNOWLEDGE_BRANCH;
use ghost_store::session;
use std::collections::HashSet;
use std::path::Path;

#[derive(Args)]
pub struct KnowledgeArgs {
    #[command(subcommand)]
    pub command: KnowledgeCommand,
}

#[derive(Subcommand)]
pub enum KnowledgeCommand {
    /// Aggregate archived session summaries into knowledge.md
    Build,
    /// Write the knowledge base into the agent-visible context file
    Inject {
        /// Symlink knowledge.md instead of embedding a marked block
        #[arg(long)]
        symlink: bool,
    },
    /// Print knowledge.md
    Show,
    /// Compare local knowledge against the shared branch
    Diff,
}

pub async fn handle(args: KnowledgeArgs) -> Result<()> {
    let git = require_repo().await?;
    let repo = git.root().to_path_buf();

    match args.command {
        KnowledgeCommand::Build => {
            let sessions = build(&repo)?;
            println!(
                "Built {} from {} sessions",
                paths::knowledge_file(&repo).display(),
                sessions
            );
            Ok(())
        }
        KnowledgeCommand::Inject { symlink } => inject(&repo, symlink),
        KnowledgeCommand::Show => {
            let content =
                std::fs::read_to_string(paths::knowledge_file(&repo)).unwrap_or_default();
            if content.trim().is_empty() {
                println!("Knowledge base is empty (run `ghost knowledge build`)");
            } else {
                print!("{}", content);
            }
            Ok(())
        }
        KnowledgeCommand::Diff => diff(&repo, &git).await,
    }
}

/// Aggregate every archived summary into `knowledge.md`. Returns the
/// number of sessions that contributed.
pub fn build(repo: &Path) -> Result<usize> {
    let mut out = format!("# Knowledge\n\n_built: {}_\n", time_fmt::now_iso());
    let mut sessions = 0usize;

    for id in session::list_completed(repo) {
        let Some(content) = session::read_session(repo, &id) else {
            continue;
        };
        let Some((_, summary_text)) = content.split_once("\n# Summary\n") else {
            continue;
        };
        let summary = Summary::parse(summary_text);
        let mut section = String::new();
        if let Some(intent) = summary.section("Intent").filter(|s| !s.is_empty()) {
            section.push_str(&format!("{}\n", intent));
        }
        for name in ["Knowledge", "Decisions", "Strategies"] {
            for block in summary.blocks(name) {
                section.push_str(&format!("- **{}**: {}\n", block.title, block.description));
            }
        }
        if section.is_empty() {
            continue;
        }
        out.push_str(&format!("\n## Session {}\n\n{}", id, section));
        sessions += 1;
    }

    std::fs::create_dir_all(paths::sessions_root(repo))?;
    std::fs::write(paths::knowledge_file(repo), out)?;
    Ok(sessions)
}

/// Marked block delimiters in the agent context file.
const INJECT_START: &str = "<!-- ghost:knowledge:start -->";
const INJECT_END: &str = "<!-- ghost:knowledge:end -->";

/// Embed (or refresh) the knowledge base in `CLAUDE.md`. With `--symlink`
/// and no existing context file, symlink instead.
fn inject(repo: &Path, symlink: bool) -> Result<()> {
    let knowledge = paths::knowledge_file(repo);
    if !knowledge.exists() {
        bail!("no knowledge base yet (run `ghost knowledge build`)");
    }
    let target = repo.join("CLAUDE.md");

    if symlink {
        if target.exists() {
            bail!("{} exists; refusing to replace it with a symlink", target.display());
        }
        #[cfg(unix)]
        std::os::unix::fs::symlink(&knowledge, &target)?;
        #[cfg(not(unix))]
        std::fs::copy(&knowledge, &target)?;
        println!("Linked {} -> {}", target.display(), knowledge.display());
        return Ok(());
    }

    let block = format!(
        "{}\n{}\n{}",
        INJECT_START,
        std::fs::read_to_string(&knowledge)?.trim_end(),
        INJECT_END
    );
    let existing = std::fs::read_to_string(&target).unwrap_or_default();
    let updated = match (existing.find(INJECT_START), existing.find(INJECT_END)) {
        (Some(start), Some(end)) if end > start => {
            let after = existing[end + INJECT_END.len()..].to_string();
            format!("{}{}{}", &existing[..start], block, after)
        }
        _ if existing.trim().is_empty() => format!("{}\n", block),
        _ => format!("{}\n\n{}\n", existing.trim_end(), block),
    };
    std::fs::write(&target, updated)?;
    println!("Knowledge embedded in {}", target.display());
    Ok(())
}

/// Show entries present on one side only, by title.
async fn diff(repo: &Path, git: &ghost_adapters::Git) -> Result<()> {
    for name in ["mistakes.md", "decisions.md"] {
        let local_text =
            std::fs::read_to_string(paths::sessions_root(repo).join(name)).unwrap_or_default();
        let shared_text = git
            .read_blob(KNOWLEDGE_BRANCH, name)
            .await
            .unwrap_or_default();

        let local: HashSet<String> = parse_entries(&local_text)
            .iter()
            .map(|e| e.title.to_lowercase())
            .collect();
        let shared: HashSet<String> = parse_entries(&shared_text)
            .iter()
            .map(|e| e.title.to_lowercase())
            .collect();

        let local_only: Vec<&String> = local.difference(&shared).collect();
        let shared_only: Vec<&String> = shared.difference(&local).collect();
        if local_only.is_empty() && shared_only.is_empty() {
            println!("{}: in sync", name);
            continue;
        }
        println!("{}:", name);
        for title in local_only {
            println!("  local only: {}", title);
        }
        for title in shared_only {
            println!("  shared only: {}", title);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "knowledge_tests.rs"]
mod tests;
