// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ghost tag`, `ghost mistake`, `ghost decisions` - manual knowledge entry.

use super::require_repo;
use anyhow::{bail, Result};
use clap::Args;
use ghost_core::entry::{derive_area, KnowledgeEntry};
use ghost_core::time_fmt;
use ghost_engine::redact::redact_fast;
use ghost_store::{knowledge, session, tags, KnowledgeLog};

#[derive(Args)]
pub struct TagArgs {
    /// Tag the most recent completed session instead of naming one
    #[arg(long)]
    pub last: bool,
    /// Session id (omitted with --last)
    #[arg(required_unless_present = "last")]
    pub id: Option<String>,
    /// Tags to apply (`namespace:value` by convention)
    pub tags: Vec<String>,
}

pub async fn apply(args: TagArgs) -> Result<()> {
    let git = require_repo().await?;
    let repo = git.root().to_path_buf();

    // With --last every positional is a tag, including the one clap
    // parsed into the id slot.
    let (id, tag_list) = if args.last {
        let mut tag_list = args.tags.clone();
        if let Some(first) = args.id.clone() {
            tag_list.insert(0, first);
        }
        match session::latest_completed(&repo) {
            Some((id, _)) => (id, tag_list),
            None => bail!("no completed sessions to tag"),
        }
    } else {
        (
            args.id.clone().expect("clap enforces id without --last"),
            args.tags.clone(),
        )
    };
    if tag_list.is_empty() {
        bail!("no tags given");
    }

    match knowledge::add_tags(&repo, &id, &tag_list) {
        Some(merged) => {
            println!("{}: [{}]", id, merged.join(", "));
            Ok(())
        }
        None => bail!("session {} not found", id),
    }
}

/// Record a mistake entry by hand, attributed to the current session and
/// working set when they exist.
pub async fn mistake(text: &str) -> Result<()> {
    let text = text.trim();
    if text.is_empty() {
        bail!("mistake text is empty");
    }
    let git = require_repo().await?;
    let repo = git.root().to_path_buf();

    let mut lines = text.lines();
    let title = lines.next().unwrap_or(text).trim_end_matches('.');
    let description: String = lines.collect::<Vec<_>>().join("\n");

    let mut entry = KnowledgeEntry::new(redact_fast(title));
    entry.description = redact_fast(&description);
    entry.session_id = session::resolve(&repo, None);
    entry.commit = git.head_commit().await;
    entry.files = git.modified_files().await;
    entry.files.truncate(5);
    entry.area = derive_area(&entry.files);
    entry.date = time_fmt::today_utc().parse().ok();

    knowledge::append_entry(&repo, KnowledgeLog::Mistakes, &entry)?;
    println!("Recorded mistake: {}", entry.title);
    Ok(())
}

/// List decision entries, optionally restricted to sessions with a tag.
pub async fn decisions(tag_filter: Option<&str>) -> Result<()> {
    let git = require_repo().await?;
    let repo = git.root().to_path_buf();

    let mut entries = knowledge::read_log(&repo, KnowledgeLog::Decisions);
    if let Some(tag) = tag_filter {
        let allowed = tags::sessions_for(&repo, tag);
        entries.retain(|e| {
            e.session_id
                .as_ref()
                .is_some_and(|id| allowed.iter().any(|s| s == id))
        });
    }

    if entries.is_empty() {
        println!("No decisions recorded");
        return Ok(());
    }
    for entry in entries.iter().rev() {
        let date = entry
            .date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "----------".to_string());
        println!("{}  {} ({})", date, entry.title, entry.area);
        if !entry.description.is_empty() {
            for line in entry.description.lines() {
                println!("    {}", line);
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "tag_tests.rs"]
mod tests;
