// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ghost stats` and `ghost heatmap` - analytics over the archive.

use super::require_repo;
use anyhow::{bail, Result};
use chrono::NaiveDate;
use clap::Args;
use ghost_core::frontmatter::Frontmatter;
use ghost_core::id;
use ghost_store::{session, tags};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Args)]
pub struct HeatmapArgs {
    /// Only sessions carrying this tag
    #[arg(long)]
    pub tag: Option<String>,
    /// Only sessions on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<String>,
    /// Number of files to show
    #[arg(long, default_value_t = 20)]
    pub top: usize,
    /// Emit JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct StatsArgs {
    /// Only sessions carrying this tag
    #[arg(long)]
    pub tag: Option<String>,
    /// Only sessions on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub since: Option<String>,
    /// Emit JSON instead of text
    #[arg(long)]
    pub json: bool,
}

fn parse_since(raw: Option<&str>) -> Result<Option<NaiveDate>> {
    match raw {
        None => Ok(None),
        Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            Ok(date) => Ok(Some(date)),
            Err(_) => bail!("--since expects YYYY-MM-DD, got '{}'", raw),
        },
    }
}

/// Completed session ids passing the tag and date filters.
fn filtered_sessions(
    repo: &Path,
    tag: Option<&str>,
    since: Option<NaiveDate>,
) -> Vec<String> {
    let tagged: Option<Vec<String>> = tag.map(|t| tags::sessions_for(repo, t));
    session::list_completed(repo)
        .into_iter()
        .filter(|sid| {
            if let Some(allowed) = &tagged {
                if !allowed.iter().any(|a| a == sid) {
                    return false;
                }
            }
            if let Some(since) = since {
                match id::session_date(sid) {
                    Some(date) if date >= since => {}
                    _ => return false,
                }
            }
            true
        })
        .collect()
}

pub async fn heatmap(args: HeatmapArgs) -> Result<()> {
    let git = require_repo().await?;
    let repo = git.root().to_path_buf();
    let since = parse_since(args.since.as_deref())?;

    let mut counts: BTreeMap<String, u32> = BTreeMap::new();
    for sid in filtered_sessions(&repo, args.tag.as_deref(), since) {
        let Some(content) = session::read_session(&repo, &sid) else {
            continue;
        };
        for path in session::modified_paths(&content) {
            *counts.entry(path).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, u32)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(args.top);

    if args.json {
        let value: Vec<serde_json::Value> = ranked
            .iter()
            .map(|(path, sessions)| serde_json::json!({"path": path, "sessions": sessions}))
            .collect();
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }
    if ranked.is_empty() {
        println!("No modified files recorded");
        return Ok(());
    }
    let width = ranked.first().map(|(_, n)| *n).unwrap_or(1).max(1);
    for (path, sessions) in &ranked {
        let bar = "#".repeat(((sessions * 40) / width).max(1) as usize);
        println!("{:>4}  {:<50} {}", sessions, path, bar);
    }
    Ok(())
}

pub async fn stats(args: StatsArgs) -> Result<()> {
    let git = require_repo().await?;
    let repo = git.root().to_path_buf();
    let since = parse_since(args.since.as_deref())?;

    let sessions = filtered_sessions(&repo, args.tag.as_deref(), since);
    let mut prompts = 0usize;
    let mut files_touched = 0usize;
    let mut by_day: BTreeMap<String, u32> = BTreeMap::new();
    let mut by_tag: BTreeMap<String, u32> = BTreeMap::new();

    for sid in &sessions {
        prompts += session::prompt_count(&repo, sid);
        if let Some(content) = session::read_session(&repo, sid) {
            files_touched += session::modified_paths(&content).len();
            let (fm, _) = Frontmatter::split(&content);
            for tag in fm.seq("tags") {
                *by_tag.entry(tag).or_insert(0) += 1;
            }
        }
        if let Some(date) = id::session_date(sid) {
            *by_day.entry(date.to_string()).or_insert(0) += 1;
        }
    }

    let mistakes = ghost_store::knowledge::read_log(&repo, ghost_store::KnowledgeLog::Mistakes);
    let decisions = ghost_store::knowledge::read_log(&repo, ghost_store::KnowledgeLog::Decisions);

    if args.json {
        let value = serde_json::json!({
            "sessions": sessions.len(),
            "prompts": prompts,
            "filesTouched": files_touched,
            "mistakes": mistakes.len(),
            "decisions": decisions.len(),
            "byDay": by_day,
            "byTag": by_tag,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Sessions: {}", sessions.len());
    println!("Prompts: {}", prompts);
    println!("Files touched: {}", files_touched);
    println!("Mistakes recorded: {}", mistakes.len());
    println!("Decisions recorded: {}", decisions.len());
    if !by_tag.is_empty() {
        println!("Tags:");
        for (tag, count) in &by_tag {
            println!("  {:<30} {}", tag, count);
        }
    }
    if !by_day.is_empty() {
        println!("Sessions per day:");
        for (day, count) in &by_day {
            println!("  {}  {}", day, count);
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
