// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ghost enable` / `ghost disable` / `ghost update` - hook wiring.
//!
//! Enable edits the host agent's `.claude/settings.json`, installs a
//! post-commit checkpoint script, configures notes display, and seeds the
//! shared knowledge branch. Entries owned by this tool are recognized by
//! their `ghost ` command prefix; everything else in the settings file is
//! preserved byte-for-byte as JSON.

use super::require_repo;
use anyhow::{bail, Context, Result};
use clap::Args;
use ghost_core::paths;
use ghost_engine::finalize::NOTES_REF;
use serde_json::{json, Map, Value};
use std::path::{Path, PathBuf};

#[derive(Args)]
pub struct EnableArgs {
    /// Proceed even when the settings file needs rewriting
    #[arg(short = 'f', long = "force")]
    pub force: bool,
    /// Seed knowledge.md from already-archived sessions
    #[arg(long)]
    pub genesis: bool,
}

/// Marker line identifying this tool's section of the post-commit hook.
const POST_COMMIT_MARKER: &str = "# ghost checkpoint";

/// (event key, matcher, hook subcommand)
const WIRING: [(&str, Option<&str>, &str); 6] = [
    ("SessionStart", None, "session-start"),
    ("UserPromptSubmit", None, "prompt"),
    (
        "PostToolUse",
        Some("Write|Edit|MultiEdit|NotebookEdit"),
        "post-write",
    ),
    ("PostToolUse", Some("Task"), "post-task"),
    ("Stop", None, "stop"),
    ("SessionEnd", None, "session-end"),
];

pub async fn enable(args: EnableArgs) -> Result<()> {
    let git = require_repo().await?;
    let repo = git.root().to_path_buf();

    std::fs::create_dir_all(paths::active_dir(&repo))?;
    std::fs::create_dir_all(paths::completed_dir(&repo))?;

    wire_hooks(&repo, args.force)?;
    println!("Hooks wired in {}", settings_path(&repo).display());

    if git
        .set_config("notes.displayRef", &format!("refs/notes/{}", NOTES_REF))
        .await
    {
        println!("Notes display configured ({})", NOTES_REF);
    }

    install_post_commit(&repo)?;
    println!("Post-commit checkpoint installed");

    match ghost_engine::sync::init_shared(&repo, &git).await {
        Ok(outcome) => println!("Shared knowledge branch: {}", outcome),
        Err(err) => println!("Shared knowledge branch: {}", err),
    }

    if args.genesis {
        let sessions = super::knowledge::build(&repo)?;
        println!("Knowledge base seeded from {} sessions", sessions);
    }

    println!("ghost enabled");
    Ok(())
}

pub async fn disable() -> Result<()> {
    let git = require_repo().await?;
    let repo = git.root().to_path_buf();

    let removed = unwire_hooks(&repo)?;
    remove_post_commit(&repo)?;
    if removed {
        println!("ghost hooks removed (session files kept)");
    } else {
        println!("No ghost hooks found");
    }
    Ok(())
}

/// Idempotent re-wire: refresh hook entries and the post-commit script
/// without touching sessions or the shared branch.
pub async fn update() -> Result<()> {
    let git = require_repo().await?;
    let repo = git.root().to_path_buf();
    wire_hooks(&repo, true)?;
    install_post_commit(&repo)?;
    println!("Hook wiring refreshed");
    Ok(())
}

pub fn settings_path(repo: &Path) -> PathBuf {
    repo.join(".claude").join("settings.json")
}

/// True when a matcher entry belongs to this tool.
fn is_ghost_entry(entry: &Value) -> bool {
    entry
        .get("hooks")
        .and_then(Value::as_array)
        .map(|hooks| {
            hooks.iter().any(|h| {
                h.get("command")
                    .and_then(Value::as_str)
                    .is_some_and(|c| c == "ghost" || c.starts_with("ghost "))
            })
        })
        .unwrap_or(false)
}

fn load_settings(repo: &Path, force: bool) -> Result<Map<String, Value>> {
    let path = settings_path(repo);
    if !path.exists() {
        return Ok(Map::new());
    }
    let raw = std::fs::read_to_string(&path)?;
    match serde_json::from_str::<Value>(&raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) | Err(_) if force => Ok(Map::new()),
        Ok(_) => bail!(
            "{} is not a JSON object; re-run with -f to rewrite it",
            path.display()
        ),
        Err(err) => bail!(
            "{} is not valid JSON ({}); re-run with -f to rewrite it",
            path.display(),
            err
        ),
    }
}

fn save_settings(repo: &Path, settings: &Map<String, Value>) -> Result<()> {
    let path = settings_path(repo);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&Value::Object(settings.clone()))?;
    std::fs::write(&path, format!("{}\n", json))
        .with_context(|| format!("writing {}", path.display()))
}

/// Add this tool's matchers under each event, preserving foreign entries.
/// Existing ghost entries are replaced, so re-running upgrades in place.
pub fn wire_hooks(repo: &Path, force: bool) -> Result<()> {
    let mut settings = load_settings(repo, force)?;
    let hooks = settings
        .entry("hooks".to_string())
        .or_insert_with(|| json!({}));
    if !hooks.is_object() {
        if !force {
            bail!("settings 'hooks' key is not an object; re-run with -f");
        }
        *hooks = json!({});
    }
    let hooks = hooks.as_object_mut().expect("hooks object");

    for (event, matcher, subcommand) in WIRING {
        let entries = hooks
            .entry(event.to_string())
            .or_insert_with(|| json!([]));
        if !entries.is_array() {
            *entries = json!([]);
        }
        let entries = entries.as_array_mut().expect("event array");

        let command = format!("ghost {}", subcommand);
        // Drop any stale ghost entry with this command, keep the rest.
        entries.retain(|e| {
            !(is_ghost_entry(e)
                && e.get("hooks")
                    .and_then(Value::as_array)
                    .is_some_and(|hs| {
                        hs.iter().any(|h| {
                            h.get("command").and_then(Value::as_str) == Some(command.as_str())
                        })
                    }))
        });

        let mut entry = Map::new();
        if let Some(matcher) = matcher {
            entry.insert("matcher".to_string(), json!(matcher));
        }
        entry.insert(
            "hooks".to_string(),
            json!([{ "type": "command", "command": command }]),
        );
        entries.push(Value::Object(entry));
    }

    save_settings(repo, &settings)
}

/// Remove this tool's matchers only. Returns true when any were found.
pub fn unwire_hooks(repo: &Path) -> Result<bool> {
    let mut settings = load_settings(repo, false).unwrap_or_default();
    let Some(hooks) = settings.get_mut("hooks").and_then(Value::as_object_mut) else {
        return Ok(false);
    };

    let mut removed = false;
    let mut empty_events: Vec<String> = Vec::new();
    for (event, entries) in hooks.iter_mut() {
        if let Some(list) = entries.as_array_mut() {
            let before = list.len();
            list.retain(|e| !is_ghost_entry(e));
            removed |= list.len() != before;
            if list.is_empty() {
                empty_events.push(event.clone());
            }
        }
    }
    for event in empty_events {
        hooks.remove(&event);
    }

    if removed {
        save_settings(repo, &settings)?;
    }
    Ok(removed)
}

/// Install (or chain into) `.git/hooks/post-commit` so every commit gets
/// a checkpoint note, asynchronously and silently.
pub fn install_post_commit(repo: &Path) -> Result<()> {
    let path = repo.join(".git").join("hooks").join("post-commit");
    let line = format!(
        "{}\nghost checkpoint </dev/null >/dev/null 2>&1 &\n",
        POST_COMMIT_MARKER
    );

    let content = match std::fs::read_to_string(&path) {
        Ok(existing) if existing.contains(POST_COMMIT_MARKER) => return Ok(()),
        Ok(existing) => format!("{}\n{}", existing.trim_end(), line),
        Err(_) => format!("#!/bin/sh\n{}", line),
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, content)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
    }
    Ok(())
}

/// Strip this tool's lines from the post-commit hook, leaving the rest.
pub fn remove_post_commit(repo: &Path) -> Result<()> {
    let path = repo.join(".git").join("hooks").join("post-commit");
    let Ok(existing) = std::fs::read_to_string(&path) else {
        return Ok(());
    };
    if !existing.contains(POST_COMMIT_MARKER) {
        return Ok(());
    }
    let kept: Vec<&str> = existing
        .lines()
        .filter(|l| *l != POST_COMMIT_MARKER && !l.contains("ghost checkpoint"))
        .collect();
    if kept.iter().all(|l| l.trim().is_empty() || l.starts_with("#!")) {
        std::fs::remove_file(&path)?;
    } else {
        std::fs::write(&path, format!("{}\n", kept.join("\n")))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "enable_tests.rs"]
mod tests;
