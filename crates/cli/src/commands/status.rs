// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ghost status` and `ghost reset`.

use super::{enable, require_repo};
use anyhow::Result;
use ghost_adapters::{collection_for, CommandSummarizer, SearchEngine, SemdexEngine, Summarizer};
use ghost_core::paths;
use ghost_engine::{background, finalize::NOTES_REF};
use ghost_store::session;

/// Report archive, wiring and dependency health. Works on an empty or
/// even absent archive.
pub async fn status() -> Result<()> {
    let git = require_repo().await?;
    let repo = git.root().to_path_buf();

    let active = session::list_active(&repo);
    let completed = session::list_completed(&repo);
    let marker = std::fs::read_to_string(paths::current_id_marker(&repo)).unwrap_or_default();
    let marker = marker.trim();

    println!("Archive: {}", paths::sessions_root(&repo).display());
    match active.len() {
        0 => println!("Active sessions: none"),
        n => println!(
            "Active sessions: {} (current: {})",
            n,
            if marker.is_empty() { "-" } else { marker }
        ),
    }
    println!("Completed sessions: {}", completed.len());

    match background::read_pid(&repo) {
        Some(pid) if background::process_exists(pid) => {
            println!("Background finalizer: running (pid {})", pid)
        }
        Some(pid) => println!("Background finalizer: stale pid file ({})", pid),
        None => println!("Background finalizer: idle"),
    }

    let wired = std::fs::read_to_string(enable::settings_path(&repo))
        .map(|s| s.contains("ghost session-start"))
        .unwrap_or(false);
    println!("Hook wiring: {}", if wired { "installed" } else { "missing" });

    let summarizer = CommandSummarizer::new();
    let search = SemdexEngine::new();
    println!(
        "Summarizer: {}",
        if summarizer.available().await {
            "available"
        } else {
            "missing"
        }
    );
    println!(
        "Search engine: {}",
        if search.available().await {
            "available"
        } else {
            "missing"
        }
    );

    Ok(())
}

/// Wipe the archive, the notes ref and the search collection.
pub async fn reset() -> Result<()> {
    let git = require_repo().await?;
    let repo = git.root().to_path_buf();

    let root = paths::sessions_root(&repo);
    if root.exists() {
        std::fs::remove_dir_all(&root)?;
        println!("Removed {}", root.display());
    }

    if git.delete_notes_ref(NOTES_REF).await {
        println!("Removed notes ref {}", NOTES_REF);
    }

    let search = SemdexEngine::new();
    let collection = collection_for(&repo);
    match search.delete_collection(&collection).await {
        Ok(()) => println!("Removed search collection {}", collection),
        Err(_) => println!("Search collection not removed (engine unavailable)"),
    }

    Ok(())
}
