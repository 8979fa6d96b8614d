// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `ghost reindex` and `ghost validate` - offline maintenance.

use super::require_repo;
use anyhow::Result;
use ghost_adapters::{collection_for, SearchEngine, SemdexEngine};
use ghost_core::frontmatter::{update_document, Frontmatter};
use ghost_core::paths;
use ghost_engine::background;
use ghost_store::{comod, knowledge, session, session_map};
use std::path::Path;

/// Rebuild every derived structure: tag index, co-mod cache, search
/// collection.
pub async fn reindex() -> Result<()> {
    let git = require_repo().await?;
    let repo = git.root().to_path_buf();

    let index = knowledge::rebuild_tag_index(&repo);
    println!("Tag index rebuilt: {} tags", index.len());

    let _ = std::fs::remove_file(paths::comod_cache(&repo));
    let graph = comod::load_or_build(&repo);
    println!(
        "Co-modification graph rebuilt: {} files over {} sessions",
        graph.graph.len(),
        graph.session_count
    );

    let search = SemdexEngine::new();
    let collection = collection_for(&repo);
    match search.index(&collection, &paths::completed_dir(&repo)).await {
        Ok(()) => println!("Search collection reindexed: {}", collection),
        Err(err) => println!("Search collection not reindexed: {}", err),
    }
    Ok(())
}

/// Surface structural damage, repairing it with `-f`.
pub async fn validate(fix: bool) -> Result<()> {
    let git = require_repo().await?;
    let repo = git.root().to_path_buf();

    let mut issues = 0usize;
    issues += check_scalar_tags(&repo, fix);
    issues += check_tag_index(&repo, fix);
    issues += check_current_id(&repo, fix);
    issues += check_session_map(&repo, fix);
    issues += check_background_pid(&repo, fix);
    issues += check_duplicate_ids(&repo, fix);

    if issues == 0 {
        println!("Archive is healthy");
    } else if fix {
        println!("{} issues repaired", issues);
    } else {
        println!("{} issues found (re-run with -f to repair)", issues);
    }
    Ok(())
}

/// Frontmatter `tags` values that are scalars instead of sequences.
fn check_scalar_tags(repo: &Path, fix: bool) -> usize {
    let mut issues = 0;
    let ids: Vec<String> = session::list_completed(repo)
        .into_iter()
        .chain(session::list_active(repo))
        .collect();
    for id in ids {
        let Some(content) = session::read_session(repo, &id) else {
            continue;
        };
        let (fm, _) = Frontmatter::split(&content);
        let is_scalar = fm
            .get("tags")
            .is_some_and(|v| v.as_seq().is_none());
        if !is_scalar {
            continue;
        }
        issues += 1;
        println!("session {}: 'tags' is not a sequence", id);
        if fix {
            let seq = fm.seq("tags");
            let updated = update_document(&content, |fm| fm.set_seq("tags", seq));
            let path = [
                paths::completed_session(repo, &id),
                paths::active_session(repo, &id),
            ]
            .into_iter()
            .find(|p| p.exists());
            if let Some(path) = path {
                let _ = std::fs::write(path, updated);
            }
        }
    }
    issues
}

/// Raw `tags.json` values that are not arrays.
fn check_tag_index(repo: &Path, fix: bool) -> usize {
    let path = paths::tags_index(repo);
    let Ok(raw) = std::fs::read_to_string(&path) else {
        return 0;
    };
    let Ok(value) = serde_json::from_str::<serde_json::Value>(&raw) else {
        println!("tags.json: not valid JSON");
        if fix {
            knowledge::rebuild_tag_index(repo);
        }
        return 1;
    };
    let damaged = value
        .as_object()
        .map(|o| o.values().filter(|v| !v.is_array()).count())
        .unwrap_or(1);
    if damaged > 0 {
        println!("tags.json: {} non-array values", damaged);
        if fix {
            // The tolerant loader coerces what it can; saving normalizes.
            ghost_store::tags::save(repo, &ghost_store::tags::load(repo));
        }
    }
    damaged
}

/// Current-id marker pointing at a session with no active transcript.
fn check_current_id(repo: &Path, fix: bool) -> usize {
    let marker = paths::current_id_marker(repo);
    let Ok(raw) = std::fs::read_to_string(&marker) else {
        return 0;
    };
    let id = raw.trim();
    if id.is_empty() || paths::active_session(repo, id).exists() {
        return 0;
    }
    println!("current-id marker names inactive session {}", id);
    if fix {
        let _ = std::fs::remove_file(&marker);
    }
    1
}

/// Session-map entries pointing at sessions with no active transcript.
fn check_session_map(repo: &Path, fix: bool) -> usize {
    let stale: Vec<String> = session_map::load(repo)
        .iter()
        .filter(|(_, internal)| !paths::active_session(repo, internal).exists())
        .map(|(agent, _)| agent.clone())
        .collect();
    for agent in &stale {
        println!("session map entry '{}' is stale", agent);
        if fix {
            session_map::remove(repo, agent);
        }
    }
    stale.len()
}

/// Pid file naming a dead process.
fn check_background_pid(repo: &Path, fix: bool) -> usize {
    let Some(pid) = background::read_pid(repo) else {
        return 0;
    };
    if background::process_exists(pid) {
        return 0;
    }
    println!(".background.pid names dead process {}", pid);
    if fix {
        let _ = std::fs::remove_file(paths::background_pid(repo));
    }
    1
}

/// The cardinal invariant: an id lives in `active/` or `completed/`,
/// never both. The completed copy wins on repair.
fn check_duplicate_ids(repo: &Path, fix: bool) -> usize {
    let completed = session::list_completed(repo);
    let mut issues = 0;
    for id in session::list_active(repo) {
        if completed.iter().any(|c| c == &id) {
            issues += 1;
            println!("session {} exists in both active/ and completed/", id);
            if fix {
                let _ = std::fs::remove_file(paths::active_session(repo, &id));
            }
        }
    }
    issues
}

#[cfg(test)]
#[path = "maintain_tests.rs"]
mod tests;
