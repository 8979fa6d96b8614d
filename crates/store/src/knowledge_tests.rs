// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::session::{create, finalize, SessionMeta};
use tempfile::TempDir;

fn entry(title: &str) -> KnowledgeEntry {
    let mut e = KnowledgeEntry::new(title);
    e.description = format!("context for {}", title);
    e.session_id = Some("2026-08-02-00000001".into());
    e
}

#[test]
fn append_then_read_roundtrips() {
    let dir = TempDir::new().unwrap();
    append_entry(dir.path(), KnowledgeLog::Mistakes, &entry("First mistake")).unwrap();
    append_entry(dir.path(), KnowledgeLog::Mistakes, &entry("Second mistake")).unwrap();

    let entries = read_log(dir.path(), KnowledgeLog::Mistakes);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].title, "First mistake");
    assert_eq!(entries[1].title, "Second mistake");
}

#[test]
fn logs_are_separate_files() {
    let dir = TempDir::new().unwrap();
    append_entry(dir.path(), KnowledgeLog::Mistakes, &entry("A mistake here")).unwrap();
    append_entry(dir.path(), KnowledgeLog::Decisions, &entry("A decision here")).unwrap();

    assert_eq!(read_log(dir.path(), KnowledgeLog::Mistakes).len(), 1);
    assert_eq!(read_log(dir.path(), KnowledgeLog::Decisions).len(), 1);
    assert_eq!(read_all(dir.path()).len(), 2);
}

#[test]
fn missing_logs_read_empty() {
    let dir = TempDir::new().unwrap();
    assert!(read_log(dir.path(), KnowledgeLog::Mistakes).is_empty());
    assert!(read_all(dir.path()).is_empty());
}

#[test]
fn add_tags_merges_preserving_order() {
    let dir = TempDir::new().unwrap();
    let id = create(dir.path(), &SessionMeta::default(), Some("ext-1")).unwrap();

    let merged = add_tags(dir.path(), &id, &["area:cart".into(), "type:fix".into()]).unwrap();
    assert_eq!(merged, vec!["area:cart", "type:fix"]);

    // Re-adding one tag plus a new one keeps order and deduplicates.
    let merged = add_tags(dir.path(), &id, &["type:fix".into(), "lang:rust".into()]).unwrap();
    assert_eq!(merged, vec!["area:cart", "type:fix", "lang:rust"]);

    // Mirrored into the index, sets per tag.
    assert_eq!(tags::sessions_for(dir.path(), "area:cart"), vec![id.clone()]);
    assert_eq!(tags::sessions_for(dir.path(), "type:fix"), vec![id]);
}

#[test]
fn add_tags_finds_completed_sessions() {
    let dir = TempDir::new().unwrap();
    let id = create(dir.path(), &SessionMeta::default(), Some("ext-1")).unwrap();
    finalize(dir.path(), Some("ext-1"), |s| s.to_string()).unwrap();

    assert!(add_tags(dir.path(), &id, &["area:sync".into()]).is_some());
    let content = crate::session::read_session(dir.path(), &id).unwrap();
    assert!(content.contains("tags: [area:sync]"));
}

#[test]
fn add_tags_without_session_is_none() {
    let dir = TempDir::new().unwrap();
    assert!(add_tags(dir.path(), "2026-01-01-ffffffff", &["t".into()]).is_none());
}

#[test]
fn add_tags_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let id = create(dir.path(), &SessionMeta::default(), Some("ext-1")).unwrap();
    let once = add_tags(dir.path(), &id, &["a".into(), "b".into()]).unwrap();
    let twice = add_tags(dir.path(), &id, &["a".into(), "b".into()]).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn set_skip_knowledge_stamps_frontmatter() {
    let dir = TempDir::new().unwrap();
    let id = create(dir.path(), &SessionMeta::default(), Some("ext-1")).unwrap();
    set_skip_knowledge(dir.path(), &id);
    let content = crate::session::read_session(dir.path(), &id).unwrap();
    assert!(content.contains("skip_knowledge: true"));
}

#[test]
fn rebuild_tag_index_recovers_from_frontmatters() {
    let dir = TempDir::new().unwrap();
    let id = create(dir.path(), &SessionMeta::default(), Some("ext-1")).unwrap();
    add_tags(dir.path(), &id, &["area:cart".into()]).unwrap();

    // Simulate a lost index write.
    std::fs::remove_file(ghost_core::paths::tags_index(dir.path())).unwrap();
    assert!(tags::load(dir.path()).is_empty());

    let rebuilt = rebuild_tag_index(dir.path());
    assert_eq!(rebuilt.get("area:cart").unwrap(), &vec![id]);
}

#[test]
fn prune_stale_map_entries_drops_dangling() {
    let dir = TempDir::new().unwrap();
    create(dir.path(), &SessionMeta::default(), Some("ext-live")).unwrap();
    session_map::insert(dir.path(), "ext-dead", "2020-01-01-deadbeef");

    let dropped = prune_stale_map_entries(dir.path());
    assert_eq!(dropped, vec!["ext-dead"]);
    assert!(session_map::resolve(dir.path(), "ext-live").is_some());
}
