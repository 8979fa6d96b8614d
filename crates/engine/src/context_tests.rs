// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use ghost_store::session::{append_file_modification, create, finalize, SessionMeta};
use ghost_store::KnowledgeLog;
use tempfile::TempDir;

fn no_redact(s: &str) -> String {
    s.to_string()
}

fn entry(title: &str, files: &[&str], rule: Option<&str>) -> KnowledgeEntry {
    let mut e = KnowledgeEntry::new(title);
    e.description = format!("why {} matters", title);
    e.files = files.iter().map(|f| f.to_string()).collect();
    e.area = ghost_core::entry::derive_area(&e.files);
    e.rule = rule.map(str::to_string);
    e.date = Some(chrono::Utc::now().date_naive());
    e
}

#[test]
fn format_entries_puts_rules_first_verbatim() {
    let entries = vec![
        entry("Plain mistake here", &["src/cart/x.ts"], None),
        entry("Rule bearer", &[], Some("ALWAYS run the money tests")),
    ];
    let out = format_entries("Past mistakes", &entries);

    let rules_pos = out.find("## ⚠ Standing rules").unwrap();
    let rest_pos = out.find("## Past mistakes").unwrap();
    assert!(rules_pos < rest_pos, "got:\n{}", out);
    assert!(out.contains("- ALWAYS run the money tests (Rule bearer)"));
}

#[test]
fn format_entries_groups_by_leading_file() {
    let entries = vec![
        entry("First on cart", &["src/cart/x.ts"], None),
        entry("Second on cart", &["src/cart/x.ts"], None),
        entry("One on api", &["src/api/y.ts"], None),
    ];
    let out = format_entries("Decisions", &entries);
    assert_eq!(out.matches("### src/cart/x.ts").count(), 1);
    assert!(out.contains("### src/api/y.ts"));
}

#[test]
fn continuity_requires_open_items_and_recency() {
    let dir = TempDir::new().unwrap();
    let config = ghost_core::GhostConfig::default();
    let meta = SessionMeta {
        branch: Some("main".into()),
        base_commit: None,
    };

    // Completed session without a summary: no continuity.
    create(dir.path(), &meta, Some("s1")).unwrap();
    finalize(dir.path(), Some("s1"), no_redact).unwrap();
    assert!(continuity_block(dir.path(), Some("main"), &config).is_none());

    // Completed session with open items in its summary: continuity.
    create(dir.path(), &meta, Some("s2")).unwrap();
    let done = finalize(dir.path(), Some("s2"), no_redact).unwrap();
    let content = std::fs::read_to_string(&done.path).unwrap();
    let enriched = format!(
        "{}\n# Summary\n\n## Intent\nship the cart fix\n## Open Items\nwire up invoices\n## Tags\narea:cart\n",
        content
    );
    std::fs::write(&done.path, enriched).unwrap();

    let block = continuity_block(dir.path(), Some("main"), &config).unwrap();
    assert!(block.contains(&done.id), "got: {}", block);
    assert!(block.contains("wire up invoices"));

    // Different branch: omitted.
    assert!(continuity_block(dir.path(), Some("feature/x"), &config).is_none());
}

#[test]
fn resume_block_reads_summary_and_files() {
    let dir = TempDir::new().unwrap();
    create(dir.path(), &SessionMeta::default(), Some("s1")).unwrap();
    append_file_modification(dir.path(), Some("s1"), "src/cart/total.ts");
    let done = finalize(dir.path(), Some("s1"), no_redact).unwrap();

    let content = std::fs::read_to_string(&done.path).unwrap();
    std::fs::write(
        &done.path,
        format!(
            "{}\n# Summary\n\n## Intent\nfix rounding\n## Open Items\nport to invoices\n## Tags\nt\n",
            content
        ),
    )
    .unwrap();

    let block = resume_block(dir.path(), None).unwrap();
    assert!(block.contains(&done.id));
    assert!(block.contains("Intent: fix rounding"));
    assert!(block.contains("- src/cart/total.ts"));
    assert!(block.contains("port to invoices"));

    // Unknown id: nothing.
    assert!(resume_block(dir.path(), Some("2020-01-01-ffffffff")).is_none());
}

#[test]
fn brief_block_filters_by_topic() {
    let dir = TempDir::new().unwrap();
    ghost_store::knowledge::append_entry(
        dir.path(),
        KnowledgeLog::Decisions,
        &entry("Cart rounding decision", &["src/cart/total.ts"], None),
    )
    .unwrap();
    ghost_store::knowledge::append_entry(
        dir.path(),
        KnowledgeLog::Decisions,
        &entry("Sync retry decision", &["src/sync/push.ts"], None),
    )
    .unwrap();

    let block = brief_block(dir.path(), "cart rounding").unwrap();
    assert!(block.contains("Cart rounding decision"));
    // Topic-irrelevant entries stay out.
    assert!(!block.contains("Sync retry decision"));

    assert!(brief_block(dir.path(), "").is_none());
    assert!(brief_block(dir.path(), "zzz-no-match").is_none());
}

#[tokio::test]
async fn session_start_context_composes_sections() {
    let dir = TempDir::new().unwrap();
    // Empty archive: empty context, no briefing noise.
    let empty = session_start_context(dir.path(), None, &ghost_core::GhostConfig::default()).await;
    assert!(empty.is_empty());

    ghost_store::knowledge::append_entry(
        dir.path(),
        KnowledgeLog::Mistakes,
        &entry("Watch the cache key", &[], Some("ALWAYS bump the cache key")),
    )
    .unwrap();

    let context =
        session_start_context(dir.path(), None, &ghost_core::GhostConfig::default()).await;
    assert!(context.contains("⚠ Standing rules"));
    assert!(context.contains("ALWAYS bump the cache key"));
    assert!(context.contains("Briefing:"));
}
