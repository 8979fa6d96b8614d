// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

const SUMMARY: &str = "\
## Intent
Fix rounding drift in cart totals.

## Changes
Moved money math into the cart service.

## Knowledge
none

## Decisions
**Round in the service**: UI math drifted from the backend.
Files: src/cart/total.ts, src/cart/api.ts

**Keep cents as integers**: floats lose pennies.
Rule: NEVER store money as floats

## Strategies
N/A

## Mistakes
**Patched the symptom first**: adjusted the display instead of the source.
Tried: display rounding, toFixed in the view
Files: src/cart/view.ts

## Open Items
Port the same fix to invoices.

## Relevance
keep

## Tags
area:cart, type:fix, # a comment, lang:ts
";

#[test]
fn valid_summary_has_intent_and_tags() {
    let summary = Summary::parse(SUMMARY);
    assert!(summary.is_valid());

    let invalid = Summary::parse("## Intent\nonly intent\n");
    assert!(!invalid.is_valid());
}

#[test]
fn tags_are_comma_split_and_filtered() {
    let summary = Summary::parse(SUMMARY);
    assert_eq!(summary.tags(), vec!["area:cart", "type:fix", "lang:ts"]);
}

#[test]
fn decisions_split_into_blocks_with_metadata() {
    let summary = Summary::parse(SUMMARY);
    let blocks = summary.blocks("Decisions");
    assert_eq!(blocks.len(), 2);

    assert_eq!(blocks[0].title, "Round in the service");
    assert_eq!(blocks[0].description, "UI math drifted from the backend.");
    assert_eq!(blocks[0].files, vec!["src/cart/total.ts", "src/cart/api.ts"]);
    assert!(blocks[0].rule.is_none());

    assert_eq!(blocks[1].title, "Keep cents as integers");
    assert_eq!(blocks[1].rule.as_deref(), Some("NEVER store money as floats"));
    assert!(blocks[1].files.is_empty());
}

#[test]
fn mistakes_capture_tried_metadata() {
    let summary = Summary::parse(SUMMARY);
    let blocks = summary.blocks("Mistakes");
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].title, "Patched the symptom first");
    assert_eq!(
        blocks[0].tried,
        vec!["display rounding", "toFixed in the view"]
    );
    assert_eq!(blocks[0].files, vec!["src/cart/view.ts"]);
}

#[test]
fn none_sections_yield_no_blocks() {
    let summary = Summary::parse(SUMMARY);
    assert!(summary.blocks("Knowledge").is_empty());
    assert!(summary.blocks("Strategies").is_empty());

    for variant in [
        "none",
        "None.",
        "N/A",
        "No significant decisions",
        "no mistakes made",
        "Nothing",
        "not applicable",
    ] {
        let doc = format!("## Intent\nx\n## Mistakes\n{}\n## Tags\nt\n", variant);
        let summary = Summary::parse(&doc);
        assert!(
            summary.blocks("Mistakes").is_empty(),
            "variant not skipped: {}",
            variant
        );
    }
}

#[test]
fn bold_colon_variant_with_inner_colon_parses() {
    let doc = "## Intent\nx\n## Decisions\n**Use serde:** for the cache format.\n## Tags\nt\n";
    let blocks = Summary::parse(doc).blocks("Decisions");
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].title, "Use serde");
    assert_eq!(blocks[0].description, "for the cache format.");
}

#[test]
fn list_prefixed_blocks_parse() {
    let doc = "## Intent\nx\n## Mistakes\n- **Forgot the cache**: stale reads.\n- **Raced the map**: lost a tag.\n## Tags\nt\n";
    let blocks = Summary::parse(doc).blocks("Mistakes");
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].title, "Forgot the cache");
    assert_eq!(blocks[1].title, "Raced the map");
}

#[test]
fn relevance_skip_is_detected() {
    let doc = "## Intent\nx\n## Relevance\n  Skip  \n## Tags\nt\n";
    assert!(Summary::parse(doc).skip_knowledge());

    let keep = Summary::parse(SUMMARY);
    assert!(!keep.skip_knowledge());
}

#[test]
fn open_items_surface_unless_none() {
    let summary = Summary::parse(SUMMARY);
    assert_eq!(summary.open_items(), Some("Port the same fix to invoices."));

    let doc = "## Intent\nx\n## Open Items\nnone\n## Tags\nt\n";
    assert!(Summary::parse(doc).open_items().is_none());
}

#[test]
fn missing_sections_are_empty_not_errors() {
    let summary = Summary::parse("plain text, no headings");
    assert!(!summary.is_valid());
    assert!(summary.tags().is_empty());
    assert!(summary.blocks("Decisions").is_empty());
    assert!(summary.open_items().is_none());
}
