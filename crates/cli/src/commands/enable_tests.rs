// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::TempDir;

fn read_settings(repo: &std::path::Path) -> Value {
    let raw = std::fs::read_to_string(settings_path(repo)).unwrap();
    serde_json::from_str(&raw).unwrap()
}

#[test]
fn wire_hooks_creates_all_events() {
    let dir = TempDir::new().unwrap();
    wire_hooks(dir.path(), false).unwrap();

    let settings = read_settings(dir.path());
    let hooks = settings.get("hooks").unwrap();
    for event in ["SessionStart", "UserPromptSubmit", "PostToolUse", "Stop", "SessionEnd"] {
        assert!(hooks.get(event).is_some(), "missing event {}", event);
    }
    // PostToolUse carries two matchers: writes and tasks.
    let post = hooks.get("PostToolUse").unwrap().as_array().unwrap();
    assert_eq!(post.len(), 2);
    let matchers: Vec<&str> = post
        .iter()
        .filter_map(|e| e.get("matcher").and_then(Value::as_str))
        .collect();
    assert!(matchers.contains(&"Write|Edit|MultiEdit|NotebookEdit"));
    assert!(matchers.contains(&"Task"));
}

#[test]
fn wire_hooks_is_idempotent() {
    let dir = TempDir::new().unwrap();
    wire_hooks(dir.path(), false).unwrap();
    let first = read_settings(dir.path());
    wire_hooks(dir.path(), false).unwrap();
    let second = read_settings(dir.path());
    assert_eq!(first, second);
}

#[test]
fn wire_hooks_preserves_foreign_entries() {
    let dir = TempDir::new().unwrap();
    let path = settings_path(dir.path());
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(
        &path,
        r#"{
            "permissions": {"allow": ["Bash(ls:*)"]},
            "hooks": {
                "SessionStart": [
                    {"hooks": [{"type": "command", "command": "other-tool session-start"}]}
                ]
            }
        }"#,
    )
    .unwrap();

    wire_hooks(dir.path(), false).unwrap();
    let settings = read_settings(dir.path());
    assert!(settings.get("permissions").is_some());
    let start = settings["hooks"]["SessionStart"].as_array().unwrap();
    assert_eq!(start.len(), 2);
    let raw = serde_json::to_string(&settings).unwrap();
    assert!(raw.contains("other-tool session-start"));
    assert!(raw.contains("ghost session-start"));
}

#[test]
fn unwire_removes_only_ghost_entries() {
    let dir = TempDir::new().unwrap();
    let path = settings_path(dir.path());
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(
        &path,
        r#"{
            "hooks": {
                "SessionStart": [
                    {"hooks": [{"type": "command", "command": "other-tool session-start"}]}
                ]
            }
        }"#,
    )
    .unwrap();

    wire_hooks(dir.path(), false).unwrap();
    assert!(unwire_hooks(dir.path()).unwrap());

    let settings = read_settings(dir.path());
    let raw = serde_json::to_string(&settings).unwrap();
    assert!(!raw.contains("ghost "));
    assert!(raw.contains("other-tool session-start"));
    // Events that only held ghost entries are gone entirely.
    assert!(settings["hooks"].get("SessionEnd").is_none());

    // Second unwire finds nothing.
    assert!(!unwire_hooks(dir.path()).unwrap());
}

#[test]
fn malformed_settings_require_force() {
    let dir = TempDir::new().unwrap();
    let path = settings_path(dir.path());
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, "{ this is not json").unwrap();

    assert!(wire_hooks(dir.path(), false).is_err());
    wire_hooks(dir.path(), true).unwrap();
    assert!(read_settings(dir.path()).get("hooks").is_some());
}

#[test]
fn post_commit_script_chains_and_unchains() {
    let dir = TempDir::new().unwrap();
    let hooks_dir = dir.path().join(".git").join("hooks");
    std::fs::create_dir_all(&hooks_dir).unwrap();
    let script = hooks_dir.join("post-commit");
    std::fs::write(&script, "#!/bin/sh\necho existing hook\n").unwrap();

    install_post_commit(dir.path()).unwrap();
    let content = std::fs::read_to_string(&script).unwrap();
    assert!(content.contains("echo existing hook"));
    assert!(content.contains("ghost checkpoint"));

    // Idempotent.
    install_post_commit(dir.path()).unwrap();
    let again = std::fs::read_to_string(&script).unwrap();
    assert_eq!(content, again);

    remove_post_commit(dir.path()).unwrap();
    let after = std::fs::read_to_string(&script).unwrap();
    assert!(after.contains("echo existing hook"));
    assert!(!after.contains("ghost checkpoint"));
}

#[test]
fn post_commit_script_created_fresh_and_removed_clean() {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join(".git")).unwrap();

    install_post_commit(dir.path()).unwrap();
    let script = dir.path().join(".git").join("hooks").join("post-commit");
    assert!(script.exists());

    remove_post_commit(dir.path()).unwrap();
    assert!(!script.exists());
}
