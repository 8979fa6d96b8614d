// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;
use tempfile::TempDir;

const T: Duration = Duration::from_secs(10);

/// Check if git is available on this system
fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

macro_rules! fail_if_no_git {
    () => {
        if !git_available() {
            panic!("git is required but not available");
        }
    };
}

fn sh(dir: &Path, args: &[&str]) {
    let status = std::process::Command::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .unwrap();
    assert!(status.status.success(), "git {:?} failed", args);
}

/// Fresh repo with one commit on branch `main`.
fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    sh(dir.path(), &["init", "-b", "main"]);
    sh(dir.path(), &["config", "user.email", "test@example.com"]);
    sh(dir.path(), &["config", "user.name", "Test"]);
    std::fs::write(dir.path().join("README.md"), "hello\n").unwrap();
    sh(dir.path(), &["add", "."]);
    sh(dir.path(), &["commit", "-m", "init"]);
    dir
}

#[tokio::test]
async fn discover_finds_repo_root_from_subdir() {
    fail_if_no_git!();
    let dir = fixture();
    let sub = dir.path().join("src");
    std::fs::create_dir(&sub).unwrap();

    let git = Git::discover(&sub, T).await.unwrap();
    assert_eq!(
        git.root().canonicalize().unwrap(),
        dir.path().canonicalize().unwrap()
    );
}

#[tokio::test]
async fn discover_outside_repo_is_none() {
    fail_if_no_git!();
    let dir = TempDir::new().unwrap();
    assert!(Git::discover(dir.path(), T).await.is_none());
}

#[tokio::test]
async fn branch_and_head_queries() {
    fail_if_no_git!();
    let dir = fixture();
    let git = Git::at(dir.path(), T);

    assert_eq!(git.current_branch().await.as_deref(), Some("main"));
    let head = git.head_commit().await.unwrap();
    assert_eq!(head.len(), 40);
}

#[tokio::test]
async fn modified_files_and_diff_stat() {
    fail_if_no_git!();
    let dir = fixture();
    let git = Git::at(dir.path(), T);

    assert!(git.modified_files().await.is_empty());
    assert!(git.diff_stat().await.is_none());

    std::fs::write(dir.path().join("README.md"), "changed\n").unwrap();
    assert_eq!(git.modified_files().await, vec!["README.md".to_string()]);
    assert!(git.diff_stat().await.unwrap().contains("README.md"));
}

#[tokio::test]
async fn notes_roundtrip_on_custom_ref() {
    fail_if_no_git!();
    let dir = fixture();
    let git = Git::at(dir.path(), T);
    let head = git.head_commit().await.unwrap();

    let note = dir.path().join("note.md");
    std::fs::write(&note, "session transcript\n").unwrap();

    assert!(git.add_note_from_file("ai-sessions", &head, &note).await);
    let shown = git.show_note("ai-sessions", &head).await.unwrap();
    assert!(shown.contains("session transcript"));

    // Missing note is absent, not an error.
    assert!(git.show_note("other-ref", &head).await.is_none());

    assert!(git.delete_notes_ref("ai-sessions").await);
    assert!(git.show_note("ai-sessions", &head).await.is_none());
}

#[tokio::test]
async fn orphan_branch_commit_leaves_worktree_untouched() {
    fail_if_no_git!();
    let dir = fixture();
    let git = Git::at(dir.path(), T);
    let head_before = git.head_commit().await.unwrap();

    assert!(!git.branch_exists("ghost/knowledge").await);

    let files = vec![
        ("knowledge.md".to_string(), "# shared\n".to_string()),
        ("tags.json".to_string(), "{}\n".to_string()),
    ];
    let commit = git
        .commit_tree_files("ghost/knowledge", &files, "ghost: sync knowledge")
        .await
        .unwrap();

    assert!(git.branch_exists("ghost/knowledge").await);
    assert_eq!(git.branch_tip("ghost/knowledge").await.as_deref(), Some(commit.as_str()));

    // HEAD and worktree are untouched.
    assert_eq!(git.head_commit().await.unwrap(), head_before);
    assert!(!dir.path().join("knowledge.md").exists());
    assert!(git.modified_files().await.is_empty());

    // Blob readable straight off the branch.
    let blob = git.read_blob("ghost/knowledge", "knowledge.md").await.unwrap();
    assert_eq!(blob, "# shared\n");
}

#[tokio::test]
async fn orphan_branch_second_commit_chains_parent() {
    fail_if_no_git!();
    let dir = fixture();
    let git = Git::at(dir.path(), T);

    let first = git
        .commit_tree_files(
            "ghost/knowledge",
            &[("a.md".to_string(), "one\n".to_string())],
            "first",
        )
        .await
        .unwrap();
    let second = git
        .commit_tree_files(
            "ghost/knowledge",
            &[("b.md".to_string(), "two\n".to_string())],
            "second",
        )
        .await
        .unwrap();
    assert_ne!(first, second);

    // Earlier files survive because the index is seeded from the branch tree.
    assert_eq!(git.read_blob("ghost/knowledge", "a.md").await.unwrap(), "one\n");
    assert_eq!(git.read_blob("ghost/knowledge", "b.md").await.unwrap(), "two\n");
}

#[tokio::test]
async fn missing_remote_operations_are_absent_not_errors() {
    fail_if_no_git!();
    let dir = fixture();
    let git = Git::at(dir.path(), T);

    assert!(git.first_remote().await.is_none());
    assert!(!git.fetch_branch("origin", "ghost/knowledge").await);
    assert!(!git.push_branch("origin", "ghost/knowledge").await);
    assert!(git.read_blob("ghost/knowledge", "nope.md").await.is_none());
}

#[tokio::test]
async fn commits_touching_since_counts() {
    fail_if_no_git!();
    let dir = fixture();
    let git = Git::at(dir.path(), T);

    std::fs::write(dir.path().join("README.md"), "v2\n").unwrap();
    sh(dir.path(), &["add", "."]);
    sh(dir.path(), &["commit", "-m", "touch readme"]);

    let long_ago = chrono::NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
    let count = git
        .commits_touching_since("README.md", long_ago)
        .await
        .unwrap();
    assert_eq!(count, 2);
}
