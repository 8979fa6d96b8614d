// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;
use tempfile::TempDir;

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
    let out = std::process::Command::new("git")
        .current_dir(dir)
        .args(args)
        .output()
        .unwrap();
    assert!(out.status.success(), "git {:?} failed", args);
}

fn fixture() -> TempDir {
    let dir = TempDir::new().unwrap();
    sh(dir.path(), &["init", "-b", "main"]);
    sh(dir.path(), &["config", "user.email", "t@example.com"]);
    sh(dir.path(), &["config", "user.name", "T"]);
    std::fs::write(dir.path().join("README.md"), "x\n").unwrap();
    sh(dir.path(), &["add", "."]);
    sh(dir.path(), &["commit", "-m", "init"]);
    dir
}

fn write_local(repo: &Path, name: &str, content: &str) {
    let root = ghost_core::paths::sessions_root(repo);
    std::fs::create_dir_all(&root).unwrap();
    std::fs::write(root.join(name), content).unwrap();
}

// --- merge strategies (pure) ---

#[test]
fn knowledge_merge_local_wins() {
    assert_eq!(merge_knowledge("local\n", "remote\n"), "local\n");
    assert_eq!(merge_knowledge("", "remote\n"), "remote\n");
    assert_eq!(merge_knowledge("  \n", "remote\n"), "remote\n");
}

#[test]
fn entry_log_merge_deduplicates_by_title_and_description() {
    let mut shared = KnowledgeEntry::new("Shared lesson learned");
    shared.description = "same on both sides".into();
    let mut local_only = KnowledgeEntry::new("Local only lesson");
    local_only.description = "from clone A".into();
    let mut remote_only = KnowledgeEntry::new("SHARED LESSON LEARNED");
    remote_only.description = "Same On Both Sides".into();
    let mut remote_new = KnowledgeEntry::new("Remote only lesson");
    remote_new.description = "from clone B".into();

    let local = format!("{}\n{}", shared.format(), local_only.format());
    let remote = format!("{}\n{}", remote_only.format(), remote_new.format());

    let merged = merge_entry_log(&local, &remote);
    let entries = parse_entries(&merged);
    assert_eq!(entries.len(), 3);
    let titles: Vec<&str> = entries.iter().map(|e| e.title.as_str()).collect();
    assert!(titles.contains(&"Shared lesson learned"));
    assert!(titles.contains(&"Local only lesson"));
    assert!(titles.contains(&"Remote only lesson"));
    // Case-variant duplicate collapsed.
    assert!(!titles.contains(&"SHARED LESSON LEARNED"));
}

#[test]
fn entry_log_merge_puts_structured_before_legacy() {
    let local = "- legacy line from a\n";
    let mut entry = KnowledgeEntry::new("Structured from b side");
    entry.description = "desc".into();
    let remote = entry.format();

    let merged = merge_entry_log(local, &remote);
    let structured_pos = merged.find("### Structured").unwrap();
    let legacy_pos = merged.find("- legacy line").unwrap();
    assert!(structured_pos < legacy_pos, "got:\n{}", merged);
}

#[test]
fn entry_log_merge_is_a_superset_without_duplicates() {
    let mut a1 = KnowledgeEntry::new("Entry alpha for merge");
    a1.description = "alpha".into();
    let mut b1 = KnowledgeEntry::new("Entry beta for merge");
    b1.description = "beta".into();

    let a = a1.format();
    let b = b1.format();
    let merged = merge_entry_log(&a, &b);
    let parsed = parse_entries(&merged);
    assert_eq!(parsed.len(), 2);

    // Merging again changes nothing.
    let again = merge_entry_log(&a, &merged);
    assert_eq!(parse_entries(&again).len(), 2);
    assert_eq!(again, merged);
}

#[test]
fn legacy_only_sides_fall_back_to_block_dedup() {
    let a = "- mistake from A\n\n- shared line\n";
    let b = "- mistake from B\n\n- shared line\n";
    let merged = merge_entry_log(a, b);
    assert!(merged.contains("- mistake from A"));
    assert!(merged.contains("- mistake from B"));
    assert_eq!(merged.matches("- shared line").count(), 1);
}

#[test]
fn tags_json_merge_is_deep_union() {
    let a = r#"{"area:cart": ["s1"], "type:fix": ["s1"]}"#;
    let b = r#"{"area:cart": ["s2"], "lang:rust": ["s2"]}"#;
    let merged = merge_tags_json(a, b);
    let index = tags::parse(&merged);
    assert_eq!(
        index.get("area:cart").unwrap(),
        &vec!["s1".to_string(), "s2".to_string()]
    );
    assert_eq!(index.get("type:fix").unwrap(), &vec!["s1".to_string()]);
    assert_eq!(index.get("lang:rust").unwrap(), &vec!["s2".to_string()]);
}

// --- branch operations (need git) ---

#[tokio::test]
async fn init_creates_orphan_branch_from_local_files() {
    fail_if_no_git!();
    let dir = fixture();
    let git = Git::at(dir.path(), Duration::from_secs(10));
    write_local(dir.path(), "mistakes.md", "# Mistakes\n\n- local lesson\n");

    let outcome = init_shared(dir.path(), &git).await.unwrap();
    assert_eq!(outcome, "created orphan branch");
    assert!(git.branch_exists(KNOWLEDGE_BRANCH).await);
    let blob = git.read_blob(KNOWLEDGE_BRANCH, "mistakes.md").await.unwrap();
    assert!(blob.contains("local lesson"));

    // Second init is a no-op.
    assert_eq!(init_shared(dir.path(), &git).await.unwrap(), "branch exists");
}

#[tokio::test]
async fn push_then_pull_roundtrips_through_the_branch() {
    fail_if_no_git!();
    let dir = fixture();
    let git = Git::at(dir.path(), Duration::from_secs(10));
    let config = ghost_core::GhostConfig::default();

    let mut entry = KnowledgeEntry::new("Mistake from side A");
    entry.description = "pushed through the branch".into();
    write_local(dir.path(), "mistakes.md", &entry.format());

    push_shared(dir.path(), &git).await.unwrap();

    // Wipe the local file, pull it back off the branch.
    write_local(dir.path(), "mistakes.md", "");
    let outcome = pull_shared(dir.path(), &git, &config).await.unwrap();
    assert!(outcome.contains("updated"), "got: {}", outcome);
    let restored = std::fs::read_to_string(
        ghost_core::paths::mistakes_file(dir.path()),
    )
    .unwrap();
    assert!(restored.contains("Mistake from side A"));
}

#[tokio::test]
async fn push_merges_with_existing_branch_content() {
    fail_if_no_git!();
    let dir = fixture();
    let git = Git::at(dir.path(), Duration::from_secs(10));

    // Branch side: one entry.
    let mut remote_entry = KnowledgeEntry::new("Mistake from side B");
    remote_entry.description = "already on the branch".into();
    git.commit_tree_files(
        KNOWLEDGE_BRANCH,
        &[("mistakes.md".to_string(), remote_entry.format())],
        "seed",
    )
    .await
    .unwrap();

    // Local side: a different entry.
    let mut local_entry = KnowledgeEntry::new("Mistake from side A");
    local_entry.description = "local only".into();
    write_local(dir.path(), "mistakes.md", &local_entry.format());

    push_shared(dir.path(), &git).await.unwrap();

    let blob = git.read_blob(KNOWLEDGE_BRANCH, "mistakes.md").await.unwrap();
    assert!(blob.contains("Mistake from side A"));
    assert!(blob.contains("Mistake from side B"));
}

#[tokio::test]
async fn push_without_changes_is_a_noop() {
    fail_if_no_git!();
    let dir = fixture();
    let git = Git::at(dir.path(), Duration::from_secs(10));
    write_local(dir.path(), "knowledge.md", "# Knowledge\nstable\n");

    push_shared(dir.path(), &git).await.unwrap();
    let tip_before = git.branch_tip(KNOWLEDGE_BRANCH).await.unwrap();
    let outcome = push_shared(dir.path(), &git).await.unwrap();
    assert_eq!(outcome, "nothing to push");
    assert_eq!(git.branch_tip(KNOWLEDGE_BRANCH).await.unwrap(), tip_before);
}

#[tokio::test]
async fn two_clones_converge_through_the_shared_branch() {
    fail_if_no_git!();
    let config = ghost_core::GhostConfig::default();

    // Bare remote plus two working clones.
    let remote = TempDir::new().unwrap();
    sh(remote.path(), &["init", "--bare", "-b", "main"]);

    let clone = |name: &str| -> TempDir {
        let dir = TempDir::new().unwrap();
        let out = std::process::Command::new("git")
            .args([
                "clone",
                remote.path().to_str().unwrap(),
                dir.path().join(name).to_str().unwrap(),
            ])
            .output()
            .unwrap();
        assert!(out.status.success(), "clone failed");
        dir
    };

    let a_parent = clone("a");
    let a_root = a_parent.path().join("a");
    sh(&a_root, &["config", "user.email", "a@example.com"]);
    sh(&a_root, &["config", "user.name", "A"]);
    std::fs::write(a_root.join("README.md"), "a\n").unwrap();
    sh(&a_root, &["add", "."]);
    sh(&a_root, &["commit", "-m", "init"]);
    sh(&a_root, &["push", "origin", "main"]);

    let b_parent = clone("b");
    let b_root = b_parent.path().join("b");
    sh(&b_root, &["config", "user.email", "b@example.com"]);
    sh(&b_root, &["config", "user.name", "B"]);

    let git_a = Git::at(&a_root, Duration::from_secs(10));
    let git_b = Git::at(&b_root, Duration::from_secs(10));

    // Side A records a mistake and pushes.
    let mut from_a = KnowledgeEntry::new("Mistake recorded on clone A");
    from_a.description = "a side".into();
    write_local(&a_root, "mistakes.md", &from_a.format());
    let outcome = push_shared(&a_root, &git_a).await.unwrap();
    assert!(outcome.contains("pushed"), "got: {}", outcome);

    // Side B has its own mistake, pulls, then pushes the merge.
    let mut from_b = KnowledgeEntry::new("Mistake recorded on clone B");
    from_b.description = "b side".into();
    write_local(&b_root, "mistakes.md", &from_b.format());
    pull_shared(&b_root, &git_b, &config).await.unwrap();

    let merged_b =
        std::fs::read_to_string(ghost_core::paths::mistakes_file(&b_root)).unwrap();
    assert!(merged_b.contains("Mistake recorded on clone A"));
    assert!(merged_b.contains("Mistake recorded on clone B"));

    push_shared(&b_root, &git_b).await.unwrap();

    // Side A pulls and sees both.
    pull_shared(&a_root, &git_a, &config).await.unwrap();
    let merged_a =
        std::fs::read_to_string(ghost_core::paths::mistakes_file(&a_root)).unwrap();
    assert!(merged_a.contains("Mistake recorded on clone A"));
    assert!(merged_a.contains("Mistake recorded on clone B"));
}

#[tokio::test]
async fn sync_never_touches_head_or_worktree() {
    fail_if_no_git!();
    let dir = fixture();
    let git = Git::at(dir.path(), Duration::from_secs(10));
    let head_before = git.head_commit().await.unwrap();
    write_local(dir.path(), "decisions.md", "### Decision made here\n\nd\n");

    push_shared(dir.path(), &git).await.unwrap();
    pull_shared(dir.path(), &git, &ghost_core::GhostConfig::default())
        .await
        .unwrap();

    assert_eq!(git.head_commit().await.unwrap(), head_before);
    assert!(!dir.path().join("decisions.md").exists());
    assert!(git.modified_files().await.is_empty());
}
