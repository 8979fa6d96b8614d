// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin subprocess wrapper over git.
//!
//! Only the porcelain/plumbing subcommand interface is used; there is no
//! in-process git library. Every query returns a value or `None`/`false`:
//! a missing remote, branch or note is an ordinary answer, never an error.
//! Failures are logged at debug level and otherwise swallowed, because
//! most callers are hook processes that must stay silent.

use crate::subprocess::{run_with_stdin, run_with_timeout};
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::process::Command;

/// Handle to a discovered repository.
#[derive(Debug, Clone)]
pub struct Git {
    root: PathBuf,
    /// Budget for local subprocess calls.
    timeout: Duration,
    /// Budget for fetch/push.
    network_timeout: Duration,
}

impl Git {
    /// Discover the repository containing `dir`.
    ///
    /// Returns `None` when `dir` is not inside a work tree (or git is not
    /// installed), which callers treat as "nothing to capture".
    pub async fn discover(dir: &Path, timeout: Duration) -> Option<Git> {
        let mut cmd = Command::new("git");
        cmd.current_dir(dir).args(["rev-parse", "--show-toplevel"]);
        let output = run_with_timeout(cmd, timeout, "git rev-parse --show-toplevel")
            .await
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let root = String::from_utf8_lossy(&output.stdout).trim().to_string();
        if root.is_empty() {
            return None;
        }
        Some(Git {
            root: PathBuf::from(root),
            timeout,
            network_timeout: crate::subprocess::SYNC_TIMEOUT,
        })
    }

    /// Open a repository at a known root without discovery.
    pub fn at(root: &Path, timeout: Duration) -> Git {
        Git {
            root: root.to_path_buf(),
            timeout,
            network_timeout: crate::subprocess::SYNC_TIMEOUT,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn cmd(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new("git");
        cmd.current_dir(&self.root).args(args);
        cmd
    }

    /// Run a git subcommand, returning stdout on success.
    async fn run(&self, args: &[&str], timeout: Duration) -> Option<String> {
        let description = format!("git {}", args.first().copied().unwrap_or(""));
        match run_with_timeout(self.cmd(args), timeout, &description).await {
            Ok(output) if output.status.success() => {
                Some(String::from_utf8_lossy(&output.stdout).into_owned())
            }
            Ok(output) => {
                tracing::debug!(
                    command = %description,
                    code = ?output.status.code(),
                    "git returned nonzero"
                );
                None
            }
            Err(err) => {
                tracing::debug!(command = %description, error = %err, "git call failed");
                None
            }
        }
    }

    /// Current branch name, `None` on detached HEAD or an unborn branch.
    pub async fn current_branch(&self) -> Option<String> {
        let out = self.run(&["rev-parse", "--abbrev-ref", "HEAD"], self.timeout).await?;
        let branch = out.trim();
        if branch.is_empty() || branch == "HEAD" {
            None
        } else {
            Some(branch.to_string())
        }
    }

    /// Full HEAD commit hash.
    pub async fn head_commit(&self) -> Option<String> {
        let out = self.run(&["rev-parse", "HEAD"], self.timeout).await?;
        let sha = out.trim();
        if sha.is_empty() {
            None
        } else {
            Some(sha.to_string())
        }
    }

    /// `git diff --stat HEAD`, `None` when clean or unavailable.
    pub async fn diff_stat(&self) -> Option<String> {
        let out = self.run(&["diff", "--stat", "HEAD"], self.timeout).await?;
        let trimmed = out.trim_end();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }

    /// Worktree paths modified relative to HEAD (unstaged and staged).
    pub async fn modified_files(&self) -> Vec<String> {
        let Some(out) = self.run(&["diff", "--name-only", "HEAD"], self.timeout).await else {
            return Vec::new();
        };
        out.lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Number of commits touching `path` since `date` (exclusive).
    pub async fn commits_touching_since(&self, path: &str, date: NaiveDate) -> Option<u32> {
        let since = format!("--since={}", date);
        let out = self
            .run(
                &["rev-list", "--count", &since, "HEAD", "--", path],
                self.timeout,
            )
            .await?;
        out.trim().parse().ok()
    }

    /// Attach the contents of `file` as a note on `commit` under `notes_ref`.
    ///
    /// Overwrites any existing note (`-f`): the finalizer may re-attach an
    /// enriched transcript over the fast checkpoint note.
    pub async fn add_note_from_file(&self, notes_ref: &str, commit: &str, file: &Path) -> bool {
        let file = file.display().to_string();
        self.run(
            &["notes", "--ref", notes_ref, "add", "-f", "-F", &file, commit],
            self.timeout,
        )
        .await
        .is_some()
    }

    /// Note text attached to `commit` under `notes_ref`.
    pub async fn show_note(&self, notes_ref: &str, commit: &str) -> Option<String> {
        self.run(&["notes", "--ref", notes_ref, "show", commit], self.timeout)
            .await
    }

    /// Remove the notes ref entirely.
    pub async fn delete_notes_ref(&self, notes_ref: &str) -> bool {
        let full = format!("refs/notes/{}", notes_ref);
        self.run(&["update-ref", "-d", &full], self.timeout)
            .await
            .is_some()
    }

    /// `git config key value` in the local repository.
    pub async fn set_config(&self, key: &str, value: &str) -> bool {
        self.run(&["config", key, value], self.timeout)
            .await
            .is_some()
    }

    /// True when `branch` exists locally.
    pub async fn branch_exists(&self, branch: &str) -> bool {
        let full = format!("refs/heads/{}", branch);
        self.run(&["show-ref", "--verify", "--quiet", &full], self.timeout)
            .await
            .is_some()
    }

    /// Tip commit of a local branch.
    pub async fn branch_tip(&self, branch: &str) -> Option<String> {
        let full = format!("refs/heads/{}", branch);
        let out = self.run(&["rev-parse", &full], self.timeout).await?;
        Some(out.trim().to_string()).filter(|s| !s.is_empty())
    }

    /// First configured remote name, usually `origin`.
    pub async fn first_remote(&self) -> Option<String> {
        let out = self.run(&["remote"], self.timeout).await?;
        out.lines().next().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string)
    }

    /// Fetch `branch` from `remote` into the local branch of the same name.
    pub async fn fetch_branch(&self, remote: &str, branch: &str) -> bool {
        let refspec = format!("{b}:{b}", b = branch);
        self.run(&["fetch", remote, &refspec], self.network_timeout)
            .await
            .is_some()
    }

    /// Push `branch` to `remote`, bypassing hooks.
    pub async fn push_branch(&self, remote: &str, branch: &str) -> bool {
        self.run(
            &["push", "--no-verify", remote, branch],
            self.network_timeout,
        )
        .await
        .is_some()
    }

    /// Read a blob from a ref without touching the worktree (`branch:path`).
    pub async fn read_blob(&self, branch: &str, path: &str) -> Option<String> {
        let spec = format!("{}:{}", branch, path);
        self.run(&["show", &spec], self.timeout).await
    }

    /// Commit `files` (path, content) onto `branch` using plumbing only.
    ///
    /// The worktree, index and HEAD are untouched: a temporary index file
    /// (via `GIT_INDEX_FILE`) holds the staged blobs, `write-tree` /
    /// `commit-tree` build the commit with the branch tip as parent (an
    /// orphan root commit when the branch does not exist yet), and
    /// `update-ref` advances the branch. Returns the new commit hash.
    pub async fn commit_tree_files(
        &self,
        branch: &str,
        files: &[(String, String)],
        message: &str,
    ) -> Option<String> {
        let index = TempIndex::new();
        let result = self.commit_tree_inner(branch, files, message, index.path()).await;
        // TempIndex drop removes the file even on early return.
        drop(index);
        result
    }

    async fn commit_tree_inner(
        &self,
        branch: &str,
        files: &[(String, String)],
        message: &str,
        index: &Path,
    ) -> Option<String> {
        let index_env = index.display().to_string();
        let parent = self.branch_tip(branch).await;

        // 1. Seed the temporary index with the branch tree, or empty.
        let mut seed = self.cmd(&[]);
        seed.env("GIT_INDEX_FILE", &index_env);
        match &parent {
            Some(tip) => {
                seed.args(["read-tree", tip.as_str()]);
            }
            None => {
                seed.args(["read-tree", "--empty"]);
            }
        }
        let seeded = run_with_timeout(seed, self.timeout, "git read-tree").await;
        if !matches!(seeded, Ok(ref o) if o.status.success()) {
            return None;
        }

        // 2. Stage each file as a blob.
        for (path, content) in files {
            let mut hash = self.cmd(&["hash-object", "-w", "--stdin"]);
            hash.env("GIT_INDEX_FILE", &index_env);
            let output = run_with_stdin(hash, content, self.timeout, "git hash-object")
                .await
                .ok()?;
            if !output.status.success() {
                return None;
            }
            let blob = String::from_utf8_lossy(&output.stdout).trim().to_string();

            let cacheinfo = format!("100644,{},{}", blob, path);
            let mut stage = self.cmd(&["update-index", "--add", "--cacheinfo", &cacheinfo]);
            stage.env("GIT_INDEX_FILE", &index_env);
            let staged = run_with_timeout(stage, self.timeout, "git update-index").await;
            if !matches!(staged, Ok(ref o) if o.status.success()) {
                return None;
            }
        }

        // 3. Write the index out as a tree.
        let mut write = self.cmd(&["write-tree"]);
        write.env("GIT_INDEX_FILE", &index_env);
        let output = run_with_timeout(write, self.timeout, "git write-tree").await.ok()?;
        if !output.status.success() {
            return None;
        }
        let tree = String::from_utf8_lossy(&output.stdout).trim().to_string();

        // 4. Commit with the branch tip as parent when one exists.
        let mut commit_args: Vec<&str> = vec!["commit-tree", &tree, "-m", message];
        if let Some(tip) = &parent {
            commit_args.extend(["-p", tip.as_str()]);
        }
        let output = run_with_timeout(self.cmd(&commit_args), self.timeout, "git commit-tree")
            .await
            .ok()?;
        if !output.status.success() {
            return None;
        }
        let commit = String::from_utf8_lossy(&output.stdout).trim().to_string();

        // 5. Advance the branch ref.
        let full = format!("refs/heads/{}", branch);
        let advanced = run_with_timeout(
            self.cmd(&["update-ref", &full, &commit]),
            self.timeout,
            "git update-ref",
        )
        .await;
        if !matches!(advanced, Ok(ref o) if o.status.success()) {
            return None;
        }
        Some(commit)
    }
}

/// Temporary index file removed on every exit path.
struct TempIndex {
    path: PathBuf,
}

impl TempIndex {
    fn new() -> Self {
        let path = std::env::temp_dir().join(format!(
            "ghost-index-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.subsec_nanos())
                .unwrap_or(0)
        ));
        TempIndex { path }
    }

    fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempIndex {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
