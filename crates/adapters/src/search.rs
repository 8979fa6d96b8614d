// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adapter for the external semantic search engine.
//!
//! The engine is a separate binary (`semdex` by default) owning an
//! embedding index keyed by collection name. Ghost scopes everything to a
//! per-project collection and never calls the engine from a hook process.

use crate::env;
use crate::subprocess::run_with_timeout;
use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// Errors from the search engine adapter.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("search engine unavailable: {0}")]
    Unavailable(String),
    #[error("search engine failed: {0}")]
    Failed(String),
}

/// Collection name for a repository: `ghost-{basename}`.
pub fn collection_for(repo_root: &Path) -> String {
    let base = repo_root
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("repo");
    format!("ghost-{}", base)
}

/// Seam to the semantic index, faked in tests.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// (Re)index a directory of markdown into `collection`.
    async fn index(&self, collection: &str, dir: &Path) -> Result<(), SearchError>;

    /// Query `collection`, returning the engine's rendered results.
    async fn search(
        &self,
        collection: &str,
        query: &str,
        tag: Option<&str>,
    ) -> Result<String, SearchError>;

    /// Drop the collection entirely.
    async fn delete_collection(&self, collection: &str) -> Result<(), SearchError>;

    /// True when the engine binary responds.
    async fn available(&self) -> bool;
}

/// Subprocess implementation talking to the `semdex` binary.
#[derive(Clone)]
pub struct SemdexEngine {
    bin: String,
}

impl SemdexEngine {
    pub fn new() -> Self {
        Self {
            bin: env::semdex_bin(),
        }
    }

    async fn run(&self, args: &[&str], timeout: Duration) -> Result<String, SearchError> {
        let mut cmd = Command::new(&self.bin);
        cmd.args(args);
        let description = format!("{} {}", self.bin, args.first().copied().unwrap_or(""));
        let output = run_with_timeout(cmd, timeout, &description)
            .await
            .map_err(SearchError::Unavailable)?;
        if !output.status.success() {
            return Err(SearchError::Failed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for SemdexEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchEngine for SemdexEngine {
    async fn index(&self, collection: &str, dir: &Path) -> Result<(), SearchError> {
        let dir = dir.display().to_string();
        // Indexing embeds every document; only the finalizer calls this,
        // so the budget is generous.
        self.run(
            &["index", "--collection", collection, &dir],
            Duration::from_secs(600),
        )
        .await
        .map(|_| ())
    }

    async fn search(
        &self,
        collection: &str,
        query: &str,
        tag: Option<&str>,
    ) -> Result<String, SearchError> {
        let mut args = vec!["search", "--collection", collection];
        if let Some(tag) = tag {
            args.extend(["--tag", tag]);
        }
        args.push(query);
        self.run(&args, Duration::from_secs(60)).await
    }

    async fn delete_collection(&self, collection: &str) -> Result<(), SearchError> {
        self.run(
            &["delete", "--collection", collection],
            Duration::from_secs(60),
        )
        .await
        .map(|_| ())
    }

    async fn available(&self) -> bool {
        let mut cmd = Command::new(&self.bin);
        cmd.arg("--version");
        run_with_timeout(cmd, Duration::from_secs(3), "semdex --version")
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

/// Recording fake for tests.
#[derive(Default)]
pub struct FakeSearchEngine {
    calls: std::sync::Mutex<Vec<String>>,
    pub fail: bool,
}

impl FakeSearchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            calls: std::sync::Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: String) -> Result<(), SearchError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        if self.fail {
            Err(SearchError::Unavailable("fake is failing".into()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl SearchEngine for FakeSearchEngine {
    async fn index(&self, collection: &str, dir: &Path) -> Result<(), SearchError> {
        self.record(format!("index {} {}", collection, dir.display()))
    }

    async fn search(
        &self,
        collection: &str,
        query: &str,
        tag: Option<&str>,
    ) -> Result<String, SearchError> {
        self.record(format!(
            "search {} {} tag={}",
            collection,
            query,
            tag.unwrap_or("-")
        ))?;
        Ok(String::new())
    }

    async fn delete_collection(&self, collection: &str) -> Result<(), SearchError> {
        self.record(format!("delete {}", collection))
    }

    async fn available(&self) -> bool {
        !self.fail
    }
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;
