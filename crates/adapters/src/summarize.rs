// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adapter for the external summarization engine.
//!
//! The summarizer reads a markdown transcript on stdin and writes a
//! structured markdown summary to stdout. By default it is the hosting
//! agent's own binary in print mode, which is why the invocation always
//! carries the re-entrancy guard variable: the agent may fire hooks of its
//! own, and those must become no-ops.

use crate::env;
use crate::subprocess::run_with_stdin;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use tokio::process::Command;

/// The fixed prompt. The section set matches what the extractor parses.
pub const SUMMARY_PROMPT: &str = "\
Read the coding session transcript on stdin and produce a markdown summary \
with exactly these second-level sections: Intent, Changes, Knowledge, \
Decisions, Strategies, Mistakes, Open Items, Relevance, Tags. \
Under Decisions and Mistakes, start each item with a bold title and a colon \
(**Title**: explanation) and optionally add single lines 'Files:', 'Tried:' \
or 'Rule:' with comma-separated values. Under Relevance write 'skip' if the \
session produced nothing worth remembering, otherwise 'keep'. Under Tags \
write comma-separated namespace:value tags. Write 'none' in any section \
that does not apply.";

/// Errors from the summarizer adapter.
#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("summarizer unavailable: {0}")]
    Unavailable(String),
    #[error("summarizer exited nonzero: {0}")]
    Failed(String),
}

/// Seam to the summarization engine, faked in tests.
#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Summarize a transcript into the fixed-schema markdown document.
    async fn summarize(&self, transcript: &str) -> Result<String, SummarizeError>;

    /// True when the summarizer binary responds.
    async fn available(&self) -> bool;
}

/// Subprocess implementation piping the transcript through the binary.
#[derive(Clone)]
pub struct CommandSummarizer {
    bin: String,
    timeout: Duration,
}

impl CommandSummarizer {
    pub fn new() -> Self {
        Self {
            bin: env::summarizer_bin(),
            // Summarization is slow and only runs detached; the cap exists
            // so a hung child cannot pin the pid file forever.
            timeout: Duration::from_secs(600),
        }
    }
}

impl Default for CommandSummarizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Summarizer for CommandSummarizer {
    async fn summarize(&self, transcript: &str) -> Result<String, SummarizeError> {
        let mut cmd = Command::new(&self.bin);
        cmd.arg("-p")
            .arg(SUMMARY_PROMPT)
            .env(env::INTERNAL_GUARD_VAR, "1");
        let output = run_with_stdin(cmd, transcript, self.timeout, "summarizer")
            .await
            .map_err(SummarizeError::Unavailable)?;
        if !output.status.success() {
            return Err(SummarizeError::Failed(
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    async fn available(&self) -> bool {
        let mut cmd = Command::new(&self.bin);
        cmd.arg("--version");
        crate::subprocess::run_with_timeout(cmd, Duration::from_secs(3), "summarizer --version")
            .await
            .map(|o| o.status.success())
            .unwrap_or(false)
    }
}

/// Fake returning a canned summary (or failing).
pub struct FakeSummarizer {
    pub response: Option<String>,
}

impl FakeSummarizer {
    pub fn returning(summary: impl Into<String>) -> Self {
        Self {
            response: Some(summary.into()),
        }
    }

    pub fn unavailable() -> Self {
        Self { response: None }
    }
}

#[async_trait]
impl Summarizer for FakeSummarizer {
    async fn summarize(&self, _transcript: &str) -> Result<String, SummarizeError> {
        match &self.response {
            Some(summary) => Ok(summary.clone()),
            None => Err(SummarizeError::Unavailable("fake is unavailable".into())),
        }
    }

    async fn available(&self) -> bool {
        self.response.is_some()
    }
}

#[cfg(test)]
#[path = "summarize_tests.rs"]
mod tests;
