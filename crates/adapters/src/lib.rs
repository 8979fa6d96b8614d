// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ghost-adapters: subprocess wrappers around the external collaborators.
//!
//! Everything here talks to another binary: git, the semantic search
//! engine, and the summarizer. Hook processes only ever reach git (with a
//! hard 3 s cap); the search engine and summarizer are confined to the
//! background finalizer.

pub mod env;
pub mod git;
pub mod search;
pub mod subprocess;
pub mod summarize;

pub use git::Git;
pub use search::{collection_for, FakeSearchEngine, SearchEngine, SearchError, SemdexEngine};
pub use subprocess::{run_with_stdin, run_with_timeout, HOOK_SCM_TIMEOUT, SYNC_TIMEOUT};
pub use summarize::{CommandSummarizer, FakeSummarizer, SummarizeError, Summarizer};
