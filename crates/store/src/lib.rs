// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! ghost-store: plain-file stores under `<repo>/.ai-sessions/`.
//!
//! No locks anywhere: transcript appends are single `write` calls on an
//! `O_APPEND` descriptor, shared JSON files are whole-file read-modify-write
//! with atomic rename, and every merge is idempotent. Concurrent writers
//! get last-writer-wins on whole files, which the rebuildable indexes
//! tolerate.

pub mod comod;
pub mod fsutil;
pub mod knowledge;
pub mod session;
pub mod session_map;
pub mod tags;

pub use comod::CoModGraph;
pub use knowledge::KnowledgeLog;
pub use session::{Append, Finalized, SessionMeta};

use thiserror::Error;

/// Errors surfaced to user commands. Hook paths swallow these.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("no session found")]
    NoSession,
}
