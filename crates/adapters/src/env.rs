// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the adapters crate.

/// Guard variable marking an internal sub-invocation.
///
/// Set when ghost spawns the summarizer (which may itself run the hosting
/// agent, which would fire hooks again). Every hook handler that inherits
/// it exits immediately with no side effects.
pub const INTERNAL_GUARD_VAR: &str = "GHOST_INTERNAL";

/// Semantic search engine binary (default: `semdex`).
pub fn semdex_bin() -> String {
    std::env::var("GHOST_SEMDEX_BIN").unwrap_or_else(|_| "semdex".to_string())
}

/// Summarizer binary (default: `claude`).
pub fn summarizer_bin() -> String {
    std::env::var("GHOST_SUMMARIZER_BIN").unwrap_or_else(|_| "claude".to_string())
}

/// True when this process is an internal sub-invocation and hooks must
/// not re-enter the capture pipeline.
pub fn is_internal_invocation() -> bool {
    std::env::var(INTERNAL_GUARD_VAR).is_ok_and(|v| !v.is_empty())
}

/// Disable spawning the detached background finalizer (`GHOST_NO_BACKGROUND`).
/// Used by tests and callers that run enrichment in the foreground.
pub fn background_disabled() -> bool {
    std::env::var("GHOST_NO_BACKGROUND").is_ok_and(|v| !v.is_empty())
}
