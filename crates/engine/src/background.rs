// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Background process bookkeeping: pid file, plain-text log, detachment.
//!
//! The finalizer outlives its parent hook and any tracing subscriber, so
//! it logs to `.background.log` directly: one `[ISO] message` line per
//! event, rotated by keeping the newest lines once the file crosses the
//! size threshold.

use ghost_core::{paths, time_fmt, GhostConfig};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Append-only logger for the background finalizer.
pub struct BackgroundLog {
    path: PathBuf,
    max_bytes: u64,
    keep_lines: usize,
}

impl BackgroundLog {
    pub fn new(repo: &Path, config: &GhostConfig) -> Self {
        Self {
            path: paths::background_log(repo),
            max_bytes: config.background_log_max_bytes,
            keep_lines: config.background_log_keep_lines,
        }
    }

    /// Append one `[ISO] message` line, rotating first when oversized.
    pub fn log(&self, message: &str) {
        self.rotate_if_needed();
        let line = format!("[{}] {}\n", time_fmt::now_iso(), message);
        let _ = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .and_then(|mut f| std::io::Write::write_all(&mut f, line.as_bytes()));
    }

    fn rotate_if_needed(&self) {
        let Ok(meta) = std::fs::metadata(&self.path) else {
            return;
        };
        if meta.len() <= self.max_bytes {
            return;
        }
        let Ok(content) = std::fs::read_to_string(&self.path) else {
            return;
        };
        let lines: Vec<&str> = content.lines().collect();
        let keep = lines.len().saturating_sub(self.keep_lines);
        let tail = lines[keep..].join("\n");
        let _ = std::fs::write(&self.path, format!("{}\n", tail));
    }
}

/// Write this process's pid to `.background.pid`.
pub fn write_pid(repo: &Path) {
    let _ = std::fs::write(paths::background_pid(repo), std::process::id().to_string());
}

/// Remove the pid file if it still names this process.
pub fn clear_pid(repo: &Path) {
    let path = paths::background_pid(repo);
    let mine = std::process::id().to_string();
    if std::fs::read_to_string(&path).map(|s| s.trim() == mine).unwrap_or(false) {
        let _ = std::fs::remove_file(&path);
    }
}

/// Pid from `.background.pid`, if present.
pub fn read_pid(repo: &Path) -> Option<u32> {
    std::fs::read_to_string(paths::background_pid(repo))
        .ok()
        .and_then(|s| s.trim().parse().ok())
}

/// Check if a process with the given PID exists
pub fn process_exists(pid: u32) -> bool {
    Command::new("kill")
        .args(["-0", &pid.to_string()])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

/// Spawn this binary's hidden finalizer entry point, fully detached.
///
/// All three standard streams are nulled so the child holds no handle to
/// the hook's pipes, and the child is never awaited; SessionEnd returns
/// immediately. The re-entrancy guard is NOT set here: the finalizer
/// itself must run; it sets the guard when invoking the summarizer.
pub fn spawn_detached_finalizer(repo: &Path, transcript: &Path, session_id: &str) -> bool {
    if ghost_adapters::env::background_disabled() {
        return false;
    }
    let Ok(exe) = std::env::current_exe() else {
        return false;
    };
    Command::new(exe)
        .arg("finalize-session")
        .arg(repo)
        .arg(transcript)
        .arg(session_id)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .is_ok()
}

#[cfg(test)]
#[path = "background_tests.rs"]
mod tests;
