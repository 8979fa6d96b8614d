// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution helpers

use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Budget for git calls made from inside a hook process.
pub const HOOK_SCM_TIMEOUT: Duration = Duration::from_secs(3);

/// Budget for git network calls made from the background finalizer.
pub const SYNC_TIMEOUT: Duration = Duration::from_secs(30);

/// Run a subprocess command with a timeout.
///
/// Wraps `Command::output()` with `tokio::time::timeout`, converting
/// timeout expiration into a descriptive error message. The child process
/// is killed automatically if the timeout elapses (via the tokio `Child`
/// drop implementation).
pub async fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
    description: &str,
) -> Result<Output, String> {
    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) => Err(format!("{} failed: {}", description, io_err)),
        Err(_elapsed) => Err(format!(
            "{} timed out after {}s",
            description,
            timeout.as_secs()
        )),
    }
}

/// Run a subprocess with `input` piped to stdin and a timeout.
///
/// Same contract as [`run_with_timeout`]: a nonzero exit is `Ok` (callers
/// inspect `output.status`), only spawn failure or timeout is `Err`.
pub async fn run_with_stdin(
    mut cmd: Command,
    input: &str,
    timeout: Duration,
    description: &str,
) -> Result<Output, String> {
    cmd.stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    let run = async {
        let mut child = cmd
            .spawn()
            .map_err(|e| format!("{} failed: {}", description, e))?;
        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(input.as_bytes())
                .await
                .map_err(|e| format!("{} stdin write failed: {}", description, e))?;
            drop(stdin);
        }
        child
            .wait_with_output()
            .await
            .map_err(|e| format!("{} failed: {}", description, e))
    };

    match tokio::time::timeout(timeout, run).await {
        Ok(result) => result,
        Err(_elapsed) => Err(format!(
            "{} timed out after {}s",
            description,
            timeout.as_secs()
        )),
    }
}

#[cfg(test)]
#[path = "subprocess_tests.rs"]
mod tests;
