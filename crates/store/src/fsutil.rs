// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Small filesystem helpers shared by the stores.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

/// Append one block to a file as a single `write` call.
///
/// Opens with `O_APPEND` and closes immediately: interleaved hook processes
/// each land a whole line block and the document stays parseable. Returns
/// `false` when the file does not exist (no live session) or the write
/// fails; appends are best-effort by contract.
pub fn append_block(path: &Path, block: &str) -> bool {
    let mut file = match OpenOptions::new().append(true).open(path) {
        Ok(file) => file,
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "append target missing");
            return false;
        }
    };
    match file.write_all(block.as_bytes()) {
        Ok(()) => true,
        Err(err) => {
            tracing::debug!(path = %path.display(), error = %err, "append failed");
            false
        }
    }
}

/// Write a whole file atomically: temp file in the same directory, then
/// rename over the target.
pub fn write_atomic(path: &Path, content: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, content)?;
    std::fs::rename(&tmp, path)
}

/// Read a file, treating absence as empty.
pub fn read_or_empty(path: &Path) -> String {
    std::fs::read_to_string(path).unwrap_or_default()
}
