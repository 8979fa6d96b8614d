// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session identifier generation and prompt hashing.
//!
//! Session ids are `YYYY-MM-DD-{8 lowercase hex}`: the current UTC date
//! plus a random 32-bit tail. The date prefix makes ids sort by creation
//! day, which `checkpoint` and `log` rely on when picking the most recent
//! completed session.

use chrono::NaiveDate;
use sha2::{Digest, Sha256};

/// Generate a fresh session id for the current UTC date.
///
/// The tail comes from [`rand::rng`], a cryptographically secure generator,
/// so concurrent sessions starting in the same instant will not collide.
pub fn generate_session_id() -> String {
    use rand::Rng;
    let tail: u32 = rand::rng().random();
    format!("{}-{:08x}", crate::time_fmt::today_utc(), tail)
}

/// Parse the date prefix of a session id.
///
/// Returns `None` when the id does not carry a `YYYY-MM-DD-` prefix.
/// Malformed ids are tolerated everywhere, so callers treat `None` as
/// "undated" rather than an error.
pub fn session_date(id: &str) -> Option<NaiveDate> {
    let prefix = id.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

/// First 8 hex characters of the SHA-256 of the prompt text.
///
/// Used to deduplicate consecutive identical prompt submissions: the hash
/// is embedded in the `## Prompt N <!-- ph:{hash} -->` heading and compared
/// against the next submission before appending.
pub fn prompt_hash(text: &str) -> String {
    let digest = Sha256::digest(text.as_bytes());
    let mut out = String::with_capacity(8);
    for byte in &digest[..4] {
        out.push_str(&format!("{:02x}", byte));
    }
    out
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
