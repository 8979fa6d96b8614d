// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Timestamp and duration formatting shared across the workspace.

use chrono::{NaiveDate, SecondsFormat, Utc};

/// Current instant as ISO-8601 with second precision (`2026-08-02T10:15:00Z`).
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Current UTC date as `YYYY-MM-DD`.
pub fn today_utc() -> String {
    Utc::now().date_naive().to_string()
}

/// Whole days elapsed since `date`, clamped at zero for future dates.
pub fn days_since(date: NaiveDate) -> i64 {
    (Utc::now().date_naive() - date).num_days().max(0)
}

/// Format seconds as a short human-readable duration: `"5s"`, `"2m"`, `"1h30m"`, `"3d"`.
///
/// For the hours range, minutes are included when non-zero (e.g. `"1h"` vs `"1h5m"`).
pub fn format_elapsed(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86400 {
        let h = secs / 3600;
        let m = (secs % 3600) / 60;
        if m > 0 {
            format!("{}h{}m", h, m)
        } else {
            format!("{}h", h)
        }
    } else {
        format!("{}d", secs / 86400)
    }
}

#[cfg(test)]
#[path = "time_fmt_tests.rs"]
mod tests;
