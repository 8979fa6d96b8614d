// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Knowledge entries: titled, file-attributed records of decisions and
//! mistakes mined from session summaries.
//!
//! The on-disk form is a markdown `###` heading block followed by a single
//! HTML comment of pipe-delimited `key:value` metadata:
//!
//! ```text
//! ### Prefer the cart service for price math
//!
//! Rounding in the UI drifted from the backend.
//!
//! <!-- session:2026-08-02-ab12cd34 | files:src/cart/total.ts | area:cart | date:2026-08-02 -->
//! ```
//!
//! Plain `- title` lines outside any heading block are legacy entries and
//! keep parsing forever; writers only ever emit the structured form.

use chrono::NaiveDate;
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

/// Area assigned when no file path yields one.
pub const GENERAL_AREA: &str = "general";

/// Path prefixes that carry no area information.
const CODE_ROOTS: [&str; 3] = ["src", "app", "lib"];

/// A decision or mistake record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnowledgeEntry {
    pub title: String,
    pub description: String,
    pub session_id: Option<String>,
    pub commit: Option<String>,
    /// Repo-relative paths, in the order the entry named them.
    pub files: Vec<String>,
    pub area: String,
    pub date: Option<NaiveDate>,
    /// Approaches tried before the fix (mistakes only).
    pub tried: Vec<String>,
    /// Standing assertion surfaced with top priority at session start.
    pub rule: Option<String>,
    /// True for bare `- title` lines from older archives.
    pub legacy: bool,
}

impl KnowledgeEntry {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            session_id: None,
            commit: None,
            files: Vec::new(),
            area: GENERAL_AREA.to_string(),
            date: None,
            tried: Vec::new(),
            rule: None,
            legacy: false,
        }
    }

    pub fn legacy(title: impl Into<String>) -> Self {
        let mut entry = Self::new(title);
        entry.legacy = true;
        entry
    }

    pub fn has_rule(&self) -> bool {
        self.rule.as_deref().is_some_and(|r| !r.trim().is_empty())
    }

    /// Dedup key used by the sync merge: lowercased title and description.
    pub fn merge_key(&self) -> (String, String) {
        (
            self.title.trim().to_lowercase(),
            self.description.trim().to_lowercase(),
        )
    }

    /// Render to the on-disk markdown form (no trailing blank line).
    pub fn format(&self) -> String {
        if self.legacy {
            return format!("- {}\n", self.title);
        }
        let mut out = format!("### {}\n", self.title);
        if !self.description.trim().is_empty() {
            out.push('\n');
            out.push_str(self.description.trim_end());
            out.push('\n');
        }
        let meta = self.format_metadata();
        if !meta.is_empty() {
            out.push('\n');
            out.push_str("<!-- ");
            out.push_str(&meta);
            out.push_str(" -->\n");
        }
        out
    }

    fn format_metadata(&self) -> String {
        let mut pairs: Vec<String> = Vec::new();
        if let Some(session) = &self.session_id {
            pairs.push(format!("session:{}", sanitize(session)));
        }
        if let Some(commit) = &self.commit {
            pairs.push(format!("commit:{}", sanitize(commit)));
        }
        if !self.files.is_empty() {
            pairs.push(format!(
                "files:{}",
                self.files
                    .iter()
                    .map(|f| sanitize(f))
                    .collect::<Vec<_>>()
                    .join(",")
            ));
        }
        if self.area != GENERAL_AREA && !self.area.is_empty() {
            pairs.push(format!("area:{}", sanitize(&self.area)));
        }
        if let Some(date) = self.date {
            pairs.push(format!("date:{}", date));
        }
        if !self.tried.is_empty() {
            pairs.push(format!(
                "tried:{}",
                self.tried
                    .iter()
                    .map(|t| sanitize(t))
                    .collect::<Vec<_>>()
                    .join(",")
            ));
        }
        if self.has_rule() {
            pairs.push(format!("rule:{}", sanitize(self.rule.as_deref().unwrap_or(""))));
        }
        pairs.join(" | ")
    }
}

/// Metadata values must survive the pipe-delimited comment form.
fn sanitize(value: &str) -> String {
    value.replace('|', "/").replace("-->", "->")
}

static METADATA_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<!--\s*(.*?)\s*-->\s*$").expect("metadata regex"));

/// Parse a whole log file into entries, structured and legacy interleaved.
///
/// Structured blocks run from a `### ` heading to their metadata comment;
/// `- ` lines outside any block are legacy titles. Anything unparseable is
/// skipped, never an error.
pub fn parse_entries(text: &str) -> Vec<KnowledgeEntry> {
    let mut entries = Vec::new();
    let mut chunk: Option<Vec<&str>> = None;

    let mut flush = |lines: &mut Option<Vec<&str>>, entries: &mut Vec<KnowledgeEntry>| {
        if let Some(lines) = lines.take() {
            if let Some(entry) = parse_chunk(&lines) {
                entries.push(entry);
            }
        }
    };

    for line in text.lines() {
        if let Some(title) = line.strip_prefix("### ") {
            flush(&mut chunk, &mut entries);
            chunk = Some(vec![title]);
            continue;
        }
        if let Some(lines) = &mut chunk {
            let closed = METADATA_LINE.is_match(line);
            lines.push(line);
            if closed {
                flush(&mut chunk, &mut entries);
            }
        } else if let Some(title) = line.strip_prefix("- ") {
            let title = title.trim();
            if !title.is_empty() {
                entries.push(KnowledgeEntry::legacy(title));
            }
        }
    }
    flush(&mut chunk, &mut entries);
    entries
}

/// First line is the heading remainder; the rest is description plus an
/// optional trailing metadata comment.
fn parse_chunk(lines: &[&str]) -> Option<KnowledgeEntry> {
    let title = lines.first()?.trim();
    if title.is_empty() {
        return None;
    }
    let mut entry = KnowledgeEntry::new(title);

    let body = &lines[1..];
    let meta_idx = body.iter().position(|l| METADATA_LINE.is_match(l));
    let description_lines = &body[..meta_idx.unwrap_or(body.len())];
    entry.description = description_lines.join("\n").trim().to_string();

    if let Some(idx) = meta_idx {
        if let Some(caps) = METADATA_LINE.captures(body[idx]) {
            apply_metadata(&mut entry, &caps[1]);
        }
    }
    Some(entry)
}

fn apply_metadata(entry: &mut KnowledgeEntry, raw: &str) {
    for pair in raw.split('|') {
        let Some((key, value)) = pair.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "session" => entry.session_id = non_empty(value),
            "commit" => entry.commit = non_empty(value),
            "files" => entry.files = split_list(value),
            "area" => {
                if !value.is_empty() {
                    entry.area = value.to_string();
                }
            }
            "date" => entry.date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok(),
            "tried" => entry.tried = split_list(value),
            "rule" => entry.rule = non_empty(value),
            _ => {}
        }
    }
    // Sessions carry the date when the metadata does not.
    if entry.date.is_none() {
        if let Some(id) = &entry.session_id {
            entry.date = crate::id::session_date(id);
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Derive an area name from repo-relative paths.
///
/// Leading code-root prefixes (`src`, `app`, `lib`) are stripped and the
/// most common remaining leading directory wins. Root-level files carry no
/// area; empty input yields [`GENERAL_AREA`].
pub fn derive_area(files: &[String]) -> String {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for file in files {
        let segments: Vec<&str> = file.split('/').filter(|s| !s.is_empty()).collect();
        let mut idx = 0;
        while idx < segments.len() && CODE_ROOTS.contains(&segments[idx]) {
            idx += 1;
        }
        // The last segment is the filename; only directory components name an area.
        if idx + 1 < segments.len() {
            *counts.entry(segments[idx]).or_insert(0) += 1;
        }
    }
    counts
        .into_iter()
        .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(a.0)))
        .map(|(seg, _)| seg.to_string())
        .unwrap_or_else(|| GENERAL_AREA.to_string())
}

static JUNK_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(none|n/?a|nothing|not applicable|no (significant |notable |major |key |new )?(mistakes?|errors?|issues?|decisions?|problems?|learnings?)( (made|found|encountered|noted|identified))?)[.!]?$",
    )
    .expect("junk title regex")
});

/// True when an extracted title carries no information worth archiving.
pub fn is_junk_title(title: &str) -> bool {
    let stripped: String = title
        .trim()
        .trim_matches(|c| matches!(c, '*' | '_' | '`' | '#' | ':'))
        .trim()
        .to_string();
    stripped.len() < 6 || JUNK_TITLE.is_match(&stripped)
}

#[cfg(test)]
#[path = "entry_tests.rs"]
mod tests;
