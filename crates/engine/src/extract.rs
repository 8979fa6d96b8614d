// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parser for the summarizer's fixed-schema markdown.
//!
//! The summarizer returns a document with `##` sections (`Intent`,
//! `Changes`, `Knowledge`, `Decisions`, `Strategies`, `Mistakes`,
//! `Open Items`, `Relevance`, `Tags`). Extraction is deliberately
//! forgiving: a section that fails to parse contributes nothing, and the
//! document as a whole is only trusted when both `Intent` and `Tags`
//! exist.

use regex::Regex;
use std::sync::LazyLock;

/// One `**Title**: description` block from a list section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedBlock {
    pub title: String,
    pub description: String,
    pub files: Vec<String>,
    pub tried: Vec<String>,
    pub rule: Option<String>,
}

/// A parsed summary document.
#[derive(Debug, Clone, Default)]
pub struct Summary {
    sections: Vec<(String, String)>,
}

static SECTION_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^## +(.+?)\s*$").expect("section heading regex"));

static NONE_BODY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\s*(none|n/?a|nothing|not applicable|no (significant |notable |major |key |new )?(decisions?|mistakes?|errors?|issues?|strategies|knowledge|learnings?|items?)( (made|found|encountered|noted|recorded))?)[.!]?\s*$",
    )
    .expect("none body regex")
});

static BOLD_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\*\*(.+?)(?:\*\*\s*:|:\s*\*\*)\s*(.*)$").expect("bold title regex")
});

static METADATA_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(Files|Tried|Rule)\s*:\s*(.*)$").expect("metadata line regex"));

impl Summary {
    /// Split a document on its top-level `##` headings.
    pub fn parse(text: &str) -> Summary {
        let mut sections = Vec::new();
        let mut current: Option<(String, Vec<&str>)> = None;
        for line in text.lines() {
            if let Some(caps) = SECTION_HEADING.captures(line) {
                if let Some((name, body)) = current.take() {
                    sections.push((name, body.join("\n").trim().to_string()));
                }
                current = Some((caps[1].to_string(), Vec::new()));
                continue;
            }
            if let Some((_, body)) = &mut current {
                body.push(line);
            }
        }
        if let Some((name, body)) = current {
            sections.push((name, body.join("\n").trim().to_string()));
        }
        Summary { sections }
    }

    /// A summary is usable when both `Intent` and `Tags` are present.
    pub fn is_valid(&self) -> bool {
        self.section("Intent").is_some() && self.section("Tags").is_some()
    }

    pub fn section(&self, name: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, body)| body.as_str())
    }

    /// Comma-split tags, trimmed, empty and comment-prefixed entries dropped.
    pub fn tags(&self) -> Vec<String> {
        let Some(body) = self.section("Tags") else {
            return Vec::new();
        };
        body.split([',', '\n'])
            .map(str::trim)
            .filter(|t| !t.is_empty() && !t.starts_with('#') && !t.starts_with("//"))
            .filter(|t| !NONE_BODY.is_match(t))
            .map(str::to_string)
            .collect()
    }

    /// `Relevance: skip` verdict.
    pub fn skip_knowledge(&self) -> bool {
        static SKIP: LazyLock<Regex> =
            LazyLock::new(|| Regex::new(r"(?i)^\s*skip\s*$").expect("skip regex"));
        self.section("Relevance").is_some_and(|body| SKIP.is_match(body))
    }

    /// Blocks of a list section (`Decisions`, `Mistakes`, `Strategies`,
    /// `Knowledge`). A body that reduces to a "none" variant yields nothing.
    pub fn blocks(&self, name: &str) -> Vec<ExtractedBlock> {
        let Some(body) = self.section(name) else {
            return Vec::new();
        };
        if body.is_empty() || NONE_BODY.is_match(body) {
            return Vec::new();
        }

        let mut blocks: Vec<Vec<&str>> = Vec::new();
        for line in body.lines() {
            let starts_block =
                line.trim_start().starts_with("**") || line.trim_start().starts_with("- **");
            if starts_block {
                blocks.push(Vec::new());
            }
            if let Some(last) = blocks.last_mut() {
                last.push(line);
            }
        }
        if blocks.is_empty() {
            // Free-form body without bold titles: one block.
            blocks.push(body.lines().collect());
        }
        blocks.iter().filter_map(|lines| parse_block(lines)).collect()
    }

    /// The `Open Items` body, when non-empty and not a "none" variant.
    pub fn open_items(&self) -> Option<&str> {
        let body = self.section("Open Items")?;
        if body.is_empty() || NONE_BODY.is_match(body) {
            None
        } else {
            Some(body)
        }
    }
}

fn parse_block(lines: &[&str]) -> Option<ExtractedBlock> {
    let mut title = String::new();
    let mut description: Vec<String> = Vec::new();
    let mut files = Vec::new();
    let mut tried = Vec::new();
    let mut rule = None;

    for (i, raw) in lines.iter().enumerate() {
        let line = raw.trim_start().trim_start_matches("- ").trim_end();
        if line.is_empty() {
            continue;
        }
        if let Some(caps) = METADATA_LINE.captures(line) {
            let values = caps[2].trim();
            match &caps[1] {
                "Files" => files = comma_split(values),
                "Tried" => tried = comma_split(values),
                "Rule" => {
                    if !values.is_empty() {
                        rule = Some(values.to_string());
                    }
                }
                _ => {}
            }
            continue;
        }
        if i == 0 {
            if let Some(caps) = BOLD_TITLE.captures(line) {
                title = caps[1].trim().trim_end_matches(':').to_string();
                let rest = caps[2].trim();
                if !rest.is_empty() {
                    description.push(rest.to_string());
                }
                continue;
            }
            // No bold-colon form: the whole first line is the title.
            title = line.trim_start_matches('*').trim_end_matches('*').to_string();
            continue;
        }
        description.push(line.to_string());
    }

    if title.trim().is_empty() {
        return None;
    }
    Some(ExtractedBlock {
        title,
        description: description.join("\n"),
        files,
        tried,
        rule,
    })
}

fn comma_split(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "extract_tests.rs"]
mod tests;
