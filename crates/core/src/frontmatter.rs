// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tolerant YAML-subset frontmatter for session transcripts.
//!
//! Transcripts open with a `---` delimited block of `key: value` pairs and
//! flow (`tags: [a, b]`) or block (`- a` lines) sequences. The parser never
//! fails: malformed input yields an empty frontmatter and the document body
//! is preserved untouched. Unknown keys round-trip through updates, which
//! is why this is a hand parser rather than a full YAML round-trip.

/// A single frontmatter value: scalar or sequence of strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrontmatterValue {
    Scalar(String),
    Seq(Vec<String>),
}

impl FrontmatterValue {
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            FrontmatterValue::Scalar(s) => Some(s),
            FrontmatterValue::Seq(_) => None,
        }
    }

    pub fn as_seq(&self) -> Option<&[String]> {
        match self {
            FrontmatterValue::Scalar(_) => None,
            FrontmatterValue::Seq(items) => Some(items),
        }
    }
}

/// Ordered key/value frontmatter block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frontmatter {
    fields: Vec<(String, FrontmatterValue)>,
}

impl Frontmatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split a document into its frontmatter and body.
    ///
    /// The body starts after the closing `---` line; when the document has
    /// no (or a malformed) frontmatter block, the frontmatter is empty and
    /// the body is the whole document.
    pub fn split(doc: &str) -> (Frontmatter, &str) {
        let Some(rest) = doc.strip_prefix("---\n") else {
            return (Frontmatter::new(), doc);
        };
        let Some(end) = rest.find("\n---\n").map(|i| i + 5).or_else(|| {
            // Closing delimiter at EOF without trailing newline
            rest.strip_suffix("\n---")
                .map(|block| block.len() + 4)
        }) else {
            return (Frontmatter::new(), doc);
        };
        let block = &rest[..end.saturating_sub(4).min(rest.len())];
        let body = rest.get(end..).unwrap_or("");
        (Frontmatter::parse_block(block), body)
    }

    /// Parse the inside of a frontmatter block. Never fails; lines that do
    /// not look like `key: value` or `- item` are skipped.
    fn parse_block(block: &str) -> Frontmatter {
        let mut fields: Vec<(String, FrontmatterValue)> = Vec::new();
        for line in block.lines() {
            let trimmed = line.trim_end();
            if trimmed.is_empty() || trimmed == "---" {
                continue;
            }
            if let Some(item) = trimmed.trim_start().strip_prefix("- ") {
                // Block-sequence item; attaches to the most recent key.
                if let Some((_, value)) = fields.last_mut() {
                    if let FrontmatterValue::Scalar(s) = value {
                        if !s.is_empty() {
                            continue;
                        }
                        *value = FrontmatterValue::Seq(Vec::new());
                    }
                    if let FrontmatterValue::Seq(items) = value {
                        items.push(unquote(item.trim()).to_string());
                    }
                }
                continue;
            }
            let Some((key, raw)) = trimmed.split_once(':') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() || key.contains(' ') {
                continue;
            }
            let raw = raw.trim();
            let value = if let Some(inner) = raw.strip_prefix('[').and_then(|r| r.strip_suffix(']'))
            {
                FrontmatterValue::Seq(
                    inner
                        .split(',')
                        .map(|s| unquote(s.trim()).to_string())
                        .filter(|s| !s.is_empty())
                        .collect(),
                )
            } else {
                FrontmatterValue::Scalar(unquote(raw).to_string())
            };
            fields.push((key.to_string(), value));
        }
        Frontmatter { fields }
    }

    pub fn get(&self, key: &str) -> Option<&FrontmatterValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn scalar(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(FrontmatterValue::as_scalar)
    }

    /// Sequence value for `key`. A scalar is tolerated as a one-element
    /// sequence (`validate` can rewrite it into proper form).
    pub fn seq(&self, key: &str) -> Vec<String> {
        match self.get(key) {
            Some(FrontmatterValue::Seq(items)) => items.clone(),
            Some(FrontmatterValue::Scalar(s)) if !s.is_empty() => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Set `key` to a scalar, appending the key if absent.
    pub fn set_scalar(&mut self, key: &str, value: impl Into<String>) {
        let value = FrontmatterValue::Scalar(value.into());
        self.set(key, value);
    }

    /// Set `key` to a sequence, appending the key if absent.
    pub fn set_seq(&mut self, key: &str, items: Vec<String>) {
        self.set(key, FrontmatterValue::Seq(items));
    }

    fn set(&mut self, key: &str, value: FrontmatterValue) {
        if let Some(slot) = self.fields.iter_mut().find(|(k, _)| k == key) {
            slot.1 = value;
        } else {
            self.fields.push((key.to_string(), value));
        }
    }

    /// Render the block including its `---` delimiters.
    pub fn render(&self) -> String {
        let mut out = String::from("---\n");
        for (key, value) in &self.fields {
            match value {
                FrontmatterValue::Scalar(s) => {
                    out.push_str(key);
                    out.push_str(": ");
                    out.push_str(&quote_if_needed(s));
                    out.push('\n');
                }
                FrontmatterValue::Seq(items) => {
                    out.push_str(key);
                    out.push_str(": [");
                    for (i, item) in items.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        out.push_str(&quote_if_needed(item));
                    }
                    out.push_str("]\n");
                }
            }
        }
        out.push_str("---\n");
        out
    }
}

/// Rewrite a document's frontmatter in place, preserving the body.
///
/// `edit` receives the parsed (possibly empty) frontmatter; the returned
/// document carries the rendered result ahead of the untouched body.
pub fn update_document(doc: &str, edit: impl FnOnce(&mut Frontmatter)) -> String {
    let (mut fm, body) = Frontmatter::split(doc);
    edit(&mut fm);
    format!("{}{}", fm.render(), body)
}

fn unquote(s: &str) -> &str {
    let s = s.trim();
    s.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| s.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
        .unwrap_or(s)
}

fn quote_if_needed(s: &str) -> String {
    let leading_special = s
        .chars()
        .next()
        .is_some_and(|c| matches!(c, '[' | '{' | '\'' | '"' | '*' | '&' | '!' | '>' | '|' | '%'));
    // A bare colon is fine in a plain scalar (`area:cart`, timestamps);
    // only `: ` and comment markers force quoting.
    if leading_special || s.contains(": ") || s.contains(" #") || s.contains(',') {
        format!("\"{}\"", s.replace('"', "\\\""))
    } else {
        s.to_string()
    }
}

#[cfg(test)]
#[path = "frontmatter_tests.rs"]
mod tests;
