// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Secret redaction for transcripts and knowledge entries.
//!
//! Two layers run in order: an optional detection engine (the plug-in
//! seam) and the built-in regex patterns. The replacement is always
//! `****`, which no pattern matches, so redaction is idempotent and
//! non-secret bytes pass through untouched.

use regex::Regex;
use std::sync::LazyLock;

const MASK: &str = "****";

/// Programmatic interface of an external secrets detector.
///
/// When no engine is linked in, the built-in patterns are the whole
/// pipeline; an engine runs ahead of them, never instead of them.
pub trait DetectionEngine: Send + Sync {
    fn redact(&self, text: &str) -> String;
}

struct Pattern {
    regex: LazyLock<Regex>,
    replacement: &'static str,
}

macro_rules! pattern {
    ($re:expr, $replacement:expr) => {
        Pattern {
            regex: LazyLock::new(|| Regex::new($re).expect("redaction pattern")),
            replacement: $replacement,
        }
    };
}

/// Built-in patterns, applied in order. Block-shaped secrets come first so
/// line-shaped patterns never tear them apart.
static PATTERNS: [Pattern; 12] = [
    // PEM private key blocks keep their shell around the mask.
    pattern!(
        r"(?s)-----BEGIN ([A-Z ]*?)PRIVATE KEY-----.*?-----END ([A-Z ]*?)PRIVATE KEY-----",
        "-----BEGIN ${1}PRIVATE KEY-----\n****\n-----END ${2}PRIVATE KEY-----"
    ),
    // Cloud provider access key ids.
    pattern!(r"\b(?:AKIA|ASIA|ABIA|ACCA)[0-9A-Z]{16}\b", MASK),
    // Forge tokens: gh{p,h,o,s,a,u}_..., github_pat_..., glpat-...
    pattern!(r"\bgh[phosau]_[A-Za-z0-9]{16,255}\b", MASK),
    pattern!(r"\bgithub_pat_[A-Za-z0-9_]{22,255}\b", MASK),
    pattern!(r"\bglpat-[A-Za-z0-9_\-]{20,}", MASK),
    // Chat service tokens.
    pattern!(r"\bxox[bpas]-[A-Za-z0-9\-]{10,}", MASK),
    // Model provider keys (sk-..., sk-ant-...).
    pattern!(r"\bsk-(?:ant-)?[A-Za-z0-9_\-]{16,}", MASK),
    // Mail service keys.
    pattern!(r"\bSG\.[A-Za-z0-9_\-.]{20,}", MASK),
    // Payment processor keys.
    pattern!(r"\b[sr]k_(?:live|test)_[A-Za-z0-9]{16,}", MASK),
    // Authorization header values.
    pattern!(r"\b(?i)(Bearer|Basic)(?-i)\s+[A-Za-z0-9_\-.=+/]{8,}", "${1} ****"),
    // URL credentials: keep the user, mask the password.
    pattern!(
        r"([a-zA-Z][a-zA-Z0-9+.\-]*://[^/\s:@]+):([^@/\s]+)@",
        "${1}:****@"
    ),
    // Generic key/secret/token/password assignments (>= 20 word chars).
    pattern!(
        r#"(?i)\b(key|secret|token|password|passwd|api[_-]?key)(["']?\s*[:=]\s*["']?)[A-Za-z0-9_\-]{20,}["']?"#,
        "${1}${2}****"
    ),
];

/// Redactor with an optional plug-in detection engine.
pub struct Redactor {
    engine: Option<Box<dyn DetectionEngine>>,
}

impl Redactor {
    /// Built-in patterns only. This is the fast pass SessionEnd runs
    /// inline before the transcript becomes durable in `completed/`.
    pub fn builtin() -> Self {
        Self { engine: None }
    }

    /// Built-in patterns behind an external detection engine. This is the
    /// deep pass the background finalizer runs.
    pub fn with_engine(engine: Box<dyn DetectionEngine>) -> Self {
        Self {
            engine: Some(engine),
        }
    }

    pub fn redact(&self, text: &str) -> String {
        let text = match &self.engine {
            Some(engine) => engine.redact(text),
            None => text.to_string(),
        };
        apply_builtin(&text)
    }
}

fn apply_builtin(text: &str) -> String {
    let mut out = text.to_string();
    for pattern in &PATTERNS {
        out = pattern.regex.replace_all(&out, pattern.replacement).into_owned();
    }
    out
}

/// Fast pass: built-in patterns only.
pub fn redact_fast(text: &str) -> String {
    Redactor::builtin().redact(text)
}

/// Deep pass: the detection engine when one is available, then built-in.
///
/// No external engine ships with this build, so today this equals the
/// fast pass; the seam exists so a host with a detector library can
/// plug it in without touching callers.
pub fn redact_deep(text: &str) -> String {
    Redactor::builtin().redact(text)
}

#[cfg(test)]
#[path = "redact_tests.rs"]
mod tests;
