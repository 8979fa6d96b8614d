// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The background finalizer: the detached enrichment pass over a freshly
//! completed transcript.
//!
//! Every step is best-effort and independently logged; no step is retried
//! and no failure stops the next step (except that a missing summary
//! makes extraction pointless). The transcript is already durable in
//! `completed/` before this process starts, so the worst outcome of a
//! crash here is an unenriched session.

use crate::background::{clear_pid, write_pid, BackgroundLog};
use crate::extract::{ExtractedBlock, Summary};
use crate::redact::redact_deep;
use ghost_adapters::{collection_for, Git, SearchEngine, Summarizer};
use ghost_core::entry::{derive_area, is_junk_title, KnowledgeEntry};
use ghost_core::frontmatter::Frontmatter;
use ghost_core::{id, paths, GhostConfig};
use ghost_store::{comod, knowledge, KnowledgeLog};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Notes ref carrying per-commit session transcripts.
pub const NOTES_REF: &str = "ai-sessions";

/// Inputs for one finalizer run.
pub struct Finalizer<'a> {
    pub repo: &'a Path,
    pub transcript: PathBuf,
    pub session_id: String,
    pub config: &'a GhostConfig,
    pub git: Option<&'a Git>,
    pub summarizer: &'a dyn Summarizer,
    pub search: &'a dyn SearchEngine,
}

impl<'a> Finalizer<'a> {
    /// Drive all enrichment steps. Never returns an error: everything is
    /// logged to `.background.log` instead.
    pub async fn run(&self) {
        let log = BackgroundLog::new(self.repo, self.config);
        write_pid(self.repo);
        log.log(&format!("finalize start: {}", self.session_id));

        let transcript_text = std::fs::read_to_string(&self.transcript).unwrap_or_default();
        if transcript_text.is_empty() {
            log.log("transcript missing or empty, nothing to enrich");
            clear_pid(self.repo);
            return;
        }

        // 1-2. Summarize and parse; a missing summary skips extraction.
        let summary = self.summarize(&log, &transcript_text).await;
        let mut skip_knowledge = false;
        if let Some(summary) = &summary {
            skip_knowledge = summary.skip_knowledge();
            if skip_knowledge {
                knowledge::set_skip_knowledge(self.repo, &self.session_id);
                log.log("relevance: skip, bypassing tags and knowledge extraction");
            }
        }

        // 3-4. Tags and knowledge entries.
        if let Some(summary) = summary.as_ref().filter(|_| !skip_knowledge) {
            self.apply_tags(&log, summary);
            self.write_entries(&log, summary, &transcript_text);
        }

        // 5. Auto-mistake on repeated correction passes.
        self.auto_mistakes(&log, &transcript_text);

        // 6. Deep redaction of the durable transcript.
        self.deep_redact(&log);

        // 7. Attach the transcript as a note on HEAD.
        self.attach_note(&log).await;

        // 8. Re-index the completed directory.
        self.index(&log).await;

        // 9. Sync shared knowledge to the orphan branch.
        self.sync(&log).await;

        log.log(&format!("finalize done: {}", self.session_id));
        clear_pid(self.repo);
    }

    async fn summarize(&self, log: &BackgroundLog, transcript: &str) -> Option<Summary> {
        match self.summarizer.summarize(transcript).await {
            Ok(text) => {
                let summary = Summary::parse(&text);
                if summary.is_valid() {
                    log.log("summarize: ok");
                    self.append_summary_section(&text);
                    Some(summary)
                } else {
                    log.log("summarize: output missing Intent/Tags, skipping extraction");
                    None
                }
            }
            Err(err) => {
                log.log(&format!("summarize: {}", err));
                None
            }
        }
    }

    /// Append the summary to the transcript under a `# Summary` heading
    /// so the archive is useful without any external engine.
    fn append_summary_section(&self, summary_text: &str) {
        let Ok(current) = std::fs::read_to_string(&self.transcript) else {
            return;
        };
        if current.contains("\n# Summary\n") {
            return;
        }
        let appended = format!(
            "{}\n\n# Summary\n\n{}\n",
            current.trim_end(),
            summary_text.trim()
        );
        let _ = std::fs::write(&self.transcript, appended);
    }

    fn apply_tags(&self, log: &BackgroundLog, summary: &Summary) {
        let tags = summary.tags();
        if tags.is_empty() {
            return;
        }
        match knowledge::add_tags(self.repo, &self.session_id, &tags) {
            Some(merged) => log.log(&format!("tags: {}", merged.join(", "))),
            None => log.log("tags: session file not found"),
        }
    }

    fn write_entries(&self, log: &BackgroundLog, summary: &Summary, transcript: &str) {
        let (fm, _) = Frontmatter::split(transcript);
        let base_commit = fm.scalar("base_commit").map(str::to_string);
        let default_files = top_modified(transcript, self.config.default_entry_files);

        let mut written = 0usize;
        for (section, target) in [
            ("Decisions", KnowledgeLog::Decisions),
            ("Mistakes", KnowledgeLog::Mistakes),
        ] {
            for block in summary.blocks(section) {
                let Some(entry) = self.promote(block, &base_commit, &default_files) else {
                    continue;
                };
                if knowledge::append_entry(self.repo, target, &entry).is_ok() {
                    written += 1;
                }
            }
        }
        log.log(&format!("knowledge: {} entries written", written));
    }

    /// Promote an extracted block to a full entry, or drop it as junk.
    fn promote(
        &self,
        block: ExtractedBlock,
        base_commit: &Option<String>,
        default_files: &[String],
    ) -> Option<KnowledgeEntry> {
        if is_junk_title(&block.title) {
            return None;
        }
        let mut entry = KnowledgeEntry::new(redact_deep(&block.title));
        entry.description = redact_deep(&block.description);
        entry.session_id = Some(self.session_id.clone());
        entry.commit = base_commit.clone();
        entry.files = if block.files.is_empty() {
            default_files.to_vec()
        } else {
            block.files
        };
        entry.area = derive_area(&entry.files);
        entry.date = id::session_date(&self.session_id);
        entry.tried = block.tried;
        entry.rule = block.rule;
        Some(entry)
    }

    fn auto_mistakes(&self, log: &BackgroundLog, transcript: &str) {
        for (file, passes) in comod::correction_counts(transcript) {
            if passes < 2 {
                continue;
            }
            let mut entry = KnowledgeEntry::new(format!("Repeated correction passes on {}", file));
            entry.description = format!(
                "{} was modified in {} consecutive turn pairs; the first approach did not hold.",
                file,
                passes + 1
            );
            entry.session_id = Some(self.session_id.clone());
            entry.files = vec![file.clone()];
            entry.area = derive_area(&entry.files);
            entry.date = id::session_date(&self.session_id);
            if knowledge::append_entry(self.repo, KnowledgeLog::Mistakes, &entry).is_ok() {
                log.log(&format!("auto-mistake: {} ({} passes)", file, passes));
            }
        }
    }

    fn deep_redact(&self, log: &BackgroundLog) {
        let Ok(content) = std::fs::read_to_string(&self.transcript) else {
            log.log("redact: transcript unreadable");
            return;
        };
        let redacted = redact_deep(&content);
        if redacted != content {
            match std::fs::write(&self.transcript, &redacted) {
                Ok(()) => log.log("redact: secrets masked"),
                Err(err) => log.log(&format!("redact: write failed: {}", err)),
            }
        } else {
            log.log("redact: clean");
        }
    }

    async fn attach_note(&self, log: &BackgroundLog) {
        let Some(git) = self.git else {
            log.log("note: no repository");
            return;
        };
        let Some(head) = git.head_commit().await else {
            log.log("note: no HEAD");
            return;
        };
        if git.add_note_from_file(NOTES_REF, &head, &self.transcript).await {
            log.log(&format!("note: attached to {}", &head[..head.len().min(12)]));
        } else {
            log.log("note: attach failed");
        }
    }

    async fn index(&self, log: &BackgroundLog) {
        let collection = collection_for(self.repo);
        let dir = paths::completed_dir(self.repo);
        match self.search.index(&collection, &dir).await {
            Ok(()) => log.log(&format!("index: {}", collection)),
            Err(err) => log.log(&format!("index: {}", err)),
        }
    }

    async fn sync(&self, log: &BackgroundLog) {
        let Some(git) = self.git else {
            log.log("sync: no repository");
            return;
        };
        match crate::sync::push_shared(self.repo, git).await {
            Ok(pushed) => log.log(&format!("sync: {}", pushed)),
            Err(err) => log.log(&format!("sync: {}", err)),
        }
    }
}

/// The most-modified paths in a transcript, most hits first, capped at
/// `limit`. Ties keep first-seen order.
fn top_modified(transcript: &str, limit: usize) -> Vec<String> {
    let mut counts: HashMap<String, (usize, usize)> = HashMap::new();
    for (order, line) in transcript.lines().enumerate() {
        if let Some(path) = line.strip_prefix("- Modified: ") {
            let path = path.trim();
            if path.is_empty() {
                continue;
            }
            let slot = counts.entry(path.to_string()).or_insert((0, order));
            slot.0 += 1;
        }
    }
    let mut ranked: Vec<(String, (usize, usize))> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1 .0.cmp(&a.1 .0).then(a.1 .1.cmp(&b.1 .1)));
    ranked.into_iter().take(limit).map(|(p, _)| p).collect()
}

#[cfg(test)]
#[path = "finalize_tests.rs"]
mod tests;
