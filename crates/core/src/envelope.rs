// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Hook envelope: the JSON object the hosting agent writes to a hook's
//! standard input.
//!
//! The envelope's shape varies by event; this models the union of the
//! fields any handler consumes and silently discards the rest. Parsing is
//! lenient by contract: a hook must never fail because the host added a
//! field.

use serde::Deserialize;

/// Union of hook stdin fields across all events.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HookEnvelope {
    /// External (host agent) session id.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Working directory the host agent runs in.
    #[serde(default)]
    pub cwd: Option<String>,
    /// User prompt text (UserPromptSubmit only).
    #[serde(default)]
    pub prompt: Option<String>,
    /// Tool name (PostToolUse only).
    #[serde(default)]
    pub tool_name: Option<String>,
    /// Tool input (PostToolUse only).
    #[serde(default)]
    pub tool_input: Option<ToolInput>,
}

/// The slice of `tool_input` the capture pipeline consumes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolInput {
    /// Target path for Write/Edit tools.
    #[serde(default)]
    pub file_path: Option<String>,
    /// Task description for the Task tool.
    #[serde(default)]
    pub description: Option<String>,
}

impl HookEnvelope {
    /// Parse an envelope, degrading to the empty envelope on malformed
    /// input. Hooks treat missing fields as "nothing to record".
    pub fn parse(raw: &str) -> Self {
        serde_json::from_str(raw).unwrap_or_default()
    }

    /// True when the tool use names a file-writing tool.
    pub fn is_write_tool(&self) -> bool {
        matches!(
            self.tool_name.as_deref(),
            Some("Write") | Some("Edit") | Some("MultiEdit") | Some("NotebookEdit")
        )
    }

    /// True when the tool use names the Task tool.
    pub fn is_task_tool(&self) -> bool {
        self.tool_name.as_deref() == Some("Task")
    }
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
