//! Hook event payloads and their normalized form.

use serde::Deserialize;

/// Raw hook payload as emitted by the host runtime on stdin.
///
/// Hosts send different field subsets per hook kind (tool events carry
/// `tool_name`/`tool_input`, prompt events carry `prompt`, stop events
/// carry `transcript_path`), so every field is optional-with-default and
/// unknown fields are ignored.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct HookPayload {
    #[serde(default)]
    pub tool_name: String,
    #[serde(default)]
    pub tool_input: ToolInput,
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub transcript_path: Option<String>,
}

/// The `tool_input` object of a tool-invocation payload.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct ToolInput {
    #[serde(default)]
    pub command: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
}

/// Action class the gate reasons about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolAction {
    /// Edit, Write, or MultiEdit - mutates a file in place.
    Mutate,
    /// Read - non-destructive file access.
    Read,
    /// Shell command execution.
    Shell,
    /// Any other tool; the gate has no opinion on these.
    Other,
}

impl ToolAction {
    /// Classify a host tool name.
    ///
    /// Some hosts report shell invocations as a parameterized name like
    /// `Bash(git status)`, so a `Bash(` prefix counts as shell too.
    #[must_use]
    pub fn from_tool_name(name: &str) -> Self {
        match name {
            "Edit" | "Write" | "MultiEdit" => Self::Mutate,
            "Read" => Self::Read,
            "Bash" => Self::Shell,
            other if other.starts_with("Bash(") => Self::Shell,
            _ => Self::Other,
        }
    }
}

/// One tool invocation, normalized from the host payload.
///
/// Constructed once per gate invocation and never persisted.
#[derive(Debug, Clone)]
pub struct ToolEvent {
    pub action: ToolAction,
    /// Target path for file-oriented tools, as the host spelled it.
    pub path: Option<String>,
    /// Full command text for shell-oriented tools.
    pub command: Option<String>,
}

impl ToolEvent {
    #[must_use]
    pub fn from_payload(payload: &HookPayload) -> Self {
        Self {
            action: ToolAction::from_tool_name(&payload.tool_name),
            path: payload.tool_input.file_path.clone(),
            command: payload.tool_input.command.clone(),
        }
    }
}
