//! Prompt-level screening, run before the agent ever sees the turn.
//!
//! Two jobs: block prompts that embed obviously dangerous shell patterns,
//! and stamp clean prompts with a one-line golden-rules banner.

use chrono::{DateTime, Local};
use regex::RegexSet;

/// Patterns with no legitimate place in a task prompt.
const DANGEROUS_PROMPT_PATTERNS: &[&str] = &[
    // Root-anchored forced removal.
    r"(?i)rm\s+-rf\s+/",
    // Piping a fetched script straight into a shell.
    r"(?i)curl\s+[^|]+\|\s*sh",
];

/// Compiled screen over the dangerous-prompt patterns.
#[derive(Debug, Clone)]
pub struct PromptScreen {
    set: RegexSet,
}

impl PromptScreen {
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            set: RegexSet::new(DANGEROUS_PROMPT_PATTERNS)?,
        })
    }

    /// Returns a denial reason when the prompt matches a dangerous
    /// pattern, `None` when it is clean.
    #[must_use]
    pub fn screen(&self, prompt: &str) -> Option<String> {
        self.set
            .is_match(prompt)
            .then(|| "dangerous pattern in prompt".to_string())
    }
}

const GOLDEN_RULES: &str = "KISS · YAGNI · Small diffs · Contract tests only · Ask if unsure.";

/// One-line rules banner prepended to each clean prompt.
#[must_use]
pub fn rules_banner(now: &DateTime<Local>) -> String {
    format!("[{}] Rules: {GOLDEN_RULES}", now.format("%Y-%m-%dT%H:%M:%S"))
}
