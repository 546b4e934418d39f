//! End-of-turn workflow nudge.
//!
//! Reads the transcript JSONL, finds the last user message, and suggests
//! the next step of the prime/plan/execute/review cycle as a structured
//! system message. Everything here is best-effort: unreadable transcripts
//! and unparseable lines are skipped, never fatal.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::process::ExitCode;

use warden_types::HookPayload;

pub(crate) fn run(input: &str) -> ExitCode {
    let Ok(payload) = serde_json::from_str::<HookPayload>(input) else {
        return ExitCode::SUCCESS;
    };
    let Some(transcript) = payload.transcript_path else {
        return ExitCode::SUCCESS;
    };

    let last_user = last_user_text(Path::new(&transcript));
    if let Some(message) = next_step_hint(&last_user) {
        println!("{}", serde_json::json!({ "systemMessage": message }));
    }
    ExitCode::SUCCESS
}

/// Last user message text in the transcript. String content is taken
/// as-is; block content concatenates its text blocks.
fn last_user_text(path: &Path) -> String {
    let Ok(file) = File::open(path) else {
        return String::new();
    };
    let mut last = String::new();
    for line in BufReader::new(file).lines() {
        let Ok(line) = line else { break };
        let Ok(record) = serde_json::from_str::<serde_json::Value>(&line) else {
            continue;
        };
        let message = &record["message"];
        if message["role"].as_str() != Some("user") {
            continue;
        }
        match &message["content"] {
            serde_json::Value::String(text) => last.clone_from(text),
            serde_json::Value::Array(blocks) => {
                let pieces: Vec<&str> = blocks
                    .iter()
                    .filter(|block| block["type"].as_str() == Some("text"))
                    .filter_map(|block| block["text"].as_str())
                    .collect();
                if !pieces.is_empty() {
                    last = pieces.join("\n");
                }
            }
            _ => {}
        }
    }
    last.trim().to_string()
}

/// Map the first line of the last user message to the next suggested
/// workflow step.
fn next_step_hint(text: &str) -> Option<&'static str> {
    let first = text.lines().next()?.trim();
    if first.starts_with("/prime") {
        Some("Next: /plan \"<key>\" to map & plan, or /execute \"<key>\" if a plan exists.")
    } else if first.starts_with("/plan") {
        Some("Next: /execute \"<key>\" - tests first, smallest viable diff.")
    } else if first.starts_with("/execute") {
        Some("Next: /review \"<key>\" - aim APPROVE; then /prepare-commit.")
    } else if first.starts_with("/review") {
        Some("Next: /prepare-commit - human reviews & commits.")
    } else if first.starts_with("/prepare-commit") {
        Some("Reminder: human commits; keep diffs tight and messages clear.")
    } else {
        None
    }
}
