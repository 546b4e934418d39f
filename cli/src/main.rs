//! Warden CLI - hook binary entry point.
//!
//! One binary, one subcommand per hook event. Each invocation is a
//! short-lived process that reads a single JSON event from stdin and
//! answers through the process protocol:
//!
//! - exit 0 - allow / nothing to report
//! - exit 2 with a reason on stderr - deny
//! - structured JSON on stdout - ask-escalations, advisories, hints
//!
//! stdout and stderr belong to that protocol, so tracing writes to a log
//! file only; when no log file can be opened we prefer no logs over
//! corrupting the streams.

mod hooks;
mod stop_hint;

use std::fs::{self, OpenOptions};
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Mutex;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(
    name = "warden",
    version,
    about = "Policy gate and formatting hooks for autonomous coding agents"
)]
struct Cli {
    #[command(subcommand)]
    hook: Hook,
}

#[derive(Subcommand)]
enum Hook {
    /// Gate a proposed tool invocation before the host executes it.
    PreToolUse,
    /// Run the formatting toolchain for a just-modified file.
    PostToolUse,
    /// Screen the user prompt and prepend the rules banner.
    UserPromptSubmit,
    /// Suggest the next workflow step at end of turn.
    StopHint,
}

fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let mut input = String::new();
    if let Err(err) = std::io::stdin().read_to_string(&mut input) {
        return match cli.hook {
            // Without an event there is nothing safe to decide on.
            Hook::PreToolUse | Hook::UserPromptSubmit => {
                eprintln!("blocked: could not read hook event: {err}");
                hooks::exit_deny()
            }
            Hook::PostToolUse | Hook::StopHint => {
                tracing::warn!("could not read hook event: {err}");
                ExitCode::SUCCESS
            }
        };
    }

    match cli.hook {
        Hook::PreToolUse => hooks::pre_tool_use(&input),
        Hook::PostToolUse => hooks::post_tool_use(&input),
        Hook::UserPromptSubmit => hooks::user_prompt_submit(&input),
        Hook::StopHint => stop_hint::run(&input),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if let Some((path, file)) = open_log_file() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();
        tracing::debug!(path = %path.display(), "logging initialized");
        return;
    }

    // No writable log location: a registry with no output layer drops
    // everything, which is what we want here.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> Option<(PathBuf, std::fs::File)> {
    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && fs::create_dir_all(parent).is_err()
        {
            continue;
        }
        if let Ok(file) = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            return Some((candidate, file));
        }
    }
    None
}

fn log_file_candidates() -> Vec<PathBuf> {
    // Primary: project-local, next to the session state.
    let mut candidates = vec![PathBuf::from(".warden").join("logs").join("warden.log")];

    // Fallback: home directory (useful when the project tree is read-only).
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".warden").join("logs").join("warden.log"));
    }

    candidates
}
