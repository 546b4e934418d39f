//! Policy configuration loading.
//!
//! Raw TOML deserialization structs (with `Option` fields) stay private
//! here; [`PolicyConfig::load`] resolves them into the public, fully
//! defaulted [`PolicyConfig`] at the parse boundary. A missing config file
//! yields the defaults; an unreadable or malformed file is a hard error so
//! the gate can fail safe instead of guessing at policy.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Config file location, relative to the project root.
pub const CONFIG_FILE: &str = ".warden/config.toml";

/// How the edit-authorization rule treats an unauthorized edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EditGateMode {
    /// Require an explicit flag; deny without one.
    #[default]
    Flags,
    /// Accept a fresh plan artifact as authorization; escalate to ask
    /// (rather than deny) when nothing authorizes the edit.
    PlanFresh,
}

/// How the human-only operations rule treats commit/tag/push/PR commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CommitGateMode {
    /// Deny unless fast mode or the commits flag is granted.
    #[default]
    Flag,
    /// Deny unconditionally; these operations stay with the human.
    Strict,
}

/// Resolved policy configuration, one value per knob, no `Option`s.
#[derive(Debug, Clone)]
pub struct PolicyConfig {
    pub edit_gate: EditGateMode,
    pub commit_gate: CommitGateMode,
    /// Path prefixes whose edits bypass the gate entirely.
    pub bypass_prefixes: Vec<String>,
    /// Directory holding plan artifacts, relative to the project root.
    pub plan_dir: PathBuf,
    pub plan_fresh_hours: u64,
    /// Prefix confining forced recursive removals.
    pub scratch_prefix: String,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            edit_gate: EditGateMode::default(),
            commit_gate: CommitGateMode::default(),
            bypass_prefixes: vec![
                "docs/".to_string(),
                ".claude/".to_string(),
                ".warden/".to_string(),
            ],
            plan_dir: PathBuf::from("specs"),
            plan_fresh_hours: 48,
            scratch_prefix: "trees/".to_string(),
        }
    }
}

impl PolicyConfig {
    /// The trailing window within which a plan artifact counts as fresh.
    #[must_use]
    pub fn plan_window(&self) -> Duration {
        Duration::from_secs(self.plan_fresh_hours * 3600)
    }

    /// Load `<root>/.warden/config.toml`, resolving against defaults.
    /// A missing file is fine; a broken one is not.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let parsed: RawConfig =
            toml::from_str(&raw).map_err(|source| ConfigError::Parse { path, source })?;
        Ok(parsed.resolve())
    }
}

/// Errors surfaced while loading the config file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct RawConfig {
    edits: Option<RawEdits>,
    commits: Option<RawCommits>,
    scratch: Option<RawScratch>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct RawEdits {
    mode: Option<EditGateMode>,
    bypass_prefixes: Option<Vec<String>>,
    plan_dir: Option<PathBuf>,
    plan_fresh_hours: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct RawCommits {
    mode: Option<CommitGateMode>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct RawScratch {
    prefix: Option<String>,
}

impl RawConfig {
    fn resolve(self) -> PolicyConfig {
        let defaults = PolicyConfig::default();
        let edits = self.edits.unwrap_or_default();
        let commits = self.commits.unwrap_or_default();
        let scratch = self.scratch.unwrap_or_default();
        PolicyConfig {
            edit_gate: edits.mode.unwrap_or(defaults.edit_gate),
            commit_gate: commits.mode.unwrap_or(defaults.commit_gate),
            bypass_prefixes: edits.bypass_prefixes.unwrap_or(defaults.bypass_prefixes),
            plan_dir: edits.plan_dir.unwrap_or(defaults.plan_dir),
            plan_fresh_hours: edits.plan_fresh_hours.unwrap_or(defaults.plan_fresh_hours),
            scratch_prefix: scratch.prefix.unwrap_or(defaults.scratch_prefix),
        }
    }
}
