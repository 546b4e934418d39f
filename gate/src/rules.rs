//! The ordered rule set.
//!
//! Each rule is a plain function from [`RuleCtx`] to an optional
//! [`Decision`]: `None` means the rule has no opinion and evaluation
//! continues. Order matters - an earlier denial is never revisited by a
//! later rule - and is fixed in [`crate::RULES`].

use std::ffi::OsStr;
use std::path::Path;

use warden_config::{CommitGateMode, EditGateMode};
use warden_session::Capability;
use warden_types::{Decision, ToolAction};

use crate::RuleCtx;
use crate::command::{RemovalScan, scan_forced_removal};

/// Rule 1: edits under an always-allowed prefix (documentation, the agent
/// configuration tree) proceed unconditionally, so operational
/// self-configuration is never blocked by the rules below.
pub(crate) fn scoped_path_bypass(ctx: &RuleCtx<'_>) -> Option<Decision> {
    if ctx.event.action != ToolAction::Mutate {
        return None;
    }
    let path = ctx.event.path.as_deref()?;
    ctx.config
        .bypass_prefixes
        .iter()
        .any(|prefix| path.starts_with(prefix.as_str()))
        .then_some(Decision::Allow)
}

/// Rule 2: edits outside the bypass prefixes need authorization. When
/// authorized the rule abstains so the sensitive-path guard still applies.
pub(crate) fn edit_authorization(ctx: &RuleCtx<'_>) -> Option<Decision> {
    if ctx.event.action != ToolAction::Mutate {
        return None;
    }
    let flag_authorized = ctx.flags.fast_mode || ctx.flags.edits_approved;
    match ctx.config.edit_gate {
        EditGateMode::Flags if !flag_authorized => Some(Decision::deny(
            "edits blocked: grant ALLOW_EDITS or enable FAST_MODE",
        )),
        EditGateMode::PlanFresh if !(flag_authorized || ctx.plan_fresh) => Some(Decision::ask(
            "no approval flag and no fresh plan artifact for this edit",
        )),
        _ => None,
    }
}

/// Basenames that are never written by the agent: credentials, lockfiles,
/// host keys, and cloud service-account material.
const SENSITIVE_BASENAMES: &[&str] = &[
    ".env",
    ".env.local",
    ".env.production",
    ".env.development",
    "package-lock.json",
    "pnpm-lock.yaml",
    "yarn.lock",
    "id_rsa",
    "id_ed25519",
    "known_hosts",
    "serviceAccountKey.json",
    "GoogleService-Info.plist",
    "google-services.json",
];

/// Directory substrings that mark a path as sensitive wherever they occur.
const SENSITIVE_DIR_SEGMENTS: &[&str] = &["/.git/", "/config/secrets/"];

fn is_sensitive(path: &str) -> bool {
    let base = Path::new(path)
        .file_name()
        .and_then(OsStr::to_str)
        .unwrap_or(path);
    SENSITIVE_BASENAMES.contains(&base)
        || base.starts_with(".env.")
        || SENSITIVE_DIR_SEGMENTS.iter().any(|segment| {
            // Also match the segment at the start of a relative path.
            path.contains(segment) || path.starts_with(segment.trim_start_matches('/'))
        })
}

/// Rule 3: writes to sensitive paths are denied; reads of the same paths
/// are only escalated, since reading is less destructive than writing.
pub(crate) fn sensitive_path(ctx: &RuleCtx<'_>) -> Option<Decision> {
    let path = ctx.event.path.as_deref()?;
    if !is_sensitive(path) {
        return None;
    }
    match ctx.event.action {
        ToolAction::Mutate => Some(Decision::deny(format!(
            "write to sensitive path blocked: {path}"
        ))),
        ToolAction::Read => Some(Decision::ask(format!(
            "reading sensitive path {path}; confirm first"
        ))),
        ToolAction::Shell | ToolAction::Other => None,
    }
}

/// Rule 4: forced recursive removal is permitted only when every target is
/// confined to the scratch tree.
pub(crate) fn destructive_removal(ctx: &RuleCtx<'_>) -> Option<Decision> {
    if ctx.event.action != ToolAction::Shell {
        return None;
    }
    let command = ctx.event.command.as_deref()?;
    let scratch = &ctx.config.scratch_prefix;
    match scan_forced_removal(command, scratch) {
        RemovalScan::Absent | RemovalScan::Confined => None,
        RemovalScan::Unconfined => Some(Decision::deny(format!(
            "rm -rf blocked: restrict all targets to {scratch} (no .. traversal)"
        ))),
        RemovalScan::Ambiguous => Some(Decision::deny(
            "rm with unparseable shell quoting blocked",
        )),
    }
}

/// Version-control verbs that stay with the human reviewer.
const HUMAN_ONLY_VERBS: &[&str] = &[
    "git commit",
    "git push",
    "git tag",
    "gh pr create",
    "gh pr merge",
];

/// Rule 5: commits, tags, pushes, and PR creation/merge belong to the
/// human workflow. Matching is case-insensitive and positional-blind, so
/// `git add . && git push` is caught too.
pub(crate) fn human_only_operations(ctx: &RuleCtx<'_>) -> Option<Decision> {
    if ctx.event.action != ToolAction::Shell {
        return None;
    }
    let command = ctx.event.command.as_deref()?.to_ascii_lowercase();
    if !HUMAN_ONLY_VERBS.iter().any(|verb| command.contains(verb)) {
        return None;
    }
    let approved = ctx.flags.fast_mode || ctx.flags.commits_approved;
    if ctx.config.commit_gate == CommitGateMode::Flag && approved {
        return None;
    }
    Some(Decision::deny(
        "commits/tags/PRs are human-only (grant ALLOW_COMMITS or FAST_MODE)",
    ))
}

enum CommandMatch {
    Substring(&'static str),
    Prefixes(&'static [&'static str]),
}

impl CommandMatch {
    fn matches(&self, command: &str) -> bool {
        match self {
            Self::Substring(needle) => command.contains(needle),
            Self::Prefixes(prefixes) => {
                prefixes.iter().any(|prefix| command.starts_with(prefix))
            }
        }
    }
}

struct DeployGuard {
    matcher: CommandMatch,
    capability: Capability,
    what: &'static str,
}

/// Rule 6 table: independent, non-overlapping release gates. Each entry is
/// denied unless its specific approval flag file exists.
const DEPLOY_GUARDS: &[DeployGuard] = &[
    DeployGuard {
        matcher: CommandMatch::Substring("wrangler deploy --env production"),
        capability: Capability::ProdDeploy,
        what: "production deploy",
    },
    DeployGuard {
        matcher: CommandMatch::Prefixes(&["supabase db reset", "supabase db push"]),
        capability: Capability::DbMigrate,
        what: "database migration/reset",
    },
    DeployGuard {
        matcher: CommandMatch::Prefixes(&[
            "npx trigger.dev deploy",
            "npx @trigger.dev/cli deploy",
        ]),
        capability: Capability::TaskDeploy,
        what: "task-queue deploy",
    },
    DeployGuard {
        matcher: CommandMatch::Prefixes(&[
            "fastlane",
            "flutter build ipa",
            "flutter build appbundle",
        ]),
        capability: Capability::MobileRelease,
        what: "mobile release build",
    },
];

/// Rule 6: named deploy/release guards.
pub(crate) fn deploy_guards(ctx: &RuleCtx<'_>) -> Option<Decision> {
    if ctx.event.action != ToolAction::Shell {
        return None;
    }
    let command = ctx.event.command.as_deref()?;
    for guard in DEPLOY_GUARDS {
        if guard.matcher.matches(command) && !ctx.flags.has(guard.capability) {
            return Some(Decision::deny(format!(
                "{} blocked: create {} to approve",
                guard.what,
                guard.capability.marker()
            )));
        }
    }
    None
}
