//! The policy gate: an ordered rule list folded over one tool event.
//!
//! The gate is stateless across invocations; everything it consults is
//! loaded fresh into a [`RuleCtx`] by the caller. Rules are plain function
//! values sharing one shape - look at the event, either take a position or
//! abstain - and the gate stops at the first position taken. Precedence is
//! therefore exactly the order of [`RULES`].

pub mod command;
pub mod prompt;
mod rules;

use warden_config::PolicyConfig;
use warden_session::CapabilityFlags;
use warden_types::{Decision, ToolEvent};

/// Everything a rule may consult for one invocation.
#[derive(Debug)]
pub struct RuleCtx<'a> {
    pub event: &'a ToolEvent,
    /// Capability flags, loaded fresh for this invocation.
    pub flags: &'a CapabilityFlags,
    pub config: &'a PolicyConfig,
    /// Whether a fresh plan artifact exists. Computed once by the caller;
    /// only consulted in plan-fresh edit mode.
    pub plan_fresh: bool,
}

/// A rule either returns a concrete decision or abstains with `None`.
pub type Rule = fn(&RuleCtx<'_>) -> Option<Decision>;

/// The fixed rule order. First concrete decision wins.
const RULES: &[Rule] = &[
    rules::scoped_path_bypass,
    rules::edit_authorization,
    rules::sensitive_path,
    rules::destructive_removal,
    rules::human_only_operations,
    rules::deploy_guards,
];

/// Evaluate one event against the rule list, defaulting to allow when no
/// rule takes a position.
#[must_use]
pub fn evaluate(ctx: &RuleCtx<'_>) -> Decision {
    RULES
        .iter()
        .find_map(|rule| rule(ctx))
        .unwrap_or(Decision::Allow)
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use warden_config::{CommitGateMode, EditGateMode, PolicyConfig};
    use warden_session::CapabilityFlags;
    use warden_types::{Decision, ToolAction, ToolEvent};

    use super::{RuleCtx, evaluate};

    struct Harness {
        flags: CapabilityFlags,
        config: PolicyConfig,
        plan_fresh: bool,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                flags: CapabilityFlags::default(),
                config: PolicyConfig::default(),
                plan_fresh: false,
            }
        }

        fn with_flags(session_dir: &Path) -> Self {
            Self {
                flags: CapabilityFlags::load(session_dir),
                config: PolicyConfig::default(),
                plan_fresh: false,
            }
        }

        fn decide(&self, event: &ToolEvent) -> Decision {
            evaluate(&RuleCtx {
                event,
                flags: &self.flags,
                config: &self.config,
                plan_fresh: self.plan_fresh,
            })
        }
    }

    fn edit(path: &str) -> ToolEvent {
        ToolEvent {
            action: ToolAction::Mutate,
            path: Some(path.to_string()),
            command: None,
        }
    }

    fn read(path: &str) -> ToolEvent {
        ToolEvent {
            action: ToolAction::Read,
            path: Some(path.to_string()),
            command: None,
        }
    }

    fn shell(command: &str) -> ToolEvent {
        ToolEvent {
            action: ToolAction::Shell,
            path: None,
            command: Some(command.to_string()),
        }
    }

    fn granted(dir: &Path, markers: &[&str]) {
        for marker in markers {
            fs::write(dir.join(marker), "").expect("touch flag");
        }
    }

    #[test]
    fn documentation_paths_bypass_every_other_rule() {
        let harness = Harness::new();
        // Even a sensitive basename under docs/ is allowed: the bypass
        // short-circuits before the sensitive-path guard.
        assert_eq!(harness.decide(&edit("docs/notes.md")), Decision::Allow);
        assert_eq!(harness.decide(&edit("docs/.env.production")), Decision::Allow);
        assert_eq!(harness.decide(&edit(".warden/config.toml")), Decision::Allow);
    }

    #[test]
    fn unapproved_edits_are_denied_in_flags_mode() {
        let harness = Harness::new();
        let decision = harness.decide(&edit("src/main.rs"));
        assert!(decision.is_deny());
        assert!(decision.reason().unwrap().contains("ALLOW_EDITS"));
    }

    #[test]
    fn fast_mode_authorizes_edits() {
        let dir = tempfile::tempdir().expect("tempdir");
        granted(dir.path(), &["FAST_MODE"]);
        let harness = Harness::with_flags(dir.path());

        assert_eq!(harness.decide(&edit("src/main.rs")), Decision::Allow);
    }

    #[test]
    fn plan_fresh_mode_asks_instead_of_denying() {
        let mut harness = Harness::new();
        harness.config.edit_gate = EditGateMode::PlanFresh;

        assert!(matches!(
            harness.decide(&edit("src/main.rs")),
            Decision::Ask { .. }
        ));

        harness.plan_fresh = true;
        assert_eq!(harness.decide(&edit("src/main.rs")), Decision::Allow);
    }

    #[test]
    fn sensitive_writes_deny_even_when_authorized() {
        let dir = tempfile::tempdir().expect("tempdir");
        granted(dir.path(), &["FAST_MODE"]);
        let harness = Harness::with_flags(dir.path());

        let decision = harness.decide(&edit(".env.production"));
        assert!(decision.is_deny());
        assert!(decision.reason().unwrap().contains(".env.production"));
    }

    #[test]
    fn sensitive_reads_escalate_to_ask() {
        let harness = Harness::new();
        assert!(matches!(
            harness.decide(&read(".env.production")),
            Decision::Ask { .. }
        ));
    }

    #[test]
    fn forced_removal_outside_scratch_is_denied() {
        let harness = Harness::new();
        assert!(harness.decide(&shell("rm -rf /etc")).is_deny());
        assert!(harness.decide(&shell("rm -rf trees/../etc")).is_deny());
        assert_eq!(harness.decide(&shell("rm -rf trees/build")), Decision::Allow);
    }

    #[test]
    fn git_push_is_denied_anywhere_in_the_command() {
        let harness = Harness::new();
        assert!(harness.decide(&shell("git add . && git push")).is_deny());
        assert!(harness.decide(&shell("GIT PUSH origin main")).is_deny());
        assert!(harness.decide(&shell("gh pr create --fill")).is_deny());
        assert_eq!(harness.decide(&shell("git status")), Decision::Allow);
    }

    #[test]
    fn commits_flag_unlocks_human_only_operations() {
        let dir = tempfile::tempdir().expect("tempdir");
        granted(dir.path(), &["ALLOW_COMMITS"]);
        let harness = Harness::with_flags(dir.path());

        assert_eq!(
            harness.decide(&shell("git commit -m 'chore: tidy'")),
            Decision::Allow
        );
    }

    #[test]
    fn strict_commit_mode_ignores_flags() {
        let dir = tempfile::tempdir().expect("tempdir");
        granted(dir.path(), &["ALLOW_COMMITS", "FAST_MODE"]);
        let mut harness = Harness::with_flags(dir.path());
        harness.config.commit_gate = CommitGateMode::Strict;

        assert!(harness.decide(&shell("git commit -m x")).is_deny());
    }

    #[test]
    fn deploy_guards_require_their_specific_flag() {
        let harness = Harness::new();
        let decision = harness.decide(&shell("wrangler deploy --env production"));
        assert!(decision.is_deny());
        assert!(decision.reason().unwrap().contains("ALLOW_PROD_DEPLOY"));

        assert!(harness.decide(&shell("supabase db reset")).is_deny());
        assert!(harness.decide(&shell("npx trigger.dev deploy")).is_deny());
        assert!(harness.decide(&shell("flutter build ipa")).is_deny());
    }

    #[test]
    fn deploy_guard_clears_with_flag_present() {
        let dir = tempfile::tempdir().expect("tempdir");
        granted(dir.path(), &["ALLOW_PROD_DEPLOY"]);
        let harness = Harness::with_flags(dir.path());

        assert_eq!(
            harness.decide(&shell("wrangler deploy --env production")),
            Decision::Allow
        );
        // The other guards are independent of the one that was granted.
        assert!(harness.decide(&shell("supabase db push")).is_deny());
    }

    #[test]
    fn unmatched_events_default_to_allow() {
        let harness = Harness::new();
        assert_eq!(harness.decide(&shell("cargo test")), Decision::Allow);
        assert_eq!(
            harness.decide(&ToolEvent {
                action: ToolAction::Other,
                path: None,
                command: None,
            }),
            Decision::Allow
        );
    }
}
