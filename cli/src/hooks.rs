//! Hook handlers: event parsing, gate evaluation, protocol output.

use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use warden_config::{EditGateMode, PolicyConfig};
use warden_gate::prompt::{PromptScreen, rules_banner};
use warden_gate::{RuleCtx, evaluate};
use warden_session::{Session, plan};
use warden_types::{Decision, HookPayload, ToolEvent};

/// Exit status the host reads as a denial.
pub(crate) fn exit_deny() -> ExitCode {
    ExitCode::from(2)
}

fn parse_event(input: &str) -> anyhow::Result<HookPayload> {
    serde_json::from_str(input).context("malformed hook event")
}

/// The pre-action policy gate.
pub(crate) fn pre_tool_use(input: &str) -> ExitCode {
    // Fail safe: an event we cannot parse is an event we do not allow.
    let payload = match parse_event(input) {
        Ok(payload) => payload,
        Err(err) => {
            eprintln!("blocked: {err:#}");
            return exit_deny();
        }
    };

    let root = Path::new(".");
    let config = match PolicyConfig::load(root) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("blocked: {err}");
            return exit_deny();
        }
    };

    let session = Session::at(root);
    let flags = session.flags();
    let event = ToolEvent::from_payload(&payload);
    let plan_fresh = config.edit_gate == EditGateMode::PlanFresh
        && plan::any_fresh_plan(&root.join(&config.plan_dir), config.plan_window());

    let decision = evaluate(&RuleCtx {
        event: &event,
        flags: &flags,
        config: &config,
        plan_fresh,
    });
    respond(&payload.tool_name, decision)
}

fn respond(tool_name: &str, decision: Decision) -> ExitCode {
    match decision {
        Decision::Allow => ExitCode::SUCCESS,
        Decision::Ask { reason } => {
            tracing::info!(tool = tool_name, %reason, "escalating to ask");
            println!("{}", ask_output(&reason));
            ExitCode::SUCCESS
        }
        Decision::Deny { reason } => {
            tracing::info!(tool = tool_name, %reason, "denied");
            eprintln!("blocked: {reason}");
            exit_deny()
        }
    }
}

/// Structured confirmation request understood by the host. Escalation is
/// carried on stdout, not through the exit status.
fn ask_output(reason: &str) -> String {
    serde_json::json!({
        "hookSpecificOutput": {
            "hookEventName": "PreToolUse",
            "permissionDecision": "ask",
            "permissionDecisionReason": reason,
        }
    })
    .to_string()
}

/// The post-action formatting dispatcher. Advisory-only: a malformed
/// event or missing path means there is nothing to do, never a failure.
pub(crate) fn post_tool_use(input: &str) -> ExitCode {
    let payload = match parse_event(input) {
        Ok(payload) => payload,
        Err(err) => {
            tracing::warn!("{err:#}");
            return ExitCode::SUCCESS;
        }
    };
    let Some(file_path) = payload.tool_input.file_path else {
        return ExitCode::SUCCESS;
    };

    let session = Session::at(Path::new("."));
    let mut hints = session.hint_cache();
    warden_format::dispatch(Path::new(&file_path), &mut hints);
    ExitCode::SUCCESS
}

/// Prompt screening plus the golden-rules banner.
pub(crate) fn user_prompt_submit(input: &str) -> ExitCode {
    let payload = match parse_event(input) {
        Ok(payload) => payload,
        Err(err) => {
            eprintln!("blocked: {err:#}");
            return exit_deny();
        }
    };
    let screen = match PromptScreen::new() {
        Ok(screen) => screen,
        Err(err) => {
            eprintln!("blocked: prompt screen unavailable: {err}");
            return exit_deny();
        }
    };

    let prompt = payload.prompt.unwrap_or_default();
    if let Some(reason) = screen.screen(&prompt) {
        eprintln!("blocked: {reason}");
        return exit_deny();
    }

    println!("{}", rules_banner(&chrono::Local::now()));
    ExitCode::SUCCESS
}

#[cfg(test)]
mod tests {
    use super::ask_output;

    #[test]
    fn ask_output_is_a_permission_decision() {
        let raw = ask_output("reading sensitive path .env");
        let parsed: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
        let output = &parsed["hookSpecificOutput"];
        assert_eq!(output["hookEventName"], "PreToolUse");
        assert_eq!(output["permissionDecision"], "ask");
        assert_eq!(
            output["permissionDecisionReason"],
            "reading sensitive path .env"
        );
    }
}
