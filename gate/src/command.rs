//! Shell command inspection for the destructive-removal rule.
//!
//! Detection is token-based rather than a single regex so that flag order,
//! clustering (`-rf`, `-fr`, `-r -f`), and quoting all land in the same
//! place. Quoting the tokenizer cannot resolve is treated as hostile:
//! a command that mentions `rm` but fails to tokenize is not allowed
//! through.

/// What a scan of one command found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalScan {
    /// No forced recursive removal in the command.
    Absent,
    /// Forced recursive removal present; every target is confined to the
    /// scratch prefix and free of parent-directory traversal.
    Confined,
    /// Forced recursive removal present with at least one target outside
    /// the scratch prefix (or no targets at all).
    Unconfined,
    /// The command mentions `rm` but could not be tokenized.
    Ambiguous,
}

/// Scan `command` for `rm` invocations carrying both a recursive and a
/// force flag, and check their targets against `scratch_prefix`.
#[must_use]
pub fn scan_forced_removal(command: &str, scratch_prefix: &str) -> RemovalScan {
    let Some(tokens) = shlex::split(command) else {
        return if command.split_whitespace().any(is_rm_word) {
            RemovalScan::Ambiguous
        } else {
            RemovalScan::Absent
        };
    };

    let mut found = false;
    let mut confined = true;
    for segment in tokens.split(|token| is_separator(token)) {
        let Some(invocation) = parse_rm(segment) else {
            continue;
        };
        if !(invocation.recursive && invocation.force) {
            continue;
        }
        found = true;
        if invocation.targets.is_empty()
            || !invocation
                .targets
                .iter()
                .all(|target| confined_to(target, scratch_prefix))
        {
            confined = false;
        }
    }

    match (found, confined) {
        (false, _) => RemovalScan::Absent,
        (true, true) => RemovalScan::Confined,
        (true, false) => RemovalScan::Unconfined,
    }
}

fn is_separator(token: &str) -> bool {
    matches!(token, "&&" | "||" | ";" | "|" | "&")
}

fn is_rm_word(token: &str) -> bool {
    token == "rm" || token.ends_with("/rm")
}

#[derive(Debug)]
struct RmInvocation {
    recursive: bool,
    force: bool,
    targets: Vec<String>,
}

/// Parse the first `rm` invocation in a separator-free token segment.
fn parse_rm(segment: &[String]) -> Option<RmInvocation> {
    let start = segment.iter().position(|token| is_rm_word(token))?;
    let mut recursive = false;
    let mut force = false;
    let mut targets = Vec::new();
    let mut options_done = false;

    for token in &segment[start + 1..] {
        if !options_done && token == "--" {
            options_done = true;
        } else if !options_done && token.starts_with("--") {
            match token.as_str() {
                "--recursive" => recursive = true,
                "--force" => force = true,
                _ => {}
            }
        } else if !options_done && token.starts_with('-') && token.len() > 1 {
            recursive |= token.chars().any(|c| matches!(c, 'r' | 'R'));
            force |= token.contains('f');
        } else {
            targets.push(token.clone());
        }
    }

    Some(RmInvocation {
        recursive,
        force,
        targets,
    })
}

fn confined_to(target: &str, scratch_prefix: &str) -> bool {
    target.starts_with(scratch_prefix) && !target.contains("..")
}
