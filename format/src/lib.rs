//! Post-write formatting dispatch.
//!
//! Given the path of a file the agent just modified, pick a per-language
//! toolchain by extension and run its steps. Missing external tools are
//! advisories, not failures; a failing formatter or linter is surfaced
//! through its relayed output and never aborts the dispatch.

mod toolchains;

use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use warden_session::HintCache;

pub use toolchains::Toolchain;

/// Run the toolchain for `path`, stage the result for visibility, and
/// print a completion marker. A path that no longer exists is a no-op.
pub fn dispatch(path: &Path, hints: &mut HintCache) {
    if !path.exists() {
        return;
    }
    if let Some(toolchain) = Toolchain::for_path(path) {
        toolchain.run(path, hints);
    }
    stage_for_visibility();
    println!("[format] done: {}", path.display());
}

/// Intent-to-add so new files show up in the diff stat, then the stat
/// itself. Visibility only - nothing is committed, and a missing git
/// repository is silently fine.
fn stage_for_visibility() {
    let _ = Command::new("git")
        .args(["add", "-N", "."])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    if let Ok(output) = Command::new("git")
        .args(["diff", "--shortstat"])
        .stderr(Stdio::null())
        .output()
        && !output.stdout.is_empty()
    {
        let _ = io::stdout().write_all(&output.stdout);
    }
}
