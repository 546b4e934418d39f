//! Plan artifact freshness.
//!
//! A plan artifact is a markdown file directly under the plan directory.
//! Freshness is derived from modification times on every check and never
//! cached, so granting or revoking it is just touching or aging a file.

use std::path::Path;
use std::time::{Duration, SystemTime};

/// True if any `*.md` file directly under `dir` was modified within
/// `window` of now. A missing or unreadable directory is simply not fresh.
#[must_use]
pub fn any_fresh_plan(dir: &Path, window: Duration) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };
    let now = SystemTime::now();
    entries.flatten().any(|entry| {
        let name = entry.file_name();
        let is_plan = Path::new(&name)
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("md"));
        if !is_plan {
            return false;
        }
        let Ok(modified) = entry.metadata().and_then(|meta| meta.modified()) else {
            return false;
        };
        // A clock-skewed mtime in the future still counts as fresh.
        match now.duration_since(modified) {
            Ok(age) => age <= window,
            Err(_) => true,
        }
    })
}
