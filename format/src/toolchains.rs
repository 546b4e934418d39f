//! Per-language toolchains invoked after a file write.
//!
//! Every step runs synchronously, relays the child's stdout/stderr to the
//! hook's own streams, and continues regardless of the child's exit
//! status. Tools are located on `PATH`; an absent tool raises a one-time
//! advisory through the hint cache and the step is skipped.

use std::ffi::OsStr;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use warden_session::HintCache;
use warden_utils::find_up;

/// Language toolchain selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toolchain {
    Go,
    Node,
    Python,
    Dart,
}

impl Toolchain {
    /// Select a toolchain for `path` by extension (case-insensitive).
    #[must_use]
    pub fn for_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "go" => Some(Self::Go),
            "ts" | "tsx" | "js" | "jsx" => Some(Self::Node),
            "py" => Some(Self::Python),
            "dart" => Some(Self::Dart),
            _ => None,
        }
    }

    pub(crate) fn run(self, path: &Path, hints: &mut HintCache) {
        match self {
            Self::Go => run_go(path, hints),
            Self::Node => run_node(path, hints),
            Self::Python => run_python(path, hints),
            Self::Dart => run_dart(path, hints),
        }
    }
}

/// Run one step, relaying both streams. Spawn failures are reported as
/// `None`; the caller continues either way.
fn run_step(mut command: Command) -> Option<Output> {
    match command.output() {
        Ok(output) => {
            if !output.stdout.is_empty() {
                let _ = io::stdout().write_all(&output.stdout);
            }
            if !output.stderr.is_empty() {
                let _ = io::stderr().write_all(&output.stderr);
            }
            Some(output)
        }
        Err(err) => {
            tracing::debug!("toolchain step failed to spawn: {err}");
            None
        }
    }
}

/// The directory a file's build/check steps run in.
fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn run_go(path: &Path, hints: &mut HintCache) {
    let Ok(go) = which::which("go") else {
        hints.hint_once("go", "Install Go to enable go fmt/go build checks.");
        return;
    };
    match which::which("goimports") {
        Ok(goimports) => {
            let mut imports = Command::new(goimports);
            imports.arg("-w").arg(path);
            if let Some(output) = run_step(imports)
                && !output.status.success()
            {
                hints.hint_once("goimports-error", "goimports failed; inspect output above.");
            }
        }
        Err(_) => {
            hints.hint_once(
                "goimports",
                "Optional: install goimports (`go install golang.org/x/tools/cmd/goimports@latest`).",
            );
            let mut fmt = Command::new(&go);
            fmt.arg("fmt").arg(path);
            run_step(fmt);
        }
    }
    let mut build = Command::new(go);
    build.arg("build").current_dir(parent_dir(path));
    run_step(build);
}

fn run_node(path: &Path, hints: &mut HintCache) {
    let Ok(npx) = which::which("npx") else {
        hints.hint_once("npx", "Install Node.js (provides `npx`) to format TS/JS files.");
        return;
    };

    let mut prettier = Command::new(&npx);
    prettier.args(["--no-install", "prettier", "--write"]).arg(path);
    if let Some(output) = run_step(prettier)
        && module_missing(&output, "prettier")
    {
        hints.hint_once(
            "prettier",
            "Prettier is missing; add it to devDependencies and run `pnpm|npm install`.",
        );
    }

    let mut eslint = Command::new(&npx);
    eslint.args(["--no-install", "eslint", "--fix"]).arg(path);
    if let Some(output) = run_step(eslint)
        && module_missing(&output, "eslint")
    {
        hints.hint_once(
            "eslint",
            "ESLint is missing; add it to devDependencies and run `pnpm|npm install`.",
        );
    }

    let is_typescript = path
        .extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| matches!(ext.to_ascii_lowercase().as_str(), "ts" | "tsx"));
    if is_typescript
        && let Some(tsconfig) = find_up(&parent_dir(path), "tsconfig.json")
        && let Some(project_dir) = tsconfig.parent()
    {
        let mut tsc = Command::new(&npx);
        tsc.args(["--no-install", "tsc", "--noEmit", "-p"])
            .arg(project_dir)
            .current_dir(project_dir);
        if let Some(output) = run_step(tsc)
            && module_missing(&output, "typescript")
        {
            hints.hint_once("tsc", "TypeScript is missing; install `typescript` in devDependencies.");
        }
    }
}

fn run_python(path: &Path, hints: &mut HintCache) {
    match which::which("ruff") {
        Ok(ruff) => {
            let mut check = Command::new(ruff);
            check.args(["check", "--fix"]).arg(path);
            run_step(check);
        }
        Err(_) => {
            hints.hint_once("ruff", "Optional: install `ruff` for fast linting (`pip install ruff`).");
        }
    }
    match which::which("black") {
        Ok(black) => {
            let mut format = Command::new(black);
            format.arg("-q").arg(path);
            run_step(format);
        }
        Err(_) => {
            hints.hint_once("black", "Optional: install `black` for formatting (`pip install black`).");
        }
    }
    match which::which("python3") {
        Ok(python3) => {
            let mut compile = Command::new(python3);
            compile.args(["-m", "py_compile"]).arg(path);
            run_step(compile);
        }
        Err(_) => {
            hints.hint_once(
                "python3",
                "Install Python 3 to enable syntax checks (`python3 -m py_compile`).",
            );
        }
    }
}

fn run_dart(path: &Path, hints: &mut HintCache) {
    let Ok(dart) = which::which("dart") else {
        hints.hint_once("dart", "Install Dart SDK to enable format/analyze.");
        return;
    };
    let mut format = Command::new(&dart);
    format.arg("format").arg(path);
    run_step(format);

    if let Some(pubspec) = find_up(&parent_dir(path), "pubspec.yaml")
        && let Some(project_dir) = pubspec.parent()
    {
        let mut analyze = Command::new(dart);
        analyze.arg("analyze").current_dir(project_dir);
        run_step(analyze);
    }
}

/// `npx --no-install` reports an absent package through a nonzero exit
/// and a "Cannot find module" error naming it.
fn module_missing(output: &Output, module: &str) -> bool {
    if output.status.success() {
        return false;
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    stderr_names_missing_module(&stderr, module)
}

fn stderr_names_missing_module(stderr: &str, module: &str) -> bool {
    stderr.contains("Cannot find module") && stderr.contains(module)
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{Toolchain, parent_dir, stderr_names_missing_module};

    #[test]
    fn selects_toolchain_by_extension() {
        assert_eq!(Toolchain::for_path(Path::new("main.go")), Some(Toolchain::Go));
        assert_eq!(
            Toolchain::for_path(Path::new("src/App.tsx")),
            Some(Toolchain::Node)
        );
        assert_eq!(
            Toolchain::for_path(Path::new("lib/util.js")),
            Some(Toolchain::Node)
        );
        assert_eq!(
            Toolchain::for_path(Path::new("tool/gen.py")),
            Some(Toolchain::Python)
        );
        assert_eq!(
            Toolchain::for_path(Path::new("lib/app.dart")),
            Some(Toolchain::Dart)
        );
    }

    #[test]
    fn extension_match_is_case_insensitive() {
        assert_eq!(Toolchain::for_path(Path::new("Main.GO")), Some(Toolchain::Go));
        assert_eq!(Toolchain::for_path(Path::new("a.PY")), Some(Toolchain::Python));
    }

    #[test]
    fn unknown_extensions_select_nothing() {
        assert_eq!(Toolchain::for_path(Path::new("README.md")), None);
        assert_eq!(Toolchain::for_path(Path::new("Makefile")), None);
        assert_eq!(Toolchain::for_path(Path::new("src/lib.rs")), None);
    }

    #[test]
    fn missing_module_detection_needs_both_markers() {
        assert!(stderr_names_missing_module(
            "Error: Cannot find module 'prettier'",
            "prettier"
        ));
        assert!(!stderr_names_missing_module(
            "Cannot find module 'left-pad'",
            "prettier"
        ));
        assert!(!stderr_names_missing_module("prettier crashed", "prettier"));
    }

    #[test]
    fn parent_dir_falls_back_to_current() {
        assert_eq!(parent_dir(Path::new("main.go")), Path::new("."));
        assert_eq!(parent_dir(Path::new("pkg/main.go")), Path::new("pkg"));
    }
}
