//! At-most-once advisory hints, deduplicated through a persisted cache.
//!
//! The cache is a single JSON object mapping hint keys to `true`. Once a
//! key is recorded it stays recorded for the life of the file; a fresh
//! session directory means a fresh cache. Advisory delivery is
//! best-effort: a missing, corrupt, or unwritable cache file must never
//! take the hook down with it.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use warden_utils::atomic_write;

/// Persisted registry of hint keys that have already been shown.
#[derive(Debug)]
pub struct HintCache {
    path: PathBuf,
    shown: BTreeMap<String, bool>,
}

impl HintCache {
    /// Open the cache at `path`. A missing or corrupt file is treated as
    /// an empty cache.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let shown = read_cache(&path);
        Self { path, shown }
    }

    /// Record `key` as shown.
    ///
    /// Returns `true` exactly once per key per cache file, persisting the
    /// entry immediately so a later invocation sees it.
    pub fn note(&mut self, key: &str) -> bool {
        if self.shown.get(key).copied().unwrap_or(false) {
            return false;
        }
        self.shown.insert(key.to_string(), true);
        self.save();
        true
    }

    /// Emit `message` as a structured system message, once per `key` for
    /// the life of the cache file. Subsequent calls are no-ops.
    pub fn hint_once(&mut self, key: &str, message: &str) {
        if self.note(key) {
            println!("{}", serde_json::json!({ "systemMessage": message }));
        }
    }

    /// Persist the cache, merging with whatever is on disk so a racing
    /// writer's entries are not lost. Failures are swallowed.
    fn save(&self) {
        let mut merged = read_cache(&self.path);
        for (key, value) in &self.shown {
            merged.insert(key.clone(), *value);
        }
        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        match serde_json::to_vec(&merged) {
            Ok(bytes) => {
                if let Err(err) = atomic_write(&self.path, &bytes) {
                    tracing::debug!(path = %self.path.display(), "hint cache write failed: {err}");
                }
            }
            Err(err) => {
                tracing::debug!("hint cache serialization failed: {err}");
            }
        }
    }
}

fn read_cache(path: &Path) -> BTreeMap<String, bool> {
    let Ok(raw) = fs::read_to_string(path) else {
        return BTreeMap::new();
    };
    serde_json::from_str(&raw).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::HintCache;

    #[test]
    fn notes_each_key_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("hints.json");
        let mut cache = HintCache::open(&path);

        assert!(cache.note("go"));
        assert!(!cache.note("go"));
        assert!(cache.note("ruff"));

        let raw = fs::read_to_string(&path).expect("read");
        assert!(raw.contains("\"go\":true"));
        assert!(raw.contains("\"ruff\":true"));
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("hints.json");

        HintCache::open(&path).note("prettier");
        let mut reopened = HintCache::open(&path);

        assert!(!reopened.note("prettier"));
        assert!(reopened.note("eslint"));
    }

    #[test]
    fn corrupt_cache_is_treated_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("hints.json");
        fs::write(&path, "{not json").expect("write");

        let mut cache = HintCache::open(&path);
        assert!(cache.note("go"));

        // And the corrupt content has been replaced with valid JSON.
        let raw = fs::read_to_string(&path).expect("read");
        let parsed: serde_json::Value = serde_json::from_str(&raw).expect("valid");
        assert_eq!(parsed["go"], true);
    }

    #[test]
    fn creates_missing_parent_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session/hints.json");

        let mut cache = HintCache::open(&path);
        assert!(cache.note("dart"));
        assert!(path.exists());
    }

    #[test]
    fn merges_with_entries_written_by_another_process() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("hints.json");

        let mut ours = HintCache::open(&path);
        // Another invocation writes its own entry after we loaded.
        fs::write(&path, r#"{"theirs":true}"#).expect("write");
        ours.note("ours");

        let raw = fs::read_to_string(&path).expect("read");
        assert!(raw.contains("theirs"));
        assert!(raw.contains("ours"));
    }
}
