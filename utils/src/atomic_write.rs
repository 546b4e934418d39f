//! Atomic file write helper.
//!
//! Uses a temp file + rename pattern in the target's parent directory, so
//! a crash mid-write never leaves a torn file behind.

use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

pub fn atomic_write(path: impl AsRef<Path>, bytes: &[u8]) -> io::Result<()> {
    let path = path.as_ref();
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let parent = if parent.as_os_str().is_empty() {
        Path::new(".")
    } else {
        parent
    };

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::atomic_write;

    #[test]
    fn writes_new_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.json");

        atomic_write(&path, b"{}").expect("write");

        assert_eq!(fs::read_to_string(&path).expect("read"), "{}");
    }

    #[test]
    fn overwrites_existing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("out.json");

        atomic_write(&path, b"one").expect("write one");
        atomic_write(&path, b"two").expect("write two");

        assert_eq!(fs::read_to_string(&path).expect("read"), "two");
    }
}
