//! Document storage seam.
//!
//! The host shell owns dialogs and path selection; the core only needs
//! read and write. Failures never cross this boundary as errors: a failed
//! read is logged and surfaces as an empty string, which callers cannot
//! distinguish from an empty file (known limitation).

use std::fs;
use std::path::Path;

/// Storage contract consumed by the editor session.
pub trait DocumentStorage {
    /// Returns the document content, or the empty string on failure.
    fn read(&self, path: &Path) -> String;
    /// Writes `text` to `path`, returning success.
    fn write(&self, path: &Path, text: &str) -> bool;
}

/// Filesystem-backed storage.
#[derive(Debug, Default)]
pub struct FsStorage;

impl DocumentStorage for FsStorage {
    fn read(&self, path: &Path) -> String {
        match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) => {
                log::error!("failed to read {}: {}", path.display(), err);
                String::new()
            }
        }
    }

    fn write(&self, path: &Path, text: &str) -> bool {
        match fs::write(path, text) {
            Ok(()) => true,
            Err(err) => {
                log::error!("failed to write {}: {}", path.display(), err);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_then_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        let storage = FsStorage;
        assert!(storage.write(&path, "# Title\n\nbody\n"));
        assert_eq!(storage.read(&path), "# Title\n\nbody\n");
    }

    #[test]
    fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsStorage;
        assert_eq!(storage.read(&dir.path().join("absent.md")), "");
    }

    #[test]
    fn test_write_failure_returns_false() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FsStorage;
        // Writing to a path whose parent does not exist fails.
        assert!(!storage.write(&dir.path().join("no/such/dir/doc.md"), "x"));
    }
}
