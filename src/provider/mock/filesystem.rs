//! In-memory mock filesystem for testing the procfs provider.

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::provider::traits::ProcFs;

/// In-memory filesystem for testing.
///
/// Clones share the same file map, so a test can keep one handle while the
/// provider owns another and swap file contents between provider calls to
/// simulate a `/proc` that changes over time.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    files: Arc<Mutex<HashMap<PathBuf, String>>>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with the given content.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        self.files
            .lock()
            .unwrap()
            .insert(path.as_ref().to_path_buf(), content.into());
    }

    /// Replaces the content of a file, visible to every clone of this
    /// filesystem.
    pub fn replace_file(&self, path: impl AsRef<Path>, content: impl Into<String>) {
        self.files
            .lock()
            .unwrap()
            .insert(path.as_ref().to_path_buf(), content.into());
    }

    /// Removes a file, making subsequent reads fail with `NotFound`.
    pub fn remove_file(&self, path: impl AsRef<Path>) {
        self.files.lock().unwrap().remove(path.as_ref());
    }
}

impl ProcFs for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no such file: {}", path.display()),
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_existing_file() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/stat", "cpu  1 2 3 4\n");
        let content = fs.read_to_string(Path::new("/proc/stat")).unwrap();
        assert_eq!(content, "cpu  1 2 3 4\n");
    }

    #[test]
    fn test_read_missing_file() {
        let fs = MockFs::new();
        let err = fs.read_to_string(Path::new("/proc/stat")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_clones_share_contents() {
        let mut fs = MockFs::new();
        fs.add_file("/proc/stat", "old");
        let clone = fs.clone();

        fs.replace_file("/proc/stat", "new");
        assert_eq!(clone.read_to_string(Path::new("/proc/stat")).unwrap(), "new");

        clone.remove_file("/proc/stat");
        assert!(fs.read_to_string(Path::new("/proc/stat")).is_err());
    }
}
