//! Filesystem seam for the procfs-backed provider.
//!
//! `ProcFs` abstracts reading files under `/proc` so the real provider can
//! be exercised against an in-memory mock on non-Linux hosts and in CI.

use std::io;
use std::path::Path;

/// Read access to a proc-like filesystem.
pub trait ProcFs: Send {
    /// Reads the entire contents of a file as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// Real filesystem implementation that delegates to `std::fs`.
///
/// Use this in production to read from the actual `/proc` filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    /// Creates a new `RealFs` instance.
    pub fn new() -> Self {
        Self
    }
}

impl ProcFs for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_real_fs_read_to_string() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stat");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "cpu  1 2 3 4 5 6 7 0 0 0").unwrap();

        let fs = RealFs::new();
        let content = fs.read_to_string(&path).unwrap();
        assert!(content.starts_with("cpu "));
    }

    #[test]
    fn test_real_fs_missing_file_is_io_error() {
        let fs = RealFs::new();
        let err = fs
            .read_to_string(Path::new("/nonexistent/path/12345"))
            .unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}
