//! Abstractions for filesystem access to enable testing and mocking.
//!
//! The `FileSystem` trait allows collectors to read from the real `/proc`
//! and `/sys` filesystems on Linux or from mock implementations in tests.

use std::io;
use std::path::Path;

/// Abstraction for filesystem operations.
///
/// Every metric source is a fixed-path pseudo-file that must be re-opened
/// and re-read on each sampling pass, so a single operation suffices.
pub trait FileSystem: Send + Sync {
    /// Reads the entire contents of a file as a string.
    ///
    /// # Arguments
    /// * `path` - Path to the file to read
    ///
    /// # Returns
    /// The file contents as a string, or an I/O error if the file cannot be read.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;
}

/// Real filesystem implementation that delegates to `std::fs`.
///
/// Use this in production to read from the actual kernel pseudo-files.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    /// Creates a new `RealFs` instance.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_real_fs_read_to_string() {
        let fs = RealFs::new();
        // Read Cargo.toml which should exist in project root
        let cargo_toml = env::current_dir().unwrap().join("Cargo.toml");
        let content = fs.read_to_string(&cargo_toml).unwrap();
        assert!(content.contains("[package]"));
    }

    #[test]
    fn test_real_fs_missing_file() {
        let fs = RealFs::new();
        let result = fs.read_to_string(Path::new("/nonexistent/path/12345"));
        assert!(result.is_err());
    }
}
