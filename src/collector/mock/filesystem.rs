//! In-memory mock filesystem for testing collectors without real `/proc`.
//!
//! `MockFs` simulates the kernel pseudo-filesystems in memory, allowing
//! tests to run on macOS and in CI environments without Linux. Clones share
//! the underlying store, so a test can hand a clone to a collector and then
//! advance file contents between sampling passes; this is how the CPU
//! delta computation is exercised with two distinct samples.

use crate::collector::traits::FileSystem;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// In-memory filesystem for testing.
///
/// Stores file contents in memory, keyed by absolute path. All clones of a
/// `MockFs` observe the same store.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    files: Arc<Mutex<HashMap<PathBuf, String>>>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with the given content, replacing any previous content.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<String>) {
        self.store().insert(path.as_ref().to_path_buf(), content.into());
    }

    /// Removes a file, simulating a source that disappears at runtime.
    pub fn remove_file(&self, path: impl AsRef<Path>) {
        self.store().remove(path.as_ref());
    }

    fn store(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, String>> {
        self.files.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.store()
            .get(path)
            .cloned()
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("file not found: {:?}", path),
                )
            })
    }
}
