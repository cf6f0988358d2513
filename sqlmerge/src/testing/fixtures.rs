//! On-disk fixtures for include tests.

use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::context::ProcessingContext;
use crate::errors::Result;

/// A temporary directory of SQL files, removed on drop.
#[derive(Debug)]
pub struct SqlTree {
    dir: TempDir,
}

impl SqlTree {
    /// Creates an empty tree.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    /// Writes `content` to `rel`, creating parent directories. Returns the absolute path.
    pub fn file(&self, rel: impl AsRef<Path>, content: &str) -> io::Result<PathBuf> {
        let path = self.path(rel);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// The root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Joins `rel` onto the root.
    #[must_use]
    pub fn path(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.dir.path().join(rel)
    }

    /// Loads `rel` into a context anchored at its parent directory.
    pub fn context(&self, rel: impl AsRef<Path>) -> Result<ProcessingContext> {
        ProcessingContext::from_file(self.path(rel))
    }
}
