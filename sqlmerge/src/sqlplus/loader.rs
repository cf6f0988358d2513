//! Source file access for the include resolver.

use crate::errors::{MergeError, Result};
use std::path::{Path, PathBuf};

/// Reads script files on behalf of [`IncludeResolver`](super::IncludeResolver).
#[cfg_attr(test, mockall::automock)]
pub trait SourceLoader {
    /// Reads the whole file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::ResourceNotFound`] carrying `path` when the file
    /// does not exist.
    fn read_source(&self, path: &Path) -> Result<String>;

    /// Returns a stable identity for `path`, used to detect include cycles.
    fn identity(&self, path: &Path) -> PathBuf;
}

/// Loads sources from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn read_source(&self, path: &Path) -> Result<String> {
        if !path.is_file() {
            return Err(MergeError::not_found(path));
        }
        std::fs::read_to_string(path).map_err(|e| MergeError::io(path, e))
    }

    fn identity(&self, path: &Path) -> PathBuf {
        std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
    }
}
