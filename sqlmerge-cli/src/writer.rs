//! Writing the merged script to disk.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes the final content to the configured output path.
#[derive(Debug, Clone)]
pub struct OutputWriter {
    path: PathBuf,
    backup: bool,
}

impl OutputWriter {
    /// Creates a writer for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            backup: false,
        }
    }

    /// Copy an existing output to `<output>.bak` before overwriting it.
    #[must_use]
    pub fn with_backup(mut self, backup: bool) -> Self {
        self.backup = backup;
        self
    }

    /// The output path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The backup path: the output path with `.bak` appended.
    #[must_use]
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".bak");
        PathBuf::from(name)
    }

    /// Writes `content`, creating parent directories as needed.
    ///
    /// Returns the backup path if a backup was made.
    pub fn write(&self, content: &str) -> Result<Option<PathBuf>> {
        let backup = if self.backup && self.path.is_file() {
            let backup = self.backup_path();
            std::fs::copy(&self.path, &backup)
                .with_context(|| format!("creating backup {}", backup.display()))?;
            info!(backup = %backup.display(), "Backup created");
            Some(backup)
        } else {
            None
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }
        std::fs::write(&self.path, content)
            .with_context(|| format!("writing {}", self.path.display()))?;

        Ok(backup)
    }
}
