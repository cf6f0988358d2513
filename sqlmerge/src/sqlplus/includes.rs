//! Recursive expansion of SQL*Plus `@` / `@@` inclusion directives.

use super::loader::{FsLoader, SourceLoader};
use super::tree::{IncludeKind, IncludeNode, IncludeTree};
use crate::errors::{MergeError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default nesting limit for inclusions.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Output of a resolution: the flattened text and the files visited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Expanded script text.
    pub content: String,
    /// Files read during expansion, for diagnostics.
    pub tree: IncludeTree,
}

/// Expands inclusion directives into a single script.
///
/// A line is a directive only if it starts with `@` in column one (after
/// trailing whitespace is stripped):
///
/// - `@@path` resolves against the directory of the file containing the line.
/// - `@path` resolves against the root directory given to [`IncludeResolver::new`],
///   at every nesting level.
///
/// Absolute paths are used as-is. Each directive line is replaced by the
/// expanded text of the referenced file followed by a newline; every other
/// line is copied through with its trailing whitespace removed.
#[derive(Debug, Clone)]
pub struct IncludeResolver<L = FsLoader> {
    root_dir: PathBuf,
    max_depth: usize,
    loader: L,
}

impl IncludeResolver<FsLoader> {
    /// Creates a resolver reading from the filesystem, anchored at `root_dir`.
    #[must_use]
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self::with_loader(root_dir, FsLoader)
    }
}

impl<L: SourceLoader> IncludeResolver<L> {
    /// Creates a resolver with a custom source loader.
    #[must_use]
    pub fn with_loader(root_dir: impl Into<PathBuf>, loader: L) -> Self {
        Self {
            root_dir: root_dir.into(),
            max_depth: DEFAULT_MAX_DEPTH,
            loader,
        }
    }

    /// Sets the nesting limit.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Returns the root anchor directory.
    #[must_use]
    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Expands `entry` and everything it includes.
    ///
    /// `entry` itself is read as given, without joining it to the root.
    ///
    /// # Errors
    ///
    /// - [`MergeError::ResourceNotFound`] if any referenced file is missing.
    /// - [`MergeError::IncludeCycle`] if a file includes itself transitively.
    /// - [`MergeError::IncludeDepthExceeded`] past the nesting limit.
    pub fn resolve(&self, entry: impl AsRef<Path>) -> Result<Resolved> {
        let mut walk = Walk::default();
        let content = self.expand(
            entry.as_ref(),
            &self.root_dir,
            0,
            IncludeKind::Root,
            &mut walk,
        )?;

        Ok(Resolved {
            content,
            tree: walk.tree,
        })
    }

    fn expand(
        &self,
        path: &Path,
        anchor_dir: &Path,
        depth: usize,
        kind: IncludeKind,
        walk: &mut Walk,
    ) -> Result<String> {
        let full_path = if depth == 0 || path.is_absolute() {
            path.to_path_buf()
        } else {
            anchor_dir.join(path)
        };

        if depth > self.max_depth {
            return Err(MergeError::IncludeDepthExceeded {
                path: full_path,
                max_depth: self.max_depth,
            });
        }

        let text = self.loader.read_source(&full_path)?;

        let identity = self.loader.identity(&full_path);
        if let Some(start) = walk.stack.iter().position(|p| *p == identity) {
            let mut chain = walk.stack[start..].to_vec();
            chain.push(identity);
            return Err(MergeError::IncludeCycle { chain });
        }

        walk.tree.push(IncludeNode {
            path: full_path.clone(),
            depth,
            anchor_dir: anchor_dir.to_path_buf(),
            kind,
        });
        walk.stack.push(identity);

        let parent_dir = full_path
            .parent()
            .map_or_else(PathBuf::new, Path::to_path_buf);

        let mut content = String::with_capacity(text.len());
        for line in text.lines() {
            let line = line.trim_end();

            if let Some(nested) = line.strip_prefix("@@") {
                let nested = nested.trim();
                debug!(file = %full_path.display(), include = nested, "Found @@ inclusion");
                content.push_str(&self.expand(
                    Path::new(nested),
                    &parent_dir,
                    depth + 1,
                    IncludeKind::Parent,
                    walk,
                )?);
                content.push('\n');
            } else if let Some(nested) = line.strip_prefix('@') {
                let nested = nested.trim();
                debug!(file = %full_path.display(), include = nested, "Found @ inclusion");
                content.push_str(&self.expand(
                    Path::new(nested),
                    &self.root_dir,
                    depth + 1,
                    IncludeKind::Base,
                    walk,
                )?);
                content.push('\n');
            } else {
                content.push_str(line);
                content.push('\n');
            }
        }

        walk.stack.pop();
        Ok(content)
    }
}

/// Per-resolution traversal state.
#[derive(Debug, Default)]
struct Walk {
    /// Identities of the files currently being expanded, outermost first.
    stack: Vec<PathBuf>,
    tree: IncludeTree,
}
