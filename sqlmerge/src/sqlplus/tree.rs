//! Inclusion tree collected while expanding a script.

use serde::Serialize;
use std::path::PathBuf;

/// How a file entered the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IncludeKind {
    /// The top-level input file.
    Root,
    /// `@@file`, resolved against the including file's directory.
    Parent,
    /// `@file`, resolved against the root base directory.
    Base,
}

/// One visited file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncludeNode {
    /// The resolved path that was read.
    pub path: PathBuf,
    /// Nesting depth, 0 for the input file.
    pub depth: usize,
    /// Directory the path was resolved against.
    pub anchor_dir: PathBuf,
    /// Directive that produced this node.
    pub kind: IncludeKind,
}

/// Every file visited during one expansion, in visit order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IncludeTree {
    nodes: Vec<IncludeNode>,
}

impl IncludeTree {
    /// Creates an empty tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, node: IncludeNode) {
        self.nodes.push(node);
    }

    /// The visited nodes in order.
    #[must_use]
    pub fn nodes(&self) -> &[IncludeNode] {
        &self.nodes
    }

    /// Number of files read, counting repeats.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if nothing was visited.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Renders the tree as indented `|-- name` lines.
    #[must_use]
    pub fn render(&self) -> Vec<String> {
        self.nodes
            .iter()
            .map(|node| {
                let name = node
                    .path
                    .file_name()
                    .map_or_else(|| node.path.display().to_string(), |n| n.to_string_lossy().into_owned());
                format!("{}|-- {name}", "    ".repeat(node.depth))
            })
            .collect()
    }
}
