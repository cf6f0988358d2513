//! The `sqlplus_includes` stage.

use super::{Stage, StageKind};
use crate::config::IncludeSettings;
use crate::context::ProcessingContext;
use crate::errors::Result;
use crate::sqlplus::IncludeResolver;
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;

/// Replaces the content with the expanded text of the source file.
///
/// The source file is read from disk rather than from `ctx.content`, since
/// include resolution needs the file's own location.
#[derive(Debug, Clone, Default)]
pub struct IncludeStage {
    settings: IncludeSettings,
}

impl IncludeStage {
    /// Creates the stage with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the stage from `[plugins.sqlplus_includes]`.
    #[must_use]
    pub fn from_settings(settings: &IncludeSettings) -> Self {
        Self {
            settings: settings.clone(),
        }
    }

    /// Sets the nesting limit.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.settings.max_depth = max_depth;
        self
    }

    fn root_dir(ctx: &ProcessingContext) -> PathBuf {
        match ctx.source_path.parent() {
            Some(parent) if ctx.source_path.is_absolute() => parent.to_path_buf(),
            _ => ctx.base_path.clone(),
        }
    }
}

impl Stage for IncludeStage {
    fn name(&self) -> &str {
        StageKind::SqlplusIncludes.name()
    }

    fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    fn process(&self, mut ctx: ProcessingContext) -> Result<ProcessingContext> {
        let resolver =
            IncludeResolver::new(Self::root_dir(&ctx)).with_max_depth(self.settings.max_depth);
        let resolved = resolver.resolve(&ctx.source_path)?;

        info!("Include tree:");
        for line in resolved.tree.render() {
            info!("{line}");
        }

        let visited: Vec<Value> = resolved
            .tree
            .nodes()
            .iter()
            .map(|node| Value::String(node.path.display().to_string()))
            .collect();
        ctx.set_metadata("include_tree", Value::Array(visited));
        ctx.update_content(resolved.content);
        Ok(ctx)
    }
}
