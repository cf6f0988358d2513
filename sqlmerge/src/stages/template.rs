//! The `template` stage.

use super::{Stage, StageKind};
use crate::config::TemplateSettings;
use crate::context::ProcessingContext;
use crate::errors::Result;
use crate::template::TemplateRenderer;
use tracing::{debug, info};

/// Renders the content as a template against `ctx.variables`.
#[derive(Debug)]
pub struct TemplateStage {
    enabled: bool,
    renderer: TemplateRenderer,
}

impl TemplateStage {
    /// Creates a strict stage that accepts partials.
    #[must_use]
    pub fn new() -> Self {
        Self::from_settings(&TemplateSettings::default())
    }

    /// Creates the stage from `[plugins.template]`.
    ///
    /// An unset `allow_partials` means partials are accepted.
    #[must_use]
    pub fn from_settings(settings: &TemplateSettings) -> Self {
        Self {
            enabled: settings.enabled,
            renderer: TemplateRenderer::new()
                .with_strict(settings.strict_undefined)
                .with_partials(settings.allow_partials.unwrap_or(true)),
        }
    }
}

impl Default for TemplateStage {
    fn default() -> Self {
        Self::new()
    }
}

impl Stage for TemplateStage {
    fn name(&self) -> &str {
        StageKind::Template.name()
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn process(&self, mut ctx: ProcessingContext) -> Result<ProcessingContext> {
        info!("Rendering template");
        debug!(variables = ctx.variables.len(), "Template variables available");

        let rendered = self.renderer.render(&ctx.content, &ctx.variables)?;
        ctx.update_content(rendered);
        Ok(ctx)
    }
}
