//! Stage trait and built-in stages.
//!
//! A stage is a named `ProcessingContext -> ProcessingContext` transformation.
//! The built-in kinds are closed in [`StageKind`]; hosts add their own
//! through [`crate::pipeline::StageFactory`].

mod includes;
mod template;
mod variables;

pub use includes::IncludeStage;
pub use template::TemplateStage;
pub use variables::VariableStage;

use crate::context::ProcessingContext;
use crate::errors::Result;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};

/// A named, independently enable-able unit of work.
pub trait Stage: Send + Sync + Debug {
    /// Returns the name the stage is registered under.
    fn name(&self) -> &str;

    /// Returns false to have the pipeline skip this stage.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Transforms the context.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The context produced by the previous stage
    fn process(&self, ctx: ProcessingContext) -> Result<ProcessingContext>;
}

/// The built-in stage kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    /// Expands `@` / `@@` inclusions.
    SqlplusIncludes,
    /// Applies DEFINE / UNDEFINE and `&name` substitution.
    SqlplusVars,
    /// Renders the content as a template.
    Template,
}

impl StageKind {
    /// Every built-in kind, in the order they are normally run.
    pub const ALL: [Self; 3] = [Self::SqlplusIncludes, Self::SqlplusVars, Self::Template];

    /// The registry name of this kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SqlplusIncludes => "sqlplus_includes",
            Self::SqlplusVars => "sqlplus_vars",
            Self::Template => "template",
        }
    }

    /// Looks up a kind by registry name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// One-line description for listings.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::SqlplusIncludes => "expand @file and @@file inclusions",
            Self::SqlplusVars => "apply DEFINE/UNDEFINE and &name substitution",
            Self::Template => "render the script as a handlebars template",
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A stage backed by a closure.
pub struct FnStage<F>
where
    F: Fn(ProcessingContext) -> Result<ProcessingContext> + Send + Sync,
{
    name: String,
    enabled: bool,
    func: F,
}

impl<F> FnStage<F>
where
    F: Fn(ProcessingContext) -> Result<ProcessingContext> + Send + Sync,
{
    /// Creates a new function-based stage.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            func,
        }
    }

    /// Sets whether the stage is enabled.
    #[must_use]
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

impl<F> Debug for FnStage<F>
where
    F: Fn(ProcessingContext) -> Result<ProcessingContext> + Send + Sync,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnStage")
            .field("name", &self.name)
            .field("enabled", &self.enabled)
            .finish()
    }
}

impl<F> Stage for FnStage<F>
where
    F: Fn(ProcessingContext) -> Result<ProcessingContext> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn process(&self, ctx: ProcessingContext) -> Result<ProcessingContext> {
        (self.func)(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_roundtrip() {
        for kind in StageKind::ALL {
            assert_eq!(StageKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(StageKind::from_name("jinja2"), None);
    }

    #[test]
    fn test_kind_serializes_as_name() {
        let json = serde_json::to_string(&StageKind::SqlplusVars).unwrap();
        assert_eq!(json, "\"sqlplus_vars\"");
    }

    #[test]
    fn test_fn_stage() {
        let stage = FnStage::new("upper", |mut ctx: ProcessingContext| {
            ctx.content = ctx.content.to_uppercase();
            Ok(ctx)
        });

        let ctx = ProcessingContext::new("a.sql", ".").with_content("select 1");
        let out = stage.process(ctx).unwrap();

        assert_eq!(stage.name(), "upper");
        assert!(stage.is_enabled());
        assert_eq!(out.content, "SELECT 1");
    }

    #[test]
    fn test_fn_stage_disabled() {
        let stage = FnStage::new("noop", Ok).with_enabled(false);
        assert!(!stage.is_enabled());
        assert!(format!("{stage:?}").contains("noop"));
    }
}
