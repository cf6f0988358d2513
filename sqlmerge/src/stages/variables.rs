//! The `sqlplus_vars` stage.

use super::{Stage, StageKind};
use crate::config::VariableSettings;
use crate::context::ProcessingContext;
use crate::errors::Result;
use crate::sqlplus::{DefineTable, VariableSubstitutor};
use serde_json::Value;
use tracing::{info, warn};

/// Applies DEFINE / UNDEFINE processing to the content.
///
/// The definitions still active at the end of the script are exported to
/// `ctx.variables` as `<namespace>_<name>` so a later template stage can
/// read them without clashing with user variables of the same bare name.
#[derive(Debug, Clone, Default)]
pub struct VariableStage {
    settings: VariableSettings,
    substitutor: VariableSubstitutor,
}

impl VariableStage {
    /// Creates the stage with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the stage from `[plugins.sqlplus_vars]`.
    #[must_use]
    pub fn from_settings(settings: &VariableSettings) -> Self {
        Self {
            settings: settings.clone(),
            substitutor: VariableSubstitutor::new(),
        }
    }

    /// Sets the export namespace. An empty namespace disables export.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.settings.namespace = namespace.into();
        self
    }

    fn export(&self, defines: &DefineTable, ctx: &mut ProcessingContext) {
        let namespace = self.settings.namespace.as_str();
        if namespace.is_empty() {
            return;
        }

        for (name, value) in defines.iter() {
            let key = format!("{namespace}_{name}");
            if ctx.variables.contains_key(name) {
                warn!(
                    variable = name,
                    exported_as = %key,
                    "SQL*Plus variable shadows a template variable of the same name; use the namespaced key"
                );
            }
            ctx.set_variable(key, Value::String(value.to_string()));
        }
    }
}

impl Stage for VariableStage {
    fn name(&self) -> &str {
        StageKind::SqlplusVars.name()
    }

    fn is_enabled(&self) -> bool {
        self.settings.enabled
    }

    fn process(&self, mut ctx: ProcessingContext) -> Result<ProcessingContext> {
        if self.settings.skip_var {
            info!("Variable substitution disabled (skip_var)");
            return Ok(ctx);
        }

        let result = self.substitutor.substitute(&ctx.content)?;

        ctx.set_metadata("variable_replacements", result.replacements.to_json());
        ctx.set_metadata("defined_variables", result.defines.to_json());
        self.export(&result.defines, &mut ctx);
        ctx.update_content(result.content);
        Ok(ctx)
    }
}
