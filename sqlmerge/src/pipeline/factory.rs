//! Construction of stages from configuration.

use super::registry::StageRegistry;
use crate::config::{MergeConfig, StageSettings};
use crate::errors::{ConfigError, Result};
use crate::stages::{IncludeStage, Stage, StageKind, TemplateStage, VariableStage};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Builds one stage from its settings.
pub type StageConstructor = fn(&StageSettings) -> Result<Box<dyn Stage>>;

/// Maps stage names to constructors.
#[derive(Clone, Default)]
pub struct StageFactory {
    constructors: BTreeMap<String, StageConstructor>,
}

impl StageFactory {
    /// Creates an empty factory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a factory with every [`StageKind`] registered.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut factory = Self::new();
        factory.register(StageKind::SqlplusIncludes.name(), build_includes);
        factory.register(StageKind::SqlplusVars.name(), build_vars);
        factory.register(StageKind::Template.name(), build_template);
        factory
    }

    /// Registers a constructor, replacing any previous one for `name`.
    pub fn register(&mut self, name: impl Into<String>, constructor: StageConstructor) {
        self.constructors.insert(name.into(), constructor);
    }

    /// Returns true if `name` can be constructed.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }

    /// Constructs the stage registered as `name`.
    ///
    /// Returns `Ok(None)` if nothing is registered under that name.
    pub fn build(&self, name: &str, settings: &StageSettings) -> Result<Option<Box<dyn Stage>>> {
        self.constructors
            .get(name)
            .map(|construct| construct(settings))
            .transpose()
    }

    /// Builds the registry for one run.
    ///
    /// Every name in the execution order that this factory knows is
    /// constructed with its configured settings. Unknown names are left out;
    /// the pipeline warns about them when it reaches them.
    ///
    /// When include expansion is active and the template settings do not
    /// say otherwise, template partials are disabled.
    pub fn build_registry(&self, config: &MergeConfig) -> Result<StageRegistry> {
        let mut registry = StageRegistry::new();

        for name in config.execution_order() {
            if registry.contains(name) {
                continue;
            }

            let mut settings = config.stage_settings(name);
            if let StageSettings::Template(template) = &mut settings {
                if template.allow_partials.is_none() {
                    template.allow_partials = Some(!config.includes_active());
                }
            }

            if let Some(stage) = self.build(name, &settings)? {
                debug!(stage = %name, enabled = stage.is_enabled(), "Registered stage");
                registry.insert(name.clone(), stage);
            }
        }

        Ok(registry)
    }
}

impl fmt::Debug for StageFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageFactory")
            .field("stages", &self.names())
            .finish()
    }
}

fn mismatch(stage: StageKind) -> ConfigError {
    ConfigError::InvalidSettings {
        stage: stage.name().to_string(),
        message: "settings belong to a different stage kind".to_string(),
    }
}

fn build_includes(settings: &StageSettings) -> Result<Box<dyn Stage>> {
    match settings {
        StageSettings::Includes(s) => Ok(Box::new(IncludeStage::from_settings(s))),
        _ => Err(mismatch(StageKind::SqlplusIncludes).into()),
    }
}

fn build_vars(settings: &StageSettings) -> Result<Box<dyn Stage>> {
    match settings {
        StageSettings::Vars(s) => Ok(Box::new(VariableStage::from_settings(s))),
        _ => Err(mismatch(StageKind::SqlplusVars).into()),
    }
}

fn build_template(settings: &StageSettings) -> Result<Box<dyn Stage>> {
    match settings {
        StageSettings::Template(s) => Ok(Box::new(TemplateStage::from_settings(s))),
        _ => Err(mismatch(StageKind::Template).into()),
    }
}
