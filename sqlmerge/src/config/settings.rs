//! Typed per-stage settings parsed from `[plugins.<name>]` tables.

use crate::errors::ConfigError;
use crate::sqlplus::DEFAULT_MAX_DEPTH;
use crate::stages::StageKind;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn enabled_default() -> bool {
    true
}

/// Settings for the `sqlplus_includes` stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncludeSettings {
    /// Whether the stage runs.
    pub enabled: bool,
    /// Maximum include nesting.
    pub max_depth: usize,
}

impl Default for IncludeSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Settings for the `sqlplus_vars` stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VariableSettings {
    /// Whether the stage runs.
    pub enabled: bool,
    /// Run the stage but leave the content untouched.
    pub skip_var: bool,
    /// Prefix for variables exported to the template stage. Empty disables export.
    pub namespace: String,
}

impl Default for VariableSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            skip_var: false,
            namespace: "sql".to_string(),
        }
    }
}

/// Settings for the `template` stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSettings {
    /// Whether the stage runs.
    pub enabled: bool,
    /// Fail on references to missing variables.
    pub strict_undefined: bool,
    /// JSON object merged into the template variables.
    pub variables_file: Option<PathBuf>,
    /// Allow `{{> partial}}`. Defaults to false when includes are active.
    pub allow_partials: Option<bool>,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            strict_undefined: true,
            variables_file: None,
            allow_partials: None,
        }
    }
}

#[derive(Deserialize)]
struct CustomHeader {
    #[serde(default = "enabled_default")]
    enabled: bool,
}

/// Settings for one stage, typed when the stage is a built-in kind.
#[derive(Debug, Clone, PartialEq)]
pub enum StageSettings {
    /// `[plugins.sqlplus_includes]`
    Includes(IncludeSettings),
    /// `[plugins.sqlplus_vars]`
    Vars(VariableSettings),
    /// `[plugins.template]`
    Template(TemplateSettings),
    /// Any table without a built-in kind, for host-registered stages.
    Custom {
        /// The `enabled` key, defaulting to true.
        enabled: bool,
        /// The raw table.
        table: toml::Table,
    },
}

impl StageSettings {
    /// Parses the table configured for `name`.
    pub fn parse(name: &str, table: &toml::Table) -> Result<Self, ConfigError> {
        let settings = match StageKind::from_name(name) {
            Some(StageKind::SqlplusIncludes) => Self::Includes(decode(name, table)?),
            Some(StageKind::SqlplusVars) => Self::Vars(decode(name, table)?),
            Some(StageKind::Template) => Self::Template(decode(name, table)?),
            None => {
                let header: CustomHeader = decode(name, table)?;
                Self::Custom {
                    enabled: header.enabled,
                    table: table.clone(),
                }
            }
        };
        Ok(settings)
    }

    /// Settings used when the configuration has no table for `name`.
    #[must_use]
    pub fn defaults_for(name: &str) -> Self {
        match StageKind::from_name(name) {
            Some(StageKind::SqlplusIncludes) => Self::Includes(IncludeSettings::default()),
            Some(StageKind::SqlplusVars) => Self::Vars(VariableSettings::default()),
            Some(StageKind::Template) => Self::Template(TemplateSettings::default()),
            None => Self::Custom {
                enabled: true,
                table: toml::Table::new(),
            },
        }
    }

    /// Returns the `enabled` flag.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Includes(s) => s.enabled,
            Self::Vars(s) => s.enabled,
            Self::Template(s) => s.enabled,
            Self::Custom { enabled, .. } => *enabled,
        }
    }
}

fn decode<T: DeserializeOwned>(stage: &str, table: &toml::Table) -> Result<T, ConfigError> {
    toml::Value::Table(table.clone())
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::InvalidSettings {
            stage: stage.to_string(),
            message: e.message().to_string(),
        })
}
