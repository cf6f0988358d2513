//! Loading and validation of `MKFSource.toml`.
//!
//! The file is parsed into a loosely-shaped raw form first, then normalised
//! (defaults, legacy `[pipeline]` section) and validated into a
//! [`MergeConfig`]. Every `[plugins.<name>]` table is decoded into a typed
//! [`StageSettings`] up front, so a bad setting fails at load time rather
//! than halfway through a run.

mod settings;

pub use settings::{IncludeSettings, StageSettings, TemplateSettings, VariableSettings};

use crate::errors::ConfigError;
use crate::stages::StageKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Name of the configuration file looked up by default.
pub const DEFAULT_CONFIG_FILE: &str = "MKFSource.toml";

/// The `[project]` section after normalisation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Root script to process.
    pub input: PathBuf,
    /// Where the merged script is written.
    pub output: PathBuf,
    /// Debug-level logging.
    pub verbose: bool,
    /// Copy an existing output to `<output>.bak` before overwriting it.
    pub create_backup: bool,
    /// Stage names to run, in order.
    pub execution_order: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    project: RawProject,
    #[serde(default)]
    pipeline: RawPipeline,
    #[serde(default)]
    plugins: BTreeMap<String, toml::Table>,
}

#[derive(Debug, Default, Deserialize)]
struct RawProject {
    input: Option<String>,
    output: Option<String>,
    verbose: Option<bool>,
    create_backup: Option<bool>,
    execution_order: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
struct RawPipeline {
    execution_order: Option<Vec<String>>,
}

/// A loaded, validated configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct MergeConfig {
    path: PathBuf,
    /// The `[project]` section.
    pub project: ProjectConfig,
    plugins: BTreeMap<String, StageSettings>,
}

impl MergeConfig {
    /// Reads and validates the configuration file at `path`.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
                cwd: std::env::current_dir().unwrap_or_default(),
            });
        }

        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::Syntax {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        info!(path = %path.display(), "Loading configuration");
        Self::from_toml_str(&source, path)
    }

    /// Parses configuration text. `path` is only used in error messages.
    pub fn from_toml_str(source: &str, path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let raw: RawConfig = toml::from_str(source).map_err(|e| ConfigError::Syntax {
            path: path.clone(),
            message: e.message().to_string(),
        })?;

        let RawConfig {
            project,
            pipeline,
            plugins,
        } = raw;

        let input = required(&path, "project.input", project.input)?;
        let output = required(&path, "project.output", project.output)?;
        let execution_order = project
            .execution_order
            .or(pipeline.execution_order)
            .unwrap_or_default();

        let plugins = plugins
            .iter()
            .map(|(name, table)| StageSettings::parse(name, table).map(|s| (name.clone(), s)))
            .collect::<Result<BTreeMap<_, _>, ConfigError>>()?;

        Ok(Self {
            path,
            project: ProjectConfig {
                input: PathBuf::from(input),
                output: PathBuf::from(output),
                verbose: project.verbose.unwrap_or(false),
                create_backup: project.create_backup.unwrap_or(false),
                execution_order,
            },
            plugins,
        })
    }

    /// Path the configuration was loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the configured execution order.
    #[must_use]
    pub fn execution_order(&self) -> &[String] {
        &self.project.execution_order
    }

    /// Returns the settings explicitly configured for `name`.
    #[must_use]
    pub fn plugin(&self, name: &str) -> Option<&StageSettings> {
        self.plugins.get(name)
    }

    /// Returns the settings for `name`, falling back to that stage's defaults.
    #[must_use]
    pub fn stage_settings(&self, name: &str) -> StageSettings {
        self.plugin(name)
            .cloned()
            .unwrap_or_else(|| StageSettings::defaults_for(name))
    }

    /// Returns true if include expansion will run as part of this pipeline.
    #[must_use]
    pub fn includes_active(&self) -> bool {
        let name = StageKind::SqlplusIncludes.name();
        self.execution_order().iter().any(|n| n == name) && self.stage_settings(name).is_enabled()
    }

    /// Loads the template variables file, if one is configured.
    ///
    /// A missing or malformed file is logged as a warning and yields no
    /// variables.
    #[must_use]
    pub fn load_variables(&self) -> HashMap<String, Value> {
        let Some(StageSettings::Template(TemplateSettings {
            variables_file: Some(file),
            ..
        })) = self.plugin(StageKind::Template.name())
        else {
            return HashMap::new();
        };

        let text = match std::fs::read_to_string(file) {
            Ok(text) => text,
            Err(e) => {
                warn!(path = %file.display(), error = %e, "Variables file not readable");
                return HashMap::new();
            }
        };

        match serde_json::from_str::<HashMap<String, Value>>(&text) {
            Ok(vars) => {
                info!(path = %file.display(), count = vars.len(), "Loaded template variables");
                vars
            }
            Err(e) => {
                warn!(path = %file.display(), error = %e, "Variables file is not a JSON object");
                HashMap::new()
            }
        }
    }
}

fn required(path: &Path, key: &str, value: Option<String>) -> Result<String, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingKey {
            path: path.to_path_buf(),
            key: key.to_string(),
        })
}
