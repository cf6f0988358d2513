//! Error types for the sqlmerge pipeline.
//!
//! Every fatal condition raised while expanding includes, substituting
//! variables, rendering templates or loading configuration is a
//! [`MergeError`]. Failures inside a pipeline stage are wrapped in a
//! [`StageExecutionError`] that names the stage.

use std::path::PathBuf;
use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = MergeError> = std::result::Result<T, E>;

/// The main error type for sqlmerge operations.
#[derive(Debug, Error)]
pub enum MergeError {
    /// An inclusion directive (or the input itself) references a missing file.
    #[error("File not found: {}", path.display())]
    ResourceNotFound {
        /// The resolved path that does not exist.
        path: PathBuf,
    },

    /// A file includes itself, directly or through other files.
    #[error("Include cycle detected: {}", format_chain(chain))]
    IncludeCycle {
        /// Files from the first occurrence of the repeated file back to itself.
        chain: Vec<PathBuf>,
    },

    /// Nesting went deeper than the configured limit.
    #[error("Include depth limit of {max_depth} exceeded while expanding {}", path.display())]
    IncludeDepthExceeded {
        /// The file that would have been expanded past the limit.
        path: PathBuf,
        /// The configured limit.
        max_depth: usize,
    },

    /// A `&name` reference appears before any DEFINE for `name`.
    #[error("Variable '{name}' is used before being defined (line {line})")]
    UndefinedVariable {
        /// Variable name without the leading `&`.
        name: String,
        /// 1-based line number of the reference.
        line: usize,
    },

    /// A DEFINE statement with nothing after the `=`.
    #[error("DEFINE with invalid value on line {line}: '{text}'")]
    MalformedDefine {
        /// 1-based line number of the statement.
        line: usize,
        /// The trimmed statement text.
        text: String,
    },

    /// A pipeline stage failed.
    #[error("{0}")]
    StageExecution(#[from] StageExecutionError),

    /// The template renderer rejected the content.
    #[error("Template error: {0}")]
    Template(String),

    /// Configuration could not be loaded or validated.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// An I/O error other than a missing file.
    #[error("IO error on {}: {source}", path.display())]
    Io {
        /// The path being accessed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl MergeError {
    /// Creates a resource-not-found error.
    ///
    /// Relative paths are made absolute against the working directory.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let path = std::path::absolute(&path).unwrap_or(path);
        Self::ResourceNotFound { path }
    }

    /// Creates an I/O error for a path.
    #[must_use]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Returns a stable error code for diagnostics.
    ///
    /// Stage failures report the code of the error they wrap.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ResourceNotFound { .. } => "INCLUDE-NOT-FOUND",
            Self::IncludeCycle { .. } => "INCLUDE-CYCLE",
            Self::IncludeDepthExceeded { .. } => "INCLUDE-DEPTH",
            Self::UndefinedVariable { .. } => "SQLPLUS-UNDEFINED-VAR",
            Self::MalformedDefine { .. } => "SQLPLUS-MALFORMED-DEFINE",
            Self::StageExecution(err) => err.source.code(),
            Self::Template(_) => "TEMPLATE-RENDER",
            Self::Config(err) => err.code(),
            Self::Io { .. } => "IO",
        }
    }

    /// Returns a hint for fixing the error, if one is known.
    #[must_use]
    pub fn fix_hint(&self) -> Option<&'static str> {
        match self {
            Self::ResourceNotFound { .. } => Some(
                "'@file' resolves against the root input directory, \
                 '@@file' against the directory of the including file.",
            ),
            Self::IncludeCycle { .. } => Some("Remove one of the '@' directives that form the cycle."),
            Self::IncludeDepthExceeded { .. } => {
                Some("Flatten the include hierarchy or raise plugins.sqlplus_includes.max_depth.")
            }
            Self::UndefinedVariable { .. } => {
                Some("Add a DEFINE for the variable above its first use.")
            }
            Self::MalformedDefine { .. } => {
                Some("Use DEFINE name = 'value' or DEFINE name = value.")
            }
            Self::StageExecution(err) => err.source.fix_hint(),
            Self::Config(err) => err.fix_hint(),
            Self::Template(_) | Self::Io { .. } => None,
        }
    }
}

fn format_chain(chain: &[PathBuf]) -> String {
    chain
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Error raised when a stage fails, tagged with the stage name.
#[derive(Debug, Error)]
#[error("Error in stage '{stage}': {source}")]
pub struct StageExecutionError {
    /// The failing stage.
    pub stage: String,
    /// What went wrong inside the stage.
    #[source]
    pub source: Box<MergeError>,
}

impl StageExecutionError {
    /// Wraps an error raised by `stage`.
    #[must_use]
    pub fn new(stage: impl Into<String>, source: MergeError) -> Self {
        Self {
            stage: stage.into(),
            source: Box::new(source),
        }
    }

    /// Returns the wrapped error.
    #[must_use]
    pub fn inner(&self) -> &MergeError {
        &self.source
    }
}

/// Errors raised while loading `MKFSource.toml`.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// The configuration file does not exist.
    #[error("Configuration file not found: {} (current directory: {})", path.display(), cwd.display())]
    NotFound {
        /// The path that was looked up.
        path: PathBuf,
        /// The working directory at lookup time.
        cwd: PathBuf,
    },

    /// The file is not valid TOML or has the wrong shape.
    #[error("Invalid TOML in {}: {message}", path.display())]
    Syntax {
        /// The configuration file.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// A required key is absent or empty.
    #[error("Missing required parameter '{key}' in {}", path.display())]
    MissingKey {
        /// The configuration file.
        path: PathBuf,
        /// Dotted key name, e.g. `project.input`.
        key: String,
    },

    /// A `[plugins.<name>]` table does not match the stage's settings.
    #[error("Invalid settings for stage '{stage}': {message}")]
    InvalidSettings {
        /// The stage name.
        stage: String,
        /// Deserializer message.
        message: String,
    },
}

impl ConfigError {
    /// Returns a stable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "CONFIG-NOT-FOUND",
            Self::Syntax { .. } => "CONFIG-SYNTAX",
            Self::MissingKey { .. } => "CONFIG-MISSING-KEY",
            Self::InvalidSettings { .. } => "CONFIG-STAGE-SETTINGS",
        }
    }

    /// Returns a hint for fixing the error.
    #[must_use]
    pub fn fix_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } | Self::MissingKey { .. } => Some(
                "A minimal MKFSource.toml needs:\n  [project]\n  input = \"main.sql\"\n  output = \"merged.sql\"",
            ),
            Self::Syntax { .. } => Some(
                "Sections use brackets ([project]), strings are quoted and booleans are true/false.",
            ),
            Self::InvalidSettings { .. } => None,
        }
    }
}
