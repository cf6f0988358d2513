//! Mutable unit of work threaded through the pipeline.

use crate::errors::{MergeError, Result};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// The state handed from stage to stage while processing one input file.
#[derive(Debug, Clone)]
pub struct ProcessingContext {
    /// Current text buffer. Each stage replaces it wholesale.
    pub content: String,
    /// The original input file.
    pub source_path: PathBuf,
    /// Directory that anchors `@file` inclusions.
    pub base_path: PathBuf,
    /// Variables visible to the template stage.
    pub variables: HashMap<String, Value>,
    /// Free-form diagnostics written by stages.
    pub metadata: HashMap<String, Value>,
    /// Verbose logging toggle. Stages only read it.
    pub verbose: bool,
    run_id: Uuid,
    started_at: DateTime<Utc>,
}

impl ProcessingContext {
    /// Creates an empty context for `source_path`, anchored at `base_path`.
    #[must_use]
    pub fn new(source_path: impl Into<PathBuf>, base_path: impl Into<PathBuf>) -> Self {
        Self {
            content: String::new(),
            source_path: source_path.into(),
            base_path: base_path.into(),
            variables: HashMap::new(),
            metadata: HashMap::new(),
            verbose: false,
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
        }
    }

    /// Creates a context whose content is the text of `path`.
    ///
    /// The base path is the file's parent directory.
    ///
    /// # Errors
    ///
    /// Returns [`MergeError::ResourceNotFound`] if the file does not exist.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(MergeError::not_found(path));
        }
        let content = std::fs::read_to_string(path).map_err(|e| MergeError::io(path, e))?;
        let base = path.parent().map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        Ok(Self::new(path, base).with_content(content))
    }

    /// Sets the content.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Seeds the template variables.
    #[must_use]
    pub fn with_variables(mut self, variables: HashMap<String, Value>) -> Self {
        self.variables.extend(variables);
        self
    }

    /// Sets the verbose flag.
    #[must_use]
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Replaces the content.
    pub fn update_content(&mut self, content: String) {
        self.content = content;
    }

    /// Sets a template variable, returning the previous value.
    pub fn set_variable(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.variables.insert(key.into(), value)
    }

    /// Gets a template variable.
    #[must_use]
    pub fn variable(&self, key: &str) -> Option<&Value> {
        self.variables.get(key)
    }

    /// Records a metadata entry.
    pub fn set_metadata(&mut self, key: impl Into<String>, value: Value) {
        self.metadata.insert(key.into(), value);
    }

    /// Reads a metadata entry.
    #[must_use]
    pub fn metadata(&self, key: &str) -> Option<&Value> {
        self.metadata.get(key)
    }

    /// Returns the unique ID of this processing run.
    #[must_use]
    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Returns when the context was created.
    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }
}
