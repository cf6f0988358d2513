//! Mock stages for testing.

use parking_lot::Mutex;

use crate::context::ProcessingContext;
use crate::errors::{MergeError, Result};
use crate::stages::Stage;

/// A stage that records the content it sees and passes it through.
#[derive(Debug)]
pub struct RecordingStage {
    name: String,
    enabled: bool,
    seen: Mutex<Vec<String>>,
}

impl RecordingStage {
    /// Creates a new recording stage.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Marks the stage as disabled.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Returns the number of times the stage was called.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.seen.lock().len()
    }

    /// Returns the content of each call, in order.
    #[must_use]
    pub fn recorded_contents(&self) -> Vec<String> {
        self.seen.lock().clone()
    }
}

impl Stage for RecordingStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn process(&self, ctx: ProcessingContext) -> Result<ProcessingContext> {
        self.seen.lock().push(ctx.content.clone());
        Ok(ctx)
    }
}

/// A stage that always fails.
#[derive(Debug)]
pub struct FailingStage {
    name: String,
    error: String,
}

impl FailingStage {
    /// Creates a new failing stage. The error is reported as a template error.
    #[must_use]
    pub fn new(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            error: error.into(),
        }
    }
}

impl Stage for FailingStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&self, _ctx: ProcessingContext) -> Result<ProcessingContext> {
        Err(MergeError::Template(self.error.clone()))
    }
}

/// A stage that appends a fixed suffix to the content.
#[derive(Debug)]
pub struct AppendStage {
    name: String,
    suffix: String,
    enabled: bool,
}

impl AppendStage {
    /// Creates a new append stage.
    #[must_use]
    pub fn new(name: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            suffix: suffix.into(),
            enabled: true,
        }
    }

    /// Marks the stage as disabled.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

impl Stage for AppendStage {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn process(&self, mut ctx: ProcessingContext) -> Result<ProcessingContext> {
        ctx.content.push_str(&self.suffix);
        Ok(ctx)
    }
}
