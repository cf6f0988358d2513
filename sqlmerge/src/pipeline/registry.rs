//! Name-keyed registry of stage instances.

use crate::stages::Stage;
use std::collections::HashMap;
use std::fmt;

/// Stages available to a pipeline, keyed by name.
#[derive(Default)]
pub struct StageRegistry {
    stages: HashMap<String, Box<dyn Stage>>,
}

impl StageRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a stage under its own name, replacing any previous one.
    pub fn register(&mut self, stage: Box<dyn Stage>) {
        let name = stage.name().to_string();
        self.insert(name, stage);
    }

    /// Registers a stage under an explicit name.
    pub fn insert(&mut self, name: impl Into<String>, stage: Box<dyn Stage>) {
        self.stages.insert(name.into(), stage);
    }

    /// Builder-style [`Self::register`].
    #[must_use]
    pub fn with_stage(mut self, stage: Box<dyn Stage>) -> Self {
        self.register(stage);
        self
    }

    /// Looks up a stage.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn Stage> {
        self.stages.get(name).map(AsRef::as_ref)
    }

    /// Returns true if a stage is registered under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.stages.contains_key(name)
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.stages.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered stages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    /// Returns true if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl fmt::Debug for StageRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StageRegistry")
            .field("stages", &self.names())
            .finish()
    }
}
