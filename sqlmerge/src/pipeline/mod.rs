//! Pipeline building and execution.
//!
//! This module provides:
//! - The stage registry
//! - The stage factory that builds a registry from configuration
//! - The sequential executor

mod executor;
mod factory;
mod registry;

pub use executor::{Pipeline, STAGES_METADATA_KEY};
pub use factory::{StageConstructor, StageFactory};
pub use registry::StageRegistry;
