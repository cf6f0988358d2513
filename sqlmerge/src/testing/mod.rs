//! Testing utilities for sqlmerge pipelines.
//!
//! This module provides:
//! - A temporary SQL file tree for include tests
//! - Mock stages for pipeline tests
//! - Log capture for asserting on warnings (crate tests only)

mod fixtures;
#[cfg(test)]
mod logs;
mod mocks;

pub use fixtures::SqlTree;
#[cfg(test)]
pub(crate) use logs::CapturedLogs;
pub use mocks::{AppendStage, FailingStage, RecordingStage};
