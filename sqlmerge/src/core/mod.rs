//! Core domain model types for the pipeline.
//!
//! This module contains:
//! - Stage status and skip reasons
//! - The explicit executed/skipped outcome of a single stage
//! - Per-stage execution records written to context metadata

mod outcome;
mod status;

pub use outcome::{StageOutcome, StageRecord};
pub use status::{SkipReason, StageStatus};
