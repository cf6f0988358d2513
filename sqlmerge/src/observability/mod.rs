//! Stage timing for the pipeline report.
//!
//! Logging goes through `tracing`; installing a subscriber is left to the
//! binary.

use crate::core::{StageOutcome, StageRecord};
use std::time::Instant;
use tracing::debug;

/// Clock for one entry of the execution order.
///
/// Skipped stages are recorded with a zero duration regardless of how long
/// the skip decision took.
#[derive(Debug)]
pub struct StageTimer {
    stage: String,
    started: Instant,
}

impl StageTimer {
    /// Starts timing `stage`.
    #[must_use]
    pub fn start(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            started: Instant::now(),
        }
    }

    /// Milliseconds since [`StageTimer::start`].
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    /// Stops the clock and builds the report entry for `outcome`.
    #[must_use]
    pub fn record(self, outcome: &StageOutcome) -> StageRecord {
        let record = match outcome {
            StageOutcome::Executed(_) => StageRecord::executed(&self.stage, self.elapsed_ms()),
            StageOutcome::Skipped { reason, .. } => StageRecord::skipped(&self.stage, *reason),
        };
        debug!(
            stage = %self.stage,
            status = %record.status,
            duration_ms = record.duration_ms,
            "Stage timed"
        );
        record
    }
}
