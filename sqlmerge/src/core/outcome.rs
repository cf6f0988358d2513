//! Outcome of running a single stage and the record kept for it.

use super::{SkipReason, StageStatus};
use crate::context::ProcessingContext;
use serde::{Deserialize, Serialize};

/// What happened when the pipeline reached one name in its execution order.
///
/// Both variants hand the context back, so the caller keeps ownership of
/// the buffer whether or not the stage ran.
#[derive(Debug)]
pub enum StageOutcome {
    /// The stage ran; this is the context it returned.
    Executed(ProcessingContext),
    /// The stage did not run; the context is returned untouched.
    Skipped {
        /// The unchanged context.
        context: ProcessingContext,
        /// Why the stage was skipped.
        reason: SkipReason,
    },
}

impl StageOutcome {
    /// Returns the status without the context.
    #[must_use]
    pub fn status(&self) -> StageStatus {
        match self {
            Self::Executed(_) => StageStatus::Executed,
            Self::Skipped { reason, .. } => StageStatus::Skipped(*reason),
        }
    }

    /// Consumes the outcome and returns the context.
    #[must_use]
    pub fn into_context(self) -> ProcessingContext {
        match self {
            Self::Executed(context) | Self::Skipped { context, .. } => context,
        }
    }
}

/// Diagnostic entry for one position in the execution order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageRecord {
    /// Stage name as written in the execution order.
    pub name: String,
    /// Executed or skipped.
    #[serde(flatten)]
    pub status: StageStatus,
    /// Wall time spent in `process`, zero when skipped.
    pub duration_ms: f64,
}

impl StageRecord {
    /// Creates a record for an executed stage.
    #[must_use]
    pub fn executed(name: impl Into<String>, duration_ms: f64) -> Self {
        Self {
            name: name.into(),
            status: StageStatus::Executed,
            duration_ms,
        }
    }

    /// Creates a record for a skipped stage.
    #[must_use]
    pub fn skipped(name: impl Into<String>, reason: SkipReason) -> Self {
        Self {
            name: name.into(),
            status: StageStatus::Skipped(reason),
            duration_ms: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_status() {
        let ctx = ProcessingContext::new("main.sql", ".");
        let outcome = StageOutcome::Skipped {
            context: ctx,
            reason: SkipReason::Disabled,
        };
        assert_eq!(outcome.status(), StageStatus::Skipped(SkipReason::Disabled));

        let ctx = outcome.into_context();
        let outcome = StageOutcome::Executed(ctx);
        assert!(outcome.status().is_executed());
    }

    #[test]
    fn test_record_serialization() {
        let record = StageRecord::skipped("template", SkipReason::Unregistered);
        let json = serde_json::to_value(&record).unwrap();

        assert_eq!(json["name"], "template");
        assert_eq!(json["status"], "skipped");
        assert_eq!(json["reason"], "unregistered");
        assert_eq!(json["duration_ms"], 0.0);
    }
}
