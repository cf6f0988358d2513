//! Stage status and skip reasons.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why the pipeline did not run a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The stage is registered but reports itself disabled.
    Disabled,
    /// The execution order names a stage that is not in the registry.
    Unregistered,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "disabled"),
            Self::Unregistered => write!(f, "unregistered"),
        }
    }
}

/// The result status of one entry in the execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "reason")]
pub enum StageStatus {
    /// The stage ran and returned a new context.
    Executed,
    /// The stage was not run.
    Skipped(SkipReason),
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Executed => write!(f, "executed"),
            Self::Skipped(reason) => write!(f, "skipped ({reason})"),
        }
    }
}

impl StageStatus {
    /// Returns true if the stage ran.
    #[must_use]
    pub fn is_executed(&self) -> bool {
        matches!(self, Self::Executed)
    }

    /// Returns true if the stage was skipped.
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }
}
