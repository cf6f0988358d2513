//! Sequential execution of an ordered list of stages.

use super::registry::StageRegistry;
use crate::context::ProcessingContext;
use crate::core::{SkipReason, StageOutcome};
use crate::errors::{Result, StageExecutionError};
use crate::observability::StageTimer;
use serde_json::Value;
use tracing::{debug, info, warn};

/// Metadata key holding the per-stage execution records.
pub const STAGES_METADATA_KEY: &str = "pipeline.stages";

/// Runs stages from a registry in a caller-supplied order.
///
/// No ordering is inferred: if one stage depends on another's output, the
/// execution order must list them accordingly.
#[derive(Debug)]
pub struct Pipeline {
    registry: StageRegistry,
    order: Vec<String>,
}

impl Pipeline {
    /// Creates a pipeline.
    #[must_use]
    pub fn new(registry: StageRegistry, order: Vec<String>) -> Self {
        Self { registry, order }
    }

    /// Returns the execution order.
    #[must_use]
    pub fn order(&self) -> &[String] {
        &self.order
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &StageRegistry {
        &self.registry
    }

    /// Runs every stage in order.
    ///
    /// Unregistered and disabled stages are skipped. The first stage error
    /// aborts the run; the partially processed context is dropped.
    ///
    /// # Errors
    ///
    /// Returns [`crate::errors::MergeError::StageExecution`] naming the failing stage.
    pub fn execute(&self, mut ctx: ProcessingContext) -> Result<ProcessingContext> {
        let run_id = ctx.run_id();
        info!(%run_id, stages = self.order.len(), "Starting pipeline");

        let mut records = Vec::with_capacity(self.order.len());
        for name in &self.order {
            let timer = StageTimer::start(name.as_str());
            let outcome = self.run_stage(name, ctx)?;
            let record = timer.record(&outcome);
            ctx = outcome.into_context();

            if ctx.verbose {
                info!(
                    stage = %name,
                    status = %record.status,
                    duration_ms = record.duration_ms,
                    "Stage finished"
                );
            }
            records.push(record);
        }

        let report = serde_json::to_value(&records).unwrap_or(Value::Null);
        ctx.set_metadata(STAGES_METADATA_KEY, report);
        info!(%run_id, "Pipeline finished");
        Ok(ctx)
    }

    /// Runs the stage registered as `name`, or reports why it was skipped.
    ///
    /// # Errors
    ///
    /// Wraps any stage error in a [`StageExecutionError`].
    pub fn run_stage(&self, name: &str, ctx: ProcessingContext) -> Result<StageOutcome> {
        let Some(stage) = self.registry.get(name) else {
            warn!(stage = %name, "Stage not registered, skipping");
            return Ok(StageOutcome::Skipped {
                context: ctx,
                reason: SkipReason::Unregistered,
            });
        };

        if !stage.is_enabled() {
            debug!(stage = %name, "Stage disabled, skipping");
            return Ok(StageOutcome::Skipped {
                context: ctx,
                reason: SkipReason::Disabled,
            });
        }

        if ctx.verbose {
            info!(stage = %name, "Running stage");
        }

        stage
            .process(ctx)
            .map(StageOutcome::Executed)
            .map_err(|e| StageExecutionError::new(name, e).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stages::FnStage;

    #[test]
    fn test_run_stage_outcomes() {
        let registry = StageRegistry::new()
            .with_stage(Box::new(FnStage::new("on", Ok)))
            .with_stage(Box::new(FnStage::new("off", Ok).with_enabled(false)));
        let pipeline = Pipeline::new(registry, Vec::new());
        let ctx = || ProcessingContext::new("a.sql", ".");

        let outcome = pipeline.run_stage("on", ctx()).unwrap();
        assert!(outcome.status().is_executed());

        let outcome = pipeline.run_stage("off", ctx()).unwrap();
        assert!(matches!(
            outcome,
            StageOutcome::Skipped {
                reason: SkipReason::Disabled,
                ..
            }
        ));

        let outcome = pipeline.run_stage("ghost", ctx()).unwrap();
        assert!(matches!(
            outcome,
            StageOutcome::Skipped {
                reason: SkipReason::Unregistered,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_order_is_identity() {
        let pipeline = Pipeline::new(StageRegistry::new(), Vec::new());
        let out = pipeline
            .execute(ProcessingContext::new("a.sql", ".").with_content("x"))
            .unwrap();

        assert_eq!(out.content, "x");
        assert_eq!(out.metadata(STAGES_METADATA_KEY), Some(&serde_json::json!([])));
    }
}
