//! # sqlmerge
//!
//! Merges SQL*Plus scripts into a single deployable file.
//!
//! A run threads one [`ProcessingContext`](context::ProcessingContext)
//! through an explicitly ordered list of stages:
//!
//! - **`sqlplus_includes`**: expands `@file` and `@@file` lines recursively
//! - **`sqlplus_vars`**: applies `DEFINE` / `UNDEFINE` and replaces `&name` references
//! - **`template`**: renders the result as a handlebars template
//!
//! Hosts can register additional stages through [`pipeline::StageFactory`].
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sqlmerge::prelude::*;
//!
//! let config = MergeConfig::load("MKFSource.toml")?;
//! let registry = StageFactory::with_builtins().build_registry(&config)?;
//! let pipeline = Pipeline::new(registry, config.execution_order().to_vec());
//!
//! let ctx = ProcessingContext::from_file(&config.project.input)?
//!     .with_variables(config.load_variables());
//! let merged = pipeline.execute(ctx)?.content;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]
#![cfg_attr(test, allow(clippy::unwrap_used, clippy::expect_used))]

pub mod config;
pub mod context;
pub mod core;
pub mod errors;
pub mod observability;
pub mod pipeline;
pub mod sqlplus;
pub mod stages;
pub mod template;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{
        IncludeSettings, MergeConfig, ProjectConfig, StageSettings, TemplateSettings,
        VariableSettings, DEFAULT_CONFIG_FILE,
    };
    pub use crate::context::ProcessingContext;
    pub use crate::core::{SkipReason, StageOutcome, StageRecord, StageStatus};
    pub use crate::errors::{ConfigError, MergeError, Result, StageExecutionError};
    pub use crate::pipeline::{Pipeline, StageFactory, StageRegistry};
    pub use crate::sqlplus::{
        DefineTable, IncludeResolver, IncludeTree, Resolved, Substitution, VariableSubstitutor,
    };
    pub use crate::stages::{
        FnStage, IncludeStage, Stage, StageKind, TemplateStage, VariableStage,
    };
    pub use crate::template::TemplateRenderer;
}
