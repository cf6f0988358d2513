//! SQL*Plus script preprocessing.
//!
//! This module provides:
//! - [`IncludeResolver`]: recursive expansion of `@file` / `@@file` lines
//! - [`VariableSubstitutor`]: DEFINE / UNDEFINE handling and `&name` substitution
//! - [`DefineTable`]: the variable table mutated during a substitution pass

mod define_table;
mod includes;
#[cfg(test)]
mod includes_tests;
mod loader;
mod substitute;
mod tree;

pub use define_table::DefineTable;
pub use includes::{IncludeResolver, Resolved, DEFAULT_MAX_DEPTH};
pub use loader::{FsLoader, SourceLoader};
pub use substitute::{ReplacementStats, Substitution, VariableSubstitutor};
pub use tree::{IncludeKind, IncludeNode, IncludeTree};
