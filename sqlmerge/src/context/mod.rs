//! The processing context shared by pipeline stages.
//!
//! One [`ProcessingContext`] is created per input file. Each stage takes it
//! by value and hands back the (possibly rewritten) context, so the text
//! buffer is never aliased between stages.

mod processing;

pub use processing::ProcessingContext;
