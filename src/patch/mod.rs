//! Source patching
//!
//! Turns the tracking table and update sites collected by the analysis into
//! the instrumented program text.

pub mod source_patcher;

pub use source_patcher::{splice, SourcePatcher, HEADER_END, HEADER_LINES, HEADER_START};
