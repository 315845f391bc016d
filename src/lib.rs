//! js-state-tracker: scope-aware state tracking for JavaScript programs
//!
//! This library walks a parsed program once, records every variable
//! declaration, parameter and assignment in a flat `scope:variable` tracking
//! table, and instruments the source so the table follows the program's
//! runtime mutations.

pub mod analysis;
pub mod cli;
pub mod error;
pub mod instrumenter;
pub mod patch;

pub use error::{Error, Result};
pub use instrumenter::{ArtifactPaths, InstrumentOptions, InstrumentOutput, Instrumenter};

// Re-export commonly used types
pub use analysis::{Analysis, Location, ScopeFrame, StateTable, UpdateSite};
pub use patch::SourcePatcher;
