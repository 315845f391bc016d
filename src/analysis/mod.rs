//! Scope-aware static analysis of JavaScript programs
//!
//! This module provides the single traversal pass and the artifacts it builds:
//! - Scope chain tracking (global scope plus function scopes)
//! - The `scope:variable` tracking table
//! - Update sites for every variable mutation
//! - Diagnostics for constructs the engine cannot attribute

pub mod diagnostics;
pub mod location;
pub mod scope_chain;
pub mod shape;
pub mod state_table;
pub mod traversal;
pub mod update_sites;

pub use diagnostics::{AnalysisDiagnostic, DiagnosticKind};
pub use location::{LineIndex, Location};
pub use scope_chain::{child_scope_name, ScopeChain, ScopeFrame, GLOBAL_SCOPE};
pub use shape::{AssignmentTargetName, NodeShape, ANONYMOUS_SCOPE};
pub use state_table::{state_key, StateTable};
pub use traversal::{Analysis, ScopeVisitor};
pub use update_sites::{UpdateSite, UpdateSiteCollector, AUTOGEN_MARKER};
