//! Non-fatal anomalies found during analysis

use crate::analysis::location::Location;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A function expression reached the engine without a synthetic name
    NotDeanonymized,
    /// A function scope had no name to derive its key from
    AnonymousScope,
    /// A mutation or assignment target could not be resolved to a variable
    UnresolvedTarget,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisDiagnostic {
    pub kind: DiagnosticKind,
    pub location: Location,
    pub message: String,
}

impl AnalysisDiagnostic {
    pub fn new(kind: DiagnosticKind, location: Location, message: impl Into<String>) -> Self {
        Self {
            kind,
            location,
            message: message.into(),
        }
    }
}

impl fmt::Display for AnalysisDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.location, self.message)
    }
}
