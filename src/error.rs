use miette::Diagnostic;
use thiserror::Error;

use crate::analysis::Location;

/// Result type for instrumentation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Custom error types for the state tracker
#[derive(Error, Debug, Diagnostic, Clone)]
pub enum Error {
    #[error("I/O error: {0}")]
    #[diagnostic(code(state_tracker::io_error))]
    Io(String),

    #[error("Failed to parse {file}: {message}")]
    #[diagnostic(
        code(state_tracker::parse_error),
        help("the input must be a syntactically valid JavaScript program")
    )]
    Parse { file: String, message: String },

    #[error("Update site {location} is outside the source ({line_count} lines)")]
    #[diagnostic(
        code(state_tracker::patch_out_of_range),
        help("update sites must come from an analysis of the same source text")
    )]
    PatchOutOfRange { location: Location, line_count: usize },

    #[error("Invalid location key '{key}': expected <line>.<column>")]
    #[diagnostic(code(state_tracker::invalid_location))]
    InvalidLocation { key: String },

    #[error("Invalid tracking-table identifier '{name}'")]
    #[diagnostic(
        code(state_tracker::invalid_identifier),
        help("use a plain JavaScript identifier such as `stateManager`")
    )]
    InvalidIdentifier { name: String },

    #[error("Serialization failed: {message}")]
    #[diagnostic(code(state_tracker::serialization_error))]
    Serialization { message: String },
}

impl Error {
    /// Create a parse error for the named input
    pub fn parse(file: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Parse {
            file: file.into(),
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization {
            message: err.to_string(),
        }
    }
}
