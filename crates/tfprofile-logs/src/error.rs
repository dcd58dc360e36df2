//! Error types for tfprofile-logs

use thiserror::Error;

/// Errors raised while reading, parsing or sorting a log
#[derive(Error, Debug)]
pub enum Error {
    /// The input stream could not be opened or read
    #[error("failed to read log: {0}")]
    Source(#[from] std::io::Error),

    /// A recognized line carried an unparsable duration or address
    #[error("parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    /// The sort specification is malformed or names an unknown field
    #[error("invalid sort specification: {0}")]
    SortConfig(String),
}

impl Error {
    /// Parse error for the 0-based line `index`, reported 1-based
    pub(crate) fn parse(index: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line: index + 1,
            message: message.into(),
        }
    }
}

/// Result type alias for tfprofile-logs
pub type Result<T> = std::result::Result<T, Error>;
