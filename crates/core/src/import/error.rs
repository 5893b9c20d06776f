//! Import error types.

use thiserror::Error;

/// Errors reading a FEC file. Row-level problems are not errors; they are
/// reported in the import outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FecError {
    /// The file could not be read.
    #[error("Cannot read file: {0}")]
    Io(String),

    /// The file is empty or has no header row.
    #[error("File is empty")]
    Empty,

    /// A mandatory column is missing from the header.
    #[error("Missing mandatory column: {0}")]
    MissingColumn(&'static str),

    /// Malformed CSV.
    #[error("Malformed record at line {line}: {message}")]
    Malformed {
        /// One-based line number.
        line: u64,
        /// Parser message.
        message: String,
    },
}

impl FecError {
    /// Returns the error code for this error.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "FEC_IO",
            Self::Empty => "FEC_EMPTY",
            Self::MissingColumn(_) => "FEC_MISSING_COLUMN",
            Self::Malformed { .. } => "FEC_MALFORMED",
        }
    }
}

impl From<std::io::Error> for FecError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<csv::Error> for FecError {
    fn from(err: csv::Error) -> Self {
        let line = err.position().map_or(0, csv::Position::line);
        Self::Malformed {
            line,
            message: err.to_string(),
        }
    }
}
