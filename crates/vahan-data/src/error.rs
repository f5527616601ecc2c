//! Error types for data operations.

use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur during data operations.
#[derive(Debug, Error)]
pub enum DataError {
    /// A raw source is missing required columns
    #[error("{file} is missing required columns: {}", missing.join(", "))]
    Schema {
        /// Name of the offending source
        file: String,
        /// Required columns that were not found
        missing: Vec<String>,
    },

    /// Neither raw export was found
    #[error("No raw files found in {0}; place CSV exports there and re-run")]
    NoRawSources(String),

    /// Data parsing error
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// Invalid date range
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date of the range
        start: String,
        /// End date of the range
        end: String,
    },

    /// Catalog definition error
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
