//! Error types for growth queries.

use thiserror::Error;

/// Result type for growth operations.
pub type Result<T> = std::result::Result<T, GrowthError>;

/// Errors that can occur while building growth queries.
///
/// The engine itself never fails: empty input gives empty output and a
/// missing or zero baseline gives an absent percentage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GrowthError {
    /// Invalid date range
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date of the range
        start: String,
        /// End date of the range
        end: String,
    },

    /// Unknown grouping field name
    #[error("Unknown group field: {0} (expected state, category or manufacturer)")]
    UnknownGroupField(String),
}
