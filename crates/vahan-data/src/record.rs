//! Tidy registration records.

use crate::calendar::month_end;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Region tag applied when a source does not carry one.
pub const DEFAULT_STATE: &str = "India";

/// One monthly registration count.
///
/// A record without a manufacturer is a category-level aggregate; a record
/// with one is a manufacturer-level observation within that category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TidyRecord {
    /// Month of the observation, normalized to the last day of the month
    pub date: NaiveDate,
    /// Region tag, carried through unchanged
    pub state: String,
    /// Vehicle class (e.g. "2W", "3W", "4W")
    pub category: String,
    /// Manufacturer, absent for category-level rows
    pub manufacturer: Option<String>,
    /// Registration count
    pub registrations: u64,
}

impl TidyRecord {
    /// Create a category-level record, normalizing `date` to month end.
    pub fn category_level(
        date: NaiveDate,
        state: impl Into<String>,
        category: impl Into<String>,
        registrations: u64,
    ) -> Self {
        Self {
            date: month_end(date),
            state: state.into(),
            category: category.into(),
            manufacturer: None,
            registrations,
        }
    }

    /// Create a manufacturer-level record, normalizing `date` to month end.
    pub fn manufacturer_level(
        date: NaiveDate,
        state: impl Into<String>,
        category: impl Into<String>,
        manufacturer: impl Into<String>,
        registrations: u64,
    ) -> Self {
        Self {
            date: month_end(date),
            state: state.into(),
            category: category.into(),
            manufacturer: Some(manufacturer.into()),
            registrations,
        }
    }

    /// Whether this row is a category-level aggregate.
    pub const fn is_aggregate(&self) -> bool {
        self.manufacturer.is_none()
    }
}
