//! Dashboard query filters.

use crate::error::{GrowthError, Result};
use crate::group::{GroupBy, GroupField};
use chrono::NaiveDate;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use vahan_data::TidyRecord;
use vahan_data::calendar::month_end;

/// Filter over tidy records: an inclusive month range plus category and
/// manufacturer sets. An empty set does not filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Query {
    date_range: Option<(NaiveDate, NaiveDate)>,
    categories: BTreeSet<String>,
    manufacturers: BTreeSet<String>,
}

impl Query {
    /// A query matching every record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to the months from `start` to `end`, inclusive.
    ///
    /// Both bounds are normalized to month end.
    pub fn with_date_range(mut self, start: NaiveDate, end: NaiveDate) -> Result<Self> {
        let (start, end) = (month_end(start), month_end(end));
        if start > end {
            return Err(GrowthError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        self.date_range = Some((start, end));
        Ok(self)
    }

    /// Restrict to these categories.
    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Restrict to these manufacturers. Category-level rows never match a
    /// non-empty manufacturer filter.
    pub fn with_manufacturers<I, S>(mut self, manufacturers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.manufacturers = manufacturers.into_iter().map(Into::into).collect();
        self
    }

    /// Normalized date range, if any.
    pub const fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        self.date_range
    }

    /// Category filter.
    pub const fn categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    /// Manufacturer filter.
    pub const fn manufacturers(&self) -> &BTreeSet<String> {
        &self.manufacturers
    }

    /// Upper bound of the date range, used as the snapshot cutoff.
    pub fn as_of(&self) -> Option<NaiveDate> {
        self.date_range.map(|(_, end)| end)
    }

    /// Whether `record` passes every filter.
    pub fn matches(&self, record: &TidyRecord) -> bool {
        let in_range = self
            .date_range
            .is_none_or(|(start, end)| (start..=end).contains(&month_end(record.date)));
        let category_ok = self.categories.is_empty() || self.categories.contains(&record.category);
        let manufacturer_ok = self.manufacturers.is_empty()
            || record
                .manufacturer
                .as_ref()
                .is_some_and(|m| self.manufacturers.contains(m));

        in_range && category_ok && manufacturer_ok
    }

    /// Records passing every filter, in input order.
    pub fn apply(&self, records: &[TidyRecord]) -> Vec<TidyRecord> {
        records.iter().filter(|r| self.matches(r)).cloned().collect()
    }
}

/// Granularity of a tidy record.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordLevel {
    /// Category-level aggregate (no manufacturer)
    #[display("aggregate")]
    Aggregate,
    /// Manufacturer-level observation
    #[display("manufacturer")]
    Manufacturer,
}

impl RecordLevel {
    /// Level of `record`.
    pub const fn of(record: &TidyRecord) -> Self {
        if record.is_aggregate() {
            Self::Aggregate
        } else {
            Self::Manufacturer
        }
    }
}

/// Split records into (category-level aggregates, manufacturer rows).
pub fn split_levels(records: &[TidyRecord]) -> (Vec<TidyRecord>, Vec<TidyRecord>) {
    records
        .iter()
        .cloned()
        .partition(|r| RecordLevel::of(r) == RecordLevel::Aggregate)
}

/// Rows to aggregate for `group_by`, so that a category-level row and the
/// manufacturer rows it summarizes are never counted together.
///
/// Grouping by manufacturer uses manufacturer rows only. Any other grouping
/// decides per (state, category, month) cell: the cell's category-level rows
/// when it has any, otherwise its manufacturer rows. Input order is kept.
pub fn level_rows(records: &[TidyRecord], group_by: &GroupBy) -> Vec<TidyRecord> {
    if group_by.contains(GroupField::Manufacturer) {
        return records.iter().filter(|r| !r.is_aggregate()).cloned().collect();
    }

    let covered: HashSet<(&str, &str, NaiveDate)> = records
        .iter()
        .filter(|r| r.is_aggregate())
        .map(|r| (r.state.as_str(), r.category.as_str(), month_end(r.date)))
        .collect();

    records
        .iter()
        .filter(|&r| {
            r.is_aggregate()
                || !covered.contains(&(r.state.as_str(), r.category.as_str(), month_end(r.date)))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Vec<TidyRecord> {
        vec![
            TidyRecord::category_level(ymd(2024, 1, 31), "India", "2W", 100),
            TidyRecord::manufacturer_level(ymd(2024, 1, 31), "India", "2W", "Hero", 60),
            TidyRecord::manufacturer_level(ymd(2024, 2, 29), "India", "2W", "Hero", 70),
            TidyRecord::manufacturer_level(ymd(2024, 2, 29), "India", "4W", "Tata", 20),
        ]
    }

    #[test]
    fn test_unfiltered() {
        assert_eq!(Query::new().apply(&sample()).len(), 4);
    }

    #[test]
    fn test_date_range_is_month_inclusive() {
        let query = Query::new()
            .with_date_range(ymd(2024, 2, 1), ymd(2024, 2, 1))
            .unwrap();

        let view = query.apply(&sample());
        assert_eq!(view.len(), 2);
        assert_eq!(query.as_of(), Some(ymd(2024, 2, 29)));
    }

    #[test]
    fn test_reversed_range_rejected() {
        let err = Query::new()
            .with_date_range(ymd(2024, 3, 1), ymd(2024, 1, 1))
            .unwrap_err();
        assert!(matches!(err, GrowthError::InvalidDateRange { .. }));
    }

    #[test]
    fn test_manufacturer_filter_drops_aggregates() {
        let view = Query::new().with_manufacturers(["Hero"]).apply(&sample());
        assert_eq!(view.len(), 2);
        assert!(view.iter().all(|r| r.manufacturer.as_deref() == Some("Hero")));
    }

    #[test]
    fn test_category_filter() {
        let view = Query::new().with_categories(["4W"]).apply(&sample());
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].category, "4W");
    }

    #[test]
    fn test_split_levels() {
        let (aggregates, manufacturers) = split_levels(&sample());
        assert_eq!(aggregates.len(), 1);
        assert_eq!(manufacturers.len(), 3);
        assert_eq!(RecordLevel::of(&aggregates[0]).to_string(), "aggregate");
    }

    #[test]
    fn test_level_rows_per_cell() {
        // 2W January has an aggregate; 2W February and 4W only manufacturers.
        let rows = level_rows(&sample(), &GroupBy::category());
        assert_eq!(rows.len(), 3);
        assert!(rows[0].is_aggregate());
        assert_eq!(rows[1].date, ymd(2024, 2, 29));
        assert_eq!(rows[2].category, "4W");

        let manufacturers = level_rows(&sample(), &GroupBy::manufacturer());
        assert_eq!(manufacturers.len(), 3);
        assert!(manufacturers.iter().all(|r| !r.is_aggregate()));
    }
}
