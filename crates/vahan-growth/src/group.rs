//! Grouping dimensions.
//!
//! A [`GroupBy`] picks which non-date fields of a [`TidyRecord`] identify a
//! time series; a [`GroupKey`] holds the values of those fields for one series.

use crate::error::GrowthError;
use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use vahan_data::TidyRecord;

/// A dimension field of a tidy record.
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum GroupField {
    /// Region tag
    #[display("state")]
    State,
    /// Vehicle category
    #[display("category")]
    Category,
    /// Manufacturer
    #[display("manufacturer")]
    Manufacturer,
}

impl FromStr for GroupField {
    type Err = GrowthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "state" => Ok(Self::State),
            "category" => Ok(Self::Category),
            "manufacturer" => Ok(Self::Manufacturer),
            other => Err(GrowthError::UnknownGroupField(other.to_string())),
        }
    }
}

/// Set of fields defining a distinct time series.
///
/// The empty set groups every record into a single total series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct GroupBy {
    fields: BTreeSet<GroupField>,
}

impl GroupBy {
    /// Group by the given fields.
    pub fn new(fields: impl IntoIterator<Item = GroupField>) -> Self {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    /// A single series over all records.
    pub fn total() -> Self {
        Self::default()
    }

    /// One series per manufacturer.
    pub fn manufacturer() -> Self {
        Self::new([GroupField::Manufacturer])
    }

    /// One series per category.
    pub fn category() -> Self {
        Self::new([GroupField::Category])
    }

    /// Whether `field` is part of the grouping.
    pub fn contains(&self, field: GroupField) -> bool {
        self.fields.contains(&field)
    }

    /// Grouped fields in canonical order.
    pub fn fields(&self) -> impl Iterator<Item = GroupField> + '_ {
        self.fields.iter().copied()
    }

    /// Key of the series `record` belongs to.
    ///
    /// Returns `None` when a grouped field has no value on the record, e.g. a
    /// category-level row under a manufacturer grouping.
    pub fn key_for(&self, record: &TidyRecord) -> Option<GroupKey> {
        let pick = |field: GroupField, value: Option<&String>| -> Option<Option<String>> {
            if self.contains(field) {
                value.map(|v| Some(v.clone()))
            } else {
                Some(None)
            }
        };

        Some(GroupKey {
            state: pick(GroupField::State, Some(&record.state))?,
            category: pick(GroupField::Category, Some(&record.category))?,
            manufacturer: pick(GroupField::Manufacturer, record.manufacturer.as_ref())?,
        })
    }
}

impl FromStr for GroupBy {
    type Err = GrowthError;

    /// Parse a comma-separated field list such as `"category,manufacturer"`.
    /// An empty string or `"total"` means no grouping.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("total") {
            return Ok(Self::total());
        }
        s.split(',')
            .map(GroupField::from_str)
            .collect::<Result<BTreeSet<_>, _>>()
            .map(|fields| Self { fields })
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.fields.is_empty() {
            return f.write_str("total");
        }
        let names: Vec<String> = self.fields.iter().map(ToString::to_string).collect();
        f.write_str(&names.join(","))
    }
}

/// Values of the grouped fields for one series.
///
/// Fields outside the [`GroupBy`] are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupKey {
    /// Region tag, when grouped by state
    pub state: Option<String>,
    /// Vehicle category, when grouped by category
    pub category: Option<String>,
    /// Manufacturer, when grouped by manufacturer
    pub manufacturer: Option<String>,
}

impl GroupKey {
    /// Key of the single total series.
    pub fn total() -> Self {
        Self::default()
    }

    /// Key of a manufacturer series.
    pub fn manufacturer(name: impl Into<String>) -> Self {
        Self {
            manufacturer: Some(name.into()),
            ..Self::default()
        }
    }

    /// Key of a category series.
    pub fn category(name: impl Into<String>) -> Self {
        Self {
            category: Some(name.into()),
            ..Self::default()
        }
    }

    /// Value of `field`, if grouped.
    pub fn get(&self, field: GroupField) -> Option<&str> {
        match field {
            GroupField::State => self.state.as_deref(),
            GroupField::Category => self.category.as_deref(),
            GroupField::Manufacturer => self.manufacturer.as_deref(),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = [&self.state, &self.category, &self.manufacturer]
            .into_iter()
            .filter_map(|v| v.as_deref())
            .collect();

        if parts.is_empty() {
            f.write_str("All")
        } else {
            f.write_str(&parts.join(" / "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 31).unwrap()
    }

    #[test]
    fn test_key_for_manufacturer_grouping() {
        let by = GroupBy::manufacturer();

        let mfr = TidyRecord::manufacturer_level(date(), "India", "2W", "Hero", 10);
        assert_eq!(by.key_for(&mfr), Some(GroupKey::manufacturer("Hero")));

        let agg = TidyRecord::category_level(date(), "India", "2W", 10);
        assert_eq!(by.key_for(&agg), None);
    }

    #[test]
    fn test_key_for_total_and_composite() {
        let record = TidyRecord::manufacturer_level(date(), "India", "4W", "Tata", 10);

        assert_eq!(GroupBy::total().key_for(&record), Some(GroupKey::total()));

        let by: GroupBy = "manufacturer, category".parse().unwrap();
        let key = by.key_for(&record).unwrap();
        assert_eq!(key.category.as_deref(), Some("4W"));
        assert_eq!(key.manufacturer.as_deref(), Some("Tata"));
        assert!(key.state.is_none());
        assert_eq!(key.to_string(), "4W / Tata");
        assert_eq!(by.to_string(), "category,manufacturer");
    }

    #[test]
    fn test_parse_group_by() {
        assert_eq!("".parse::<GroupBy>().unwrap(), GroupBy::total());
        assert_eq!("Total".parse::<GroupBy>().unwrap(), GroupBy::total());
        assert_eq!("CATEGORY".parse::<GroupBy>().unwrap(), GroupBy::category());
        assert_eq!(
            "maker".parse::<GroupBy>().unwrap_err(),
            GrowthError::UnknownGroupField("maker".to_string())
        );
    }

    #[test]
    fn test_total_key_display() {
        assert_eq!(GroupKey::total().to_string(), "All");
        assert_eq!(GroupField::Manufacturer.to_string(), "manufacturer");
    }
}
