//! Latest-month selectors.
//!
//! Headline figures come from the most recent month at or before an optional
//! cutoff. Cutoffs are compared at month granularity.

use crate::engine::{GrowthRecord, compute_growth};
use crate::group::{GroupBy, GroupKey};
use crate::query::level_rows;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use vahan_data::TidyRecord;
use vahan_data::calendar::month_end;

fn within(date: NaiveDate, cutoff: Option<NaiveDate>) -> bool {
    cutoff.is_none_or(|c| date <= c)
}

/// Latest record per group at or before `as_of`.
///
/// `as_of` is normalized to its month end; without it every group's overall
/// latest record is selected. Groups whose records all fall after the cutoff
/// map to `None`.
pub fn latest_snapshot(
    records: &[GrowthRecord],
    as_of: Option<NaiveDate>,
) -> BTreeMap<GroupKey, Option<GrowthRecord>> {
    let cutoff = as_of.map(month_end);
    let mut latest: BTreeMap<GroupKey, Option<&GrowthRecord>> = BTreeMap::new();

    for record in records {
        let slot = latest.entry(record.key.clone()).or_insert(None);
        if within(record.date, cutoff) && slot.is_none_or(|current| record.date > current.date) {
            *slot = Some(record);
        }
    }

    latest
        .into_iter()
        .map(|(key, record)| (key, record.cloned()))
        .collect()
}

/// Records of the single latest month at or before `as_of`, ranked by
/// registrations (descending, ties by group key).
///
/// Groups without data in that month are not listed.
pub fn league_table(records: &[GrowthRecord], as_of: Option<NaiveDate>) -> Vec<GrowthRecord> {
    let cutoff = as_of.map(month_end);
    let Some(latest) = records
        .iter()
        .map(|r| r.date)
        .filter(|d| within(*d, cutoff))
        .max()
    else {
        return Vec::new();
    };

    let mut table: Vec<GrowthRecord> = records
        .iter()
        .filter(|r| r.date == latest)
        .cloned()
        .collect();
    table.sort_by(|a, b| {
        b.registrations
            .cmp(&a.registrations)
            .then_with(|| a.key.cmp(&b.key))
    });
    table
}

/// Headline figures for the latest month of a selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Kpi {
    /// Latest month in the selection
    pub date: NaiveDate,
    /// Total registrations in that month
    pub total: u64,
    /// Total registrations a year earlier
    pub prev_year_total: Option<u64>,
    /// Total registrations a quarter earlier
    pub prev_quarter_total: Option<u64>,
    /// Year-over-year change in percent
    pub yoy_pct: Option<f64>,
    /// Quarter-over-quarter change in percent
    pub qoq_pct: Option<f64>,
}

impl From<GrowthRecord> for Kpi {
    fn from(record: GrowthRecord) -> Self {
        Self {
            date: record.date,
            total: record.registrations,
            prev_year_total: record.registrations_prev_y,
            prev_quarter_total: record.registrations_prev_q,
            yoy_pct: record.yoy_pct,
            qoq_pct: record.qoq_pct,
        }
    }
}

/// Total registrations of the latest month at or before `as_of`, with its
/// year and quarter comparisons.
///
/// Category-level rows and the manufacturer rows of the same month are not
/// summed together (see [`level_rows`]). Returns `None` when no record falls
/// in range.
pub fn headline_kpi(records: &[TidyRecord], as_of: Option<NaiveDate>) -> Option<Kpi> {
    let total = GroupBy::total();
    let growth = compute_growth(&level_rows(records, &total), &total);
    latest_snapshot(&growth, as_of)
        .remove(&GroupKey::total())
        .flatten()
        .map(Kpi::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn mfr(date: NaiveDate, name: &str, registrations: u64) -> TidyRecord {
        TidyRecord::manufacturer_level(date, "India", "4W", name, registrations)
    }

    #[test]
    fn test_latest_without_cutoff() {
        let records = vec![mfr(ymd(2024, 1, 31), "A", 10), mfr(ymd(2024, 2, 29), "A", 12)];
        let growth = compute_growth(&records, &GroupBy::manufacturer());

        let snap = latest_snapshot(&growth, None);
        let a = snap[&GroupKey::manufacturer("A")].as_ref().unwrap();
        assert_eq!(a.date, ymd(2024, 2, 29));
        assert_eq!(a.registrations, 12);
    }

    #[test]
    fn test_cutoff_and_missing_group() {
        let records = vec![
            mfr(ymd(2024, 1, 31), "A", 10),
            mfr(ymd(2024, 2, 29), "A", 12),
            mfr(ymd(2024, 3, 31), "B", 7),
        ];
        let growth = compute_growth(&records, &GroupBy::manufacturer());

        // Mid-month cutoff still includes that month.
        let snap = latest_snapshot(&growth, Some(ymd(2024, 2, 10)));
        assert_eq!(snap.len(), 2);
        assert_eq!(
            snap[&GroupKey::manufacturer("A")].as_ref().map(|r| r.date),
            Some(ymd(2024, 2, 29))
        );
        assert!(snap[&GroupKey::manufacturer("B")].is_none());
    }

    #[test]
    fn test_empty_snapshot() {
        assert!(latest_snapshot(&[], None).is_empty());
        assert!(league_table(&[], None).is_empty());
        assert!(headline_kpi(&[], None).is_none());
    }

    #[test]
    fn test_league_table_ranking() {
        let records = vec![
            mfr(ymd(2024, 1, 31), "A", 10),
            mfr(ymd(2024, 2, 29), "A", 12),
            mfr(ymd(2024, 2, 29), "B", 30),
            mfr(ymd(2024, 2, 29), "C", 12),
            mfr(ymd(2024, 1, 31), "D", 99),
        ];
        let growth = compute_growth(&records, &GroupBy::manufacturer());

        let table = league_table(&growth, None);
        let names: Vec<&str> = table
            .iter()
            .filter_map(|r| r.key.manufacturer.as_deref())
            .collect();
        assert_eq!(names, vec!["B", "A", "C"]);

        let january = league_table(&growth, Some(ymd(2024, 1, 1)));
        assert_eq!(january.len(), 2);
        assert_eq!(january[0].key, GroupKey::manufacturer("D"));
    }

    #[test]
    fn test_headline_kpi_totals() {
        let records = vec![
            mfr(ymd(2023, 3, 31), "A", 60),
            mfr(ymd(2023, 3, 31), "B", 40),
            mfr(ymd(2023, 12, 31), "A", 100),
            mfr(ymd(2023, 12, 31), "B", 100),
            mfr(ymd(2024, 3, 31), "A", 90),
            mfr(ymd(2024, 3, 31), "B", 60),
        ];

        let kpi = headline_kpi(&records, None).unwrap();
        assert_eq!(kpi.date, ymd(2024, 3, 31));
        assert_eq!(kpi.total, 150);
        assert_eq!(kpi.prev_year_total, Some(100));
        assert_eq!(kpi.prev_quarter_total, Some(200));
        assert_relative_eq!(kpi.yoy_pct.unwrap(), 50.0);
        assert_relative_eq!(kpi.qoq_pct.unwrap(), -25.0);
    }

    #[test]
    fn test_headline_kpi_mixed_levels() {
        let records = vec![
            TidyRecord::category_level(ymd(2024, 1, 31), "India", "2W", 1_000),
            TidyRecord::manufacturer_level(ymd(2024, 1, 31), "India", "2W", "Hero", 600),
            TidyRecord::manufacturer_level(ymd(2024, 1, 31), "India", "3W", "Piaggio", 50),
        ];

        let kpi = headline_kpi(&records, None).unwrap();
        assert_eq!(kpi.total, 1_050);
    }
}
