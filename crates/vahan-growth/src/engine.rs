//! Growth Engine
//!
//! Aligns every (group, month) cell with the same group's cell a year and a
//! quarter earlier and derives percentage changes. Lags are calendar months,
//! so month-end alignment survives short months and leap years.

use crate::group::{GroupBy, GroupKey};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;
use vahan_data::TidyRecord;
use vahan_data::calendar::{month_end, shift_months};

/// Configuration for the GrowthEngine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthConfig {
    /// Lag for the year-over-year comparison, in calendar months (default: 12)
    pub year_lag_months: u32,
    /// Lag for the quarter-over-quarter comparison, in calendar months (default: 3)
    pub quarter_lag_months: u32,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            year_lag_months: 12,
            quarter_lag_months: 3,
        }
    }
}

/// Growth metrics for one (group, month) cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthRecord {
    /// Series the cell belongs to
    pub key: GroupKey,
    /// Month end of the cell
    pub date: NaiveDate,
    /// Registrations summed over the cell
    pub registrations: u64,
    /// Registrations of the same series a year earlier
    pub registrations_prev_y: Option<u64>,
    /// Registrations of the same series a quarter earlier
    pub registrations_prev_q: Option<u64>,
    /// Year-over-year change in percent
    pub yoy_pct: Option<f64>,
    /// Quarter-over-quarter change in percent
    pub qoq_pct: Option<f64>,
}

/// Percentage change from `previous` to `current`.
///
/// Absent when there is no baseline or the baseline is zero.
pub fn pct_change(current: u64, previous: Option<u64>) -> Option<f64> {
    match previous {
        Some(prev) if prev > 0 => Some((current as f64 - prev as f64) / prev as f64 * 100.0),
        _ => None,
    }
}

/// Hashed index of aggregated registrations keyed by `(group key, month end)`.
#[derive(Debug, Clone, Default)]
pub struct GrowthIndex {
    cells: HashMap<(GroupKey, NaiveDate), u64>,
}

impl GrowthIndex {
    /// Aggregate `records` into cells for `group_by`.
    ///
    /// Records lacking a value for a grouped field are skipped; dates are
    /// normalized to month end before keying.
    pub fn build(records: &[TidyRecord], group_by: &GroupBy) -> Self {
        let mut cells: HashMap<(GroupKey, NaiveDate), u64> = HashMap::new();
        let mut skipped = 0usize;

        for record in records {
            let Some(key) = group_by.key_for(record) else {
                skipped += 1;
                continue;
            };
            let total = cells.entry((key, month_end(record.date))).or_default();
            *total = total.saturating_add(record.registrations);
        }

        debug!(
            records = records.len(),
            cells = cells.len(),
            skipped,
            group_by = %group_by,
            "aggregated growth cells"
        );
        Self { cells }
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Whether the index has no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Aggregated total of a cell.
    pub fn get(&self, key: &GroupKey, date: NaiveDate) -> Option<u64> {
        self.cells.get(&(key.clone(), date)).copied()
    }

    /// Total of the cell `months` calendar months before `date`.
    pub fn lagged(&self, key: &GroupKey, date: NaiveDate, months: u32) -> Option<u64> {
        let lag = i32::try_from(months).ok()?;
        let earlier = shift_months(date, -lag)?;
        self.get(key, earlier)
    }

    /// Cells sorted by `(group key, date)`.
    pub fn sorted_cells(&self) -> Vec<(&GroupKey, NaiveDate, u64)> {
        let mut cells: Vec<_> = self
            .cells
            .iter()
            .map(|((key, date), total)| (key, *date, *total))
            .collect();
        cells.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        cells
    }
}

/// Growth engine with configurable comparison lags.
#[derive(Debug, Clone, Default)]
pub struct GrowthEngine {
    config: GrowthConfig,
}

impl GrowthEngine {
    /// Create an engine with `config`.
    pub const fn with_config(config: GrowthConfig) -> Self {
        Self { config }
    }

    /// Engine configuration.
    pub const fn config(&self) -> &GrowthConfig {
        &self.config
    }

    /// Compute growth records for every cell of `records` under `group_by`.
    ///
    /// Output is sorted by `(group key, date)`. Cells without a baseline are
    /// still emitted, with the corresponding fields absent.
    pub fn compute(&self, records: &[TidyRecord], group_by: &GroupBy) -> Vec<GrowthRecord> {
        let index = GrowthIndex::build(records, group_by);
        self.compute_indexed(&index)
    }

    /// Compute growth records from a prebuilt index.
    pub fn compute_indexed(&self, index: &GrowthIndex) -> Vec<GrowthRecord> {
        index
            .sorted_cells()
            .into_iter()
            .map(|(key, date, registrations)| {
                let prev_y = index.lagged(key, date, self.config.year_lag_months);
                let prev_q = index.lagged(key, date, self.config.quarter_lag_months);

                GrowthRecord {
                    key: key.clone(),
                    date,
                    registrations,
                    registrations_prev_y: prev_y,
                    registrations_prev_q: prev_q,
                    yoy_pct: pct_change(registrations, prev_y),
                    qoq_pct: pct_change(registrations, prev_q),
                }
            })
            .collect()
    }
}

/// Compute year-over-year and quarter-over-quarter growth per group.
///
/// Shorthand for [`GrowthEngine::compute`] with the default 12/3-month lags.
pub fn compute_growth(records: &[TidyRecord], group_by: &GroupBy) -> Vec<GrowthRecord> {
    GrowthEngine::default().compute(records, group_by)
}
