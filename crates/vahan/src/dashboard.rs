//! Dashboard pipeline.
//!
//! Turns one filtered selection of the tidy dataset into everything the
//! dashboard shows: the headline KPI, per-category and per-manufacturer
//! growth trends and the latest-month manufacturer league table.
//!
//! Each (category, month) cell is totalled from its category-level rows when
//! the selection holds any, otherwise from its manufacturer rows, so the two
//! levels are never summed together and no category is dropped.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::debug;
use vahan_data::TidyRecord;
use vahan_growth::{
    GroupBy, GrowthRecord, Kpi, Query, compute_growth, headline_kpi, league_table, level_rows,
};

/// Everything rendered for one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    /// Headline figures; `None` when the selection is empty
    pub kpi: Option<Kpi>,
    /// Growth per category and month
    pub category_trends: Vec<GrowthRecord>,
    /// Growth per manufacturer and month
    pub manufacturer_trends: Vec<GrowthRecord>,
    /// Manufacturers of the latest selected month, largest first
    pub league: Vec<GrowthRecord>,
}

impl DashboardView {
    /// Whether the selection held no records.
    pub const fn is_empty(&self) -> bool {
        self.kpi.is_none()
    }
}

/// Dashboard pipeline entry point.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dashboard;

impl Dashboard {
    /// Build the view of `records` selected by `query`.
    ///
    /// Growth is computed on the filtered selection, so baselines outside the
    /// date range are absent.
    pub fn build(records: &[TidyRecord], query: &Query) -> DashboardView {
        let view = query.apply(records);
        if view.is_empty() {
            debug!("Dashboard query matched no records");
            return DashboardView::default();
        }

        let totals = level_rows(&view, &GroupBy::total());
        let manufacturers = level_rows(&view, &GroupBy::manufacturer());

        let as_of = query.as_of();
        let kpi = headline_kpi(&totals, as_of);
        let category_trends = compute_growth(&totals, &GroupBy::category());
        let manufacturer_trends = compute_growth(&manufacturers, &GroupBy::manufacturer());
        let league = league_table(&manufacturer_trends, as_of);

        debug!(
            records = view.len(),
            category_rows = category_trends.len(),
            manufacturer_rows = manufacturer_trends.len(),
            "Built dashboard view"
        );

        DashboardView {
            kpi,
            category_trends,
            manufacturer_trends,
            league,
        }
    }
}

/// Content hash of a dataset, used to key cached views.
pub fn fingerprint(records: &[TidyRecord]) -> u64 {
    let mut hasher = DefaultHasher::new();
    records.hash(&mut hasher);
    hasher.finish()
}

/// Memoizes dashboard views by (dataset fingerprint, query).
#[derive(Debug, Default)]
pub struct ViewCache {
    views: HashMap<(u64, Query), Arc<DashboardView>>,
    hits: u64,
    misses: u64,
}

impl ViewCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached view for `query`, building it on a miss.
    pub fn get_or_build(&mut self, records: &[TidyRecord], query: &Query) -> Arc<DashboardView> {
        let key = (fingerprint(records), query.clone());
        if let Some(view) = self.views.get(&key) {
            self.hits += 1;
            debug!(fingerprint = key.0, "View cache hit");
            return Arc::clone(view);
        }

        self.misses += 1;
        debug!(fingerprint = key.0, "View cache miss");
        let view = Arc::new(Dashboard::build(records, query));
        self.views.insert(key, Arc::clone(&view));
        view
    }

    /// Number of cached views.
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Whether no view is cached.
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// (hits, misses) since creation or the last clear.
    pub const fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    /// Drop every cached view.
    pub fn clear(&mut self) {
        self.views.clear();
        self.hits = 0;
        self.misses = 0;
    }
}
