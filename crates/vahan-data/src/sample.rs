//! Synthetic registration data.
//!
//! Produces a plausible tidy dataset from the [`Catalog`] so the pipeline can
//! run without real exports. Category totals follow a yearly seasonal curve,
//! a slow linear trend and uniform noise; each category total is then split
//! across its manufacturers so that manufacturer rows always sum to the
//! category row.

use crate::calendar::{month_end, months_between};
use crate::catalog::Catalog;
use crate::error::{DataError, Result};
use crate::record::{DEFAULT_STATE, TidyRecord};
use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use std::f64::consts::PI;
use tracing::info;

/// Configuration for the SampleGenerator
#[derive(Debug, Clone)]
pub struct SampleConfig {
    /// First month to generate
    pub start: NaiveDate,
    /// Last month to generate (inclusive)
    pub end: NaiveDate,
    /// Region tag stamped on every record
    pub state: String,
    /// Seed for the random number generator
    pub seed: u64,
}

impl SampleConfig {
    /// Config covering `start..=end` with default state and seed.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            state: DEFAULT_STATE.to_string(),
            seed: 42,
        }
    }
}

/// Seeded synthetic data generator.
#[derive(Debug)]
pub struct SampleGenerator {
    catalog: Catalog,
    config: SampleConfig,
}

/// Seasonal multiplier for a calendar month (1-12).
fn seasonal_factor(month: u32) -> f64 {
    1.0 + 0.1 * ((month as f64 - 1.0) / 12.0 * 2.0 * PI).sin()
}

/// Trend multiplier for the `t`-th generated month.
fn trend_factor(t: usize) -> f64 {
    1.0 + 0.0025 * t as f64
}

/// Distribution of raw manufacturer weights, before taking the absolute value.
fn weight_distribution() -> Result<Normal<f64>> {
    Normal::new(1.0, 0.5)
        .map_err(|e| DataError::Parse(format!("invalid weight distribution: {e}")))
}

/// Split `total` proportionally to `weights`, flooring each share and giving
/// the remainder to the largest share.
fn allocate(total: u64, weights: &[f64]) -> Vec<u64> {
    if weights.is_empty() {
        return Vec::new();
    }

    let sum: f64 = weights.iter().sum();
    let mut shares: Vec<u64> = if sum > 0.0 {
        weights
            .iter()
            .map(|w| (w / sum * total as f64).floor() as u64)
            .collect()
    } else {
        vec![total / weights.len() as u64; weights.len()]
    };

    let allocated: u64 = shares.iter().sum();
    let largest = shares
        .iter()
        .enumerate()
        .max_by_key(|(_, share)| **share)
        .map_or(0, |(idx, _)| idx);

    if allocated <= total {
        shares[largest] += total - allocated;
    } else {
        shares[largest] = shares[largest].saturating_sub(allocated - total);
    }
    shares
}

impl SampleGenerator {
    /// Create a generator for `catalog` with `config`.
    pub const fn new(catalog: Catalog, config: SampleConfig) -> Self {
        Self { catalog, config }
    }

    /// Generator configuration.
    pub const fn config(&self) -> &SampleConfig {
        &self.config
    }

    /// Generate the dataset.
    ///
    /// Rows are sorted by date, then category, with the category-level row
    /// ahead of its manufacturers.
    pub fn generate(&self) -> Result<Vec<TidyRecord>> {
        let start = month_end(self.config.start);
        let end = month_end(self.config.end);
        if start > end {
            return Err(DataError::InvalidDateRange {
                start: start.to_string(),
                end: end.to_string(),
            });
        }

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let weight_dist = weight_distribution()?;
        let mut records = Vec::new();

        for (t, date) in months_between(start, end).into_iter().enumerate() {
            for category in &self.catalog.categories {
                let value = category.base_volume as f64
                    * seasonal_factor(date.month())
                    * trend_factor(t)
                    * rng.gen_range(0.92..1.08);
                let total = value.round().max(0.0) as u64;

                records.push(TidyRecord {
                    date,
                    state: self.config.state.clone(),
                    category: category.name.clone(),
                    manufacturer: None,
                    registrations: total,
                });

                let manufacturers: Vec<&str> = self
                    .catalog
                    .manufacturers_in(&category.name)
                    .map(|m| m.name.as_str())
                    .collect();
                let weights: Vec<f64> = manufacturers
                    .iter()
                    .map(|_| weight_dist.sample(&mut rng).abs() * rng.gen_range(0.95..1.05))
                    .collect();

                for (name, share) in manufacturers.iter().zip(allocate(total, &weights)) {
                    records.push(TidyRecord {
                        date,
                        state: self.config.state.clone(),
                        category: category.name.clone(),
                        manufacturer: Some((*name).to_string()),
                        registrations: share,
                    });
                }
            }
        }

        records.sort_by(|a, b| {
            (a.date, &a.category, &a.manufacturer).cmp(&(b.date, &b.category, &b.manufacturer))
        });

        info!(
            rows = records.len(),
            start = %start,
            end = %end,
            "generated sample dataset"
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::collections::HashMap;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn generator(seed: u64) -> SampleGenerator {
        let mut config = SampleConfig::new(ymd(2023, 1, 1), ymd(2024, 6, 1));
        config.seed = seed;
        SampleGenerator::new(Catalog::default(), config)
    }

    #[test]
    fn test_seasonal_factor() {
        assert_relative_eq!(seasonal_factor(1), 1.0, epsilon = 1e-12);
        assert_relative_eq!(seasonal_factor(4), 1.1, epsilon = 1e-12);
        assert_relative_eq!(seasonal_factor(10), 0.9, epsilon = 1e-12);
    }

    #[test]
    fn test_weight_distribution() {
        let dist = weight_distribution().unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let weights: Vec<f64> = (0..10_000).map(|_| dist.sample(&mut rng).abs()).collect();

        let mean = weights.iter().sum::<f64>() / weights.len() as f64;
        assert_relative_eq!(mean, 1.0, epsilon = 0.05);
        assert!(weights.iter().all(|w| *w >= 0.0));
    }

    #[test]
    fn test_allocate_preserves_total() {
        let shares = allocate(1_000, &[0.3, 0.3, 0.4]);
        assert_eq!(shares.iter().sum::<u64>(), 1_000);

        let shares = allocate(7, &[0.0, 0.0]);
        assert_eq!(shares.iter().sum::<u64>(), 7);

        assert!(allocate(5, &[]).is_empty());
    }

    #[test]
    fn test_row_counts_and_month_ends() {
        let records = generator(7).generate().unwrap();

        // 18 months x (3 categories + 18 manufacturers)
        assert_eq!(records.len(), 18 * 21);
        assert!(records.iter().all(|r| crate::calendar::is_month_end(r.date)));
        assert!(records.iter().all(|r| r.state == "India"));
        assert_eq!(records[0].date, ymd(2023, 1, 31));
        assert!(records[0].manufacturer.is_none());
    }

    #[test]
    fn test_manufacturers_sum_to_category() {
        let records = generator(11).generate().unwrap();

        let mut totals: HashMap<(NaiveDate, String), u64> = HashMap::new();
        let mut sums: HashMap<(NaiveDate, String), u64> = HashMap::new();
        for r in &records {
            let key = (r.date, r.category.clone());
            if r.manufacturer.is_none() {
                totals.insert(key, r.registrations);
            } else {
                *sums.entry(key).or_default() += r.registrations;
            }
        }

        assert_eq!(totals, sums);
    }

    #[test]
    fn test_seed_is_deterministic() {
        assert_eq!(generator(3).generate().unwrap(), generator(3).generate().unwrap());
        assert_ne!(generator(3).generate().unwrap(), generator(4).generate().unwrap());
    }

    #[test]
    fn test_reversed_range_rejected() {
        let config = SampleConfig::new(ymd(2024, 6, 1), ymd(2024, 1, 1));
        let err = SampleGenerator::new(Catalog::default(), config)
            .generate()
            .unwrap_err();
        assert!(matches!(err, DataError::InvalidDateRange { .. }));
    }
}
