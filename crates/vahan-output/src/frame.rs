//! Columnar views of registration data.
//!
//! Converts tidy and growth records into polars `DataFrame`s with a typed
//! `date` column, for ad-hoc analysis and tabular printing.

use crate::export::ExportError;
use polars::prelude::*;
use vahan_data::TidyRecord;
use vahan_growth::{GroupField, GrowthRecord};

fn iso(date: chrono::NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Build a `DataFrame` of growth records.
///
/// Only group-key columns that carry a value on at least one record are
/// included, followed by `date`, `registrations`, `registrations_prev_y`,
/// `registrations_prev_q`, `yoy_pct` and `qoq_pct`.
pub fn growth_frame(records: &[GrowthRecord]) -> Result<DataFrame, ExportError> {
    let mut columns: Vec<Column> = Vec::new();

    for field in [GroupField::State, GroupField::Category, GroupField::Manufacturer] {
        let values: Vec<Option<String>> = records
            .iter()
            .map(|r| r.key.get(field).map(str::to_string))
            .collect();
        if values.iter().any(Option::is_some) {
            columns.push(Series::new(field.to_string().into(), values).into());
        }
    }

    let dates: Vec<String> = records.iter().map(|r| iso(r.date)).collect();
    let registrations: Vec<u64> = records.iter().map(|r| r.registrations).collect();
    let prev_y: Vec<Option<u64>> = records.iter().map(|r| r.registrations_prev_y).collect();
    let prev_q: Vec<Option<u64>> = records.iter().map(|r| r.registrations_prev_q).collect();
    let yoy: Vec<Option<f64>> = records.iter().map(|r| r.yoy_pct).collect();
    let qoq: Vec<Option<f64>> = records.iter().map(|r| r.qoq_pct).collect();

    columns.extend([
        Series::new("date".into(), dates).into(),
        Series::new("registrations".into(), registrations).into(),
        Series::new("registrations_prev_y".into(), prev_y).into(),
        Series::new("registrations_prev_q".into(), prev_q).into(),
        Series::new("yoy_pct".into(), yoy).into(),
        Series::new("qoq_pct".into(), qoq).into(),
    ]);

    let df = DataFrame::new(columns)?;

    // Convert date strings to Date type
    with_date_column(df)
}

/// Build a `DataFrame` of tidy records with the persisted column layout.
pub fn tidy_frame(records: &[TidyRecord]) -> Result<DataFrame, ExportError> {
    let dates: Vec<String> = records.iter().map(|r| iso(r.date)).collect();
    let states: Vec<&str> = records.iter().map(|r| r.state.as_str()).collect();
    let categories: Vec<&str> = records.iter().map(|r| r.category.as_str()).collect();
    let manufacturers: Vec<Option<&str>> =
        records.iter().map(|r| r.manufacturer.as_deref()).collect();
    let registrations: Vec<u64> = records.iter().map(|r| r.registrations).collect();

    let df = DataFrame::new(vec![
        Series::new("date".into(), dates).into(),
        Series::new("state".into(), states).into(),
        Series::new("category".into(), categories).into(),
        Series::new("manufacturer".into(), manufacturers).into(),
        Series::new("registrations".into(), registrations).into(),
    ])?;

    with_date_column(df)
}

fn with_date_column(df: DataFrame) -> Result<DataFrame, ExportError> {
    Ok(df
        .lazy()
        .with_column(col("date").cast(DataType::Date))
        .collect()?)
}
