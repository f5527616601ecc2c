//! Export functionality for Vahan registration data.
//!
//! CSV and JSON export of growth records, tidy records and KPI figures.
//! Growth records are flattened so the group key becomes plain columns and
//! absent values become empty CSV cells or JSON nulls.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use vahan_data::TidyRecord;
use vahan_growth::{GrowthRecord, Kpi};

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// Invalid format error.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),
}

/// Export format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// Comma-separated values format.
    Csv,

    /// Compact JSON format.
    Json,

    /// Pretty-printed JSON format.
    PrettyJson,
}

impl ExportFormat {
    /// Get the file extension for this format.
    pub const fn extension(&self) -> &str {
        match self {
            Self::Csv => "csv",
            Self::Json | Self::PrettyJson => "json",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "pretty-json" | "pretty_json" | "prettyjson" => Ok(Self::PrettyJson),
            other => Err(ExportError::InvalidFormat(other.to_string())),
        }
    }
}

/// Flat row layout of a growth record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GrowthRow {
    /// Region tag, when grouped by state
    pub state: Option<String>,
    /// Vehicle category, when grouped by category
    pub category: Option<String>,
    /// Manufacturer, when grouped by manufacturer
    pub manufacturer: Option<String>,
    /// Month end, ISO formatted
    pub date: String,
    /// Registrations in the month
    pub registrations: u64,
    /// Registrations a year earlier
    pub registrations_prev_y: Option<u64>,
    /// Registrations a quarter earlier
    pub registrations_prev_q: Option<u64>,
    /// Year-over-year change in percent
    pub yoy_pct: Option<f64>,
    /// Quarter-over-quarter change in percent
    pub qoq_pct: Option<f64>,
}

impl From<&GrowthRecord> for GrowthRow {
    fn from(record: &GrowthRecord) -> Self {
        Self {
            state: record.key.state.clone(),
            category: record.key.category.clone(),
            manufacturer: record.key.manufacturer.clone(),
            date: record.date.format("%Y-%m-%d").to_string(),
            registrations: record.registrations,
            registrations_prev_y: record.registrations_prev_y,
            registrations_prev_q: record.registrations_prev_q,
            yoy_pct: record.yoy_pct,
            qoq_pct: record.qoq_pct,
        }
    }
}

/// Serialize rows into a CSV string with a header line.
fn to_csv_string<S, I>(rows: I) -> Result<String, ExportError>
where
    S: Serialize,
    I: IntoIterator<Item = S>,
{
    let mut wtr = csv::Writer::from_writer(vec![]);
    for row in rows {
        wtr.serialize(row)?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    String::from_utf8(bytes).map_err(|e| ExportError::InvalidFormat(e.to_string()))
}

/// Trait for exporting data in various formats.
pub trait Exporter {
    /// Export data to a string in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError>;

    /// Export data to a file in the specified format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or file writing fails.
    fn export_to_file(&self, path: &Path, format: ExportFormat) -> Result<(), ExportError> {
        let content = self.export_to_string(format)?;
        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;
        Ok(())
    }
}

impl Exporter for [GrowthRecord] {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        let rows = self.iter().map(GrowthRow::from);
        match format {
            ExportFormat::Csv => to_csv_string(rows),
            ExportFormat::Json => Ok(serde_json::to_string(&rows.collect::<Vec<_>>())?),
            ExportFormat::PrettyJson => {
                Ok(serde_json::to_string_pretty(&rows.collect::<Vec<_>>())?)
            }
        }
    }
}

impl Exporter for [TidyRecord] {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => {
                let mut buf = Vec::new();
                vahan_data::tidy::write_tidy_to(&mut buf, self).map_err(|e| match e {
                    vahan_data::DataError::Csv(e) => ExportError::Csv(e),
                    vahan_data::DataError::Io(e) => ExportError::Io(e),
                    other => ExportError::InvalidFormat(other.to_string()),
                })?;
                String::from_utf8(buf).map_err(|e| ExportError::InvalidFormat(e.to_string()))
            }
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

impl Exporter for Kpi {
    fn export_to_string(&self, format: ExportFormat) -> Result<String, ExportError> {
        match format {
            ExportFormat::Csv => to_csv_string([self]),
            ExportFormat::Json => Ok(serde_json::to_string(self)?),
            ExportFormat::PrettyJson => Ok(serde_json::to_string_pretty(self)?),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use vahan_growth::{GroupBy, compute_growth};

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn growth() -> Vec<GrowthRecord> {
        let records = vec![
            TidyRecord::manufacturer_level(ymd(2023, 1, 31), "India", "2W", "Hero", 100),
            TidyRecord::manufacturer_level(ymd(2024, 1, 31), "India", "2W", "Hero", 150),
        ];
        compute_growth(&records, &GroupBy::manufacturer())
    }

    #[test]
    fn test_growth_export_csv() {
        let csv = growth().export_to_string(ExportFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines[0],
            "state,category,manufacturer,date,registrations,registrations_prev_y,\
             registrations_prev_q,yoy_pct,qoq_pct"
        );
        assert_eq!(lines[1], ",,Hero,2023-01-31,100,,,,");
        assert_eq!(lines[2], ",,Hero,2024-01-31,150,100,,50.0,");
    }

    #[test]
    fn test_growth_export_json_uses_null_for_absent() {
        let json = growth().export_to_string(ExportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["manufacturer"], "Hero");
        assert!(value[0]["yoy_pct"].is_null());
        assert_eq!(value[1]["yoy_pct"], 50.0);
        assert!(value[1]["qoq_pct"].is_null());
    }

    #[test]
    fn test_pretty_json() {
        let json = growth().export_to_string(ExportFormat::PrettyJson).unwrap();
        assert!(json.contains("  ")); // Indentation indicates pretty format
    }

    #[test]
    fn test_tidy_export_csv() {
        let records = vec![TidyRecord::category_level(ymd(2024, 1, 31), "India", "3W", 55)];
        let csv = records.export_to_string(ExportFormat::Csv).unwrap();
        assert!(csv.contains("2024-01-31,India,3W,,55"));
    }

    #[test]
    fn test_kpi_export() {
        let kpi = Kpi {
            date: ymd(2024, 3, 31),
            total: 150,
            prev_year_total: Some(100),
            prev_quarter_total: None,
            yoy_pct: Some(50.0),
            qoq_pct: None,
        };

        let csv = kpi.export_to_string(ExportFormat::Csv).unwrap();
        assert!(csv.starts_with("date,total,prev_year_total"));
        assert!(csv.contains("2024-03-31,150,100,,50.0,"));
    }

    #[test]
    fn test_export_to_file() {
        let path = std::env::temp_dir().join(format!("vahan_export_{}.json", std::process::id()));
        growth()
            .export_to_file(&path, ExportFormat::Json)
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("\"Hero\""));
        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_export_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert_eq!(
            "pretty-json".parse::<ExportFormat>().unwrap(),
            ExportFormat::PrettyJson
        );
        assert!("xml".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::PrettyJson.extension(), "json");
    }
}
