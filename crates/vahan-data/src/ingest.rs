//! Ingestion adapter for raw registration exports.
//!
//! Normalizes `category_monthly.csv` (`date, category, registrations`) and
//! `manufacturer_monthly.csv` (`date, category, manufacturer, registrations`)
//! into [`TidyRecord`]s. Column names are matched after trimming and
//! lowercasing; extra columns are ignored. No aggregation happens here.

use crate::calendar::{month_end, parse_date};
use crate::error::{DataError, Result};
use crate::record::{DEFAULT_STATE, TidyRecord};
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File name of the category-level export.
pub const CATEGORY_FILE: &str = "category_monthly.csv";

/// File name of the manufacturer-level export.
pub const MANUFACTURER_FILE: &str = "manufacturer_monthly.csv";

const CATEGORY_COLUMNS: &[&str] = &["date", "category", "registrations"];
const MANUFACTURER_COLUMNS: &[&str] = &["date", "category", "manufacturer", "registrations"];

/// Options applied while normalizing raw exports.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Region tag stamped on every record
    pub state: String,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            state: DEFAULT_STATE.to_string(),
        }
    }
}

/// Locations of the raw exports to ingest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawSources {
    /// Path to the category-level export, if present
    pub category: Option<PathBuf>,
    /// Path to the manufacturer-level export, if present
    pub manufacturer: Option<PathBuf>,
}

impl RawSources {
    /// Discover the standard export files inside `dir`.
    ///
    /// Files that do not exist are left as `None`.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> Self {
        let existing = |name: &str| {
            let path = dir.as_ref().join(name);
            path.is_file().then_some(path)
        };

        Self {
            category: existing(CATEGORY_FILE),
            manufacturer: existing(MANUFACTURER_FILE),
        }
    }

    /// Whether no export was found.
    pub const fn is_empty(&self) -> bool {
        self.category.is_none() && self.manufacturer.is_none()
    }

    /// Open and normalize every present export.
    pub fn ingest(&self, options: &IngestOptions) -> Result<Vec<TidyRecord>> {
        let category = self.category.as_ref().map(File::open).transpose()?;
        let manufacturer = self.manufacturer.as_ref().map(File::open).transpose()?;
        ingest(category, manufacturer, options)
    }
}

/// Normalize the raw exports found in `dir`.
///
/// Fails with [`DataError::NoRawSources`] when neither export exists.
pub fn ingest_dir<P: AsRef<Path>>(dir: P, options: &IngestOptions) -> Result<Vec<TidyRecord>> {
    let sources = RawSources::from_dir(&dir);
    if sources.is_empty() {
        return Err(DataError::NoRawSources(dir.as_ref().display().to_string()));
    }
    sources.ingest(options)
}

/// Normalize one or two raw exports into tidy records.
///
/// Category rows come first, then manufacturer rows, each in source order.
/// Passing `None` for both sources yields an empty result.
pub fn ingest<R: Read>(
    category: Option<R>,
    manufacturer: Option<R>,
    options: &IngestOptions,
) -> Result<Vec<TidyRecord>> {
    let mut records = Vec::new();

    if let Some(reader) = category {
        read_source(CATEGORY_FILE, reader, SourceKind::Category, options, &mut records)?;
    }
    let category_rows = records.len();

    if let Some(reader) = manufacturer {
        read_source(
            MANUFACTURER_FILE,
            reader,
            SourceKind::Manufacturer,
            options,
            &mut records,
        )?;
    }

    info!(
        category_rows,
        manufacturer_rows = records.len() - category_rows,
        "ingested raw exports"
    );

    Ok(records)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceKind {
    Category,
    Manufacturer,
}

impl SourceKind {
    const fn required_columns(self) -> &'static [&'static str] {
        match self {
            Self::Category => CATEGORY_COLUMNS,
            Self::Manufacturer => MANUFACTURER_COLUMNS,
        }
    }
}

/// Positions of the required columns within a source.
#[derive(Debug)]
struct ColumnMap {
    date: usize,
    category: usize,
    manufacturer: Option<usize>,
    registrations: usize,
}

impl ColumnMap {
    fn resolve(file: &str, headers: &StringRecord, kind: SourceKind) -> Result<Self> {
        let normalized: Vec<String> = headers.iter().map(|h| h.trim().to_lowercase()).collect();
        let position = |name: &str| normalized.iter().position(|h| h == name);

        let missing: Vec<String> = kind
            .required_columns()
            .iter()
            .filter(|&&name| position(name).is_none())
            .map(|name| name.to_string())
            .collect();

        match (
            position("date"),
            position("category"),
            position("registrations"),
        ) {
            (Some(date), Some(category), Some(registrations)) if missing.is_empty() => Ok(Self {
                date,
                category,
                manufacturer: match kind {
                    SourceKind::Category => None,
                    SourceKind::Manufacturer => position("manufacturer"),
                },
                registrations,
            }),
            _ => Err(DataError::Schema {
                file: file.to_string(),
                missing,
            }),
        }
    }
}

fn read_source<R: Read>(
    file: &str,
    reader: R,
    kind: SourceKind,
    options: &IngestOptions,
    out: &mut Vec<TidyRecord>,
) -> Result<()> {
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(reader);
    let columns = ColumnMap::resolve(file, rdr.headers()?, kind)?;
    debug!(file, ?columns, "resolved raw columns");

    for row in rdr.records() {
        let row = row?;
        let line = row.position().map_or(0, |p| p.line());
        let field = |idx: usize| row.get(idx).unwrap_or("");

        let date = parse_date(field(columns.date)).ok_or_else(|| {
            DataError::Parse(format!(
                "{file} line {line}: invalid date {:?}",
                field(columns.date)
            ))
        })?;
        let registrations = parse_count(field(columns.registrations)).ok_or_else(|| {
            DataError::Parse(format!(
                "{file} line {line}: invalid registrations {:?}",
                field(columns.registrations)
            ))
        })?;
        let manufacturer = match columns.manufacturer.map(field) {
            Some("") => {
                return Err(DataError::Parse(format!(
                    "{file} line {line}: missing manufacturer"
                )));
            }
            other => other.map(str::to_string),
        };

        out.push(TidyRecord {
            date: month_end(date),
            state: options.state.clone(),
            category: field(columns.category).to_string(),
            manufacturer,
            registrations,
        });
    }

    Ok(())
}

/// Parse a non-negative integer count, accepting integral floats like `"120.0"`.
fn parse_count(value: &str) -> Option<u64> {
    if let Ok(count) = value.parse::<u64>() {
        return Some(count);
    }
    let float = value.parse::<f64>().ok()?;
    (float.is_finite() && float >= 0.0 && float.fract() == 0.0 && float <= u64::MAX as f64)
        .then_some(float as u64)
}
