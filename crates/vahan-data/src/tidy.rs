//! Persisted tidy dataset.
//!
//! One row per [`TidyRecord`] with columns
//! `date,state,category,manufacturer,registrations`. An empty manufacturer
//! marks a category-level row. Dates are written as ISO `YYYY-MM-DD`.

use crate::calendar::{month_end, parse_date};
use crate::error::{DataError, Result};
use crate::record::TidyRecord;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

/// Row layout of the tidy CSV.
#[derive(Debug, Serialize, Deserialize)]
struct TidyRow {
    date: String,
    state: String,
    category: String,
    manufacturer: Option<String>,
    registrations: u64,
}

impl From<&TidyRecord> for TidyRow {
    fn from(record: &TidyRecord) -> Self {
        Self {
            date: record.date.format("%Y-%m-%d").to_string(),
            state: record.state.clone(),
            category: record.category.clone(),
            manufacturer: record.manufacturer.clone(),
            registrations: record.registrations,
        }
    }
}

impl TidyRow {
    fn into_record(self, line: u64) -> Result<TidyRecord> {
        let date = parse_date(&self.date)
            .ok_or_else(|| DataError::Parse(format!("line {line}: invalid date {:?}", self.date)))?;

        Ok(TidyRecord {
            date: month_end(date),
            state: self.state,
            category: self.category,
            manufacturer: self.manufacturer.filter(|m| !m.trim().is_empty()),
            registrations: self.registrations,
        })
    }
}

/// Read tidy records from any reader.
pub fn read_tidy_from<R: Read>(reader: R) -> Result<Vec<TidyRecord>> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for row in rdr.deserialize::<TidyRow>() {
        let row = row?;
        let line = records.len() as u64 + 2;
        records.push(row.into_record(line)?);
    }
    Ok(records)
}

/// Read the tidy dataset at `path`.
pub fn read_tidy<P: AsRef<Path>>(path: P) -> Result<Vec<TidyRecord>> {
    let records = read_tidy_from(File::open(path.as_ref())?)?;
    info!(path = %path.as_ref().display(), rows = records.len(), "loaded tidy dataset");
    Ok(records)
}

/// Write tidy records to any writer.
pub fn write_tidy_to<W: Write>(writer: W, records: &[TidyRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for record in records {
        wtr.serialize(TidyRow::from(record))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write the tidy dataset to `path`, creating parent directories as needed.
pub fn write_tidy<P: AsRef<Path>>(path: P, records: &[TidyRecord]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }

    write_tidy_to(File::create(path)?, records)?;
    info!(path = %path.display(), rows = records.len(), "wrote tidy dataset");
    Ok(())
}
