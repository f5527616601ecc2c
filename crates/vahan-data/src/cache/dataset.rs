//! File-backed dataset cache.
//!
//! Holds the parsed tidy dataset in memory and re-reads the file only when its
//! invalidation key (modification time and length) changes.

use crate::error::Result;
use crate::record::TidyRecord;
use crate::tidy::read_tidy;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::debug;

/// Invalidation key of a cached file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Last modification time reported by the filesystem
    pub modified: Option<SystemTime>,
    /// File length in bytes
    pub len: u64,
}

impl CacheKey {
    /// Read the current key of the file at `path`.
    pub fn of<P: AsRef<Path>>(path: P) -> Result<Self> {
        let meta = fs::metadata(path)?;
        Ok(Self {
            modified: meta.modified().ok(),
            len: meta.len(),
        })
    }
}

#[derive(Debug)]
struct CacheEntry {
    key: CacheKey,
    records: Arc<[TidyRecord]>,
}

/// In-memory cache of a tidy dataset file.
#[derive(Debug)]
pub struct DatasetCache {
    path: PathBuf,
    entry: Option<CacheEntry>,
}

impl DatasetCache {
    /// Create an empty cache for the dataset at `path`.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            entry: None,
        }
    }

    /// Path of the cached dataset.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the dataset, reusing the cached copy while the file is unchanged.
    pub fn load(&mut self) -> Result<Arc<[TidyRecord]>> {
        let key = CacheKey::of(&self.path)?;

        if let Some(entry) = &self.entry
            && entry.key == key
        {
            debug!(path = %self.path.display(), "dataset cache hit");
            return Ok(Arc::clone(&entry.records));
        }

        debug!(path = %self.path.display(), "dataset cache miss");
        let records: Arc<[TidyRecord]> = read_tidy(&self.path)?.into();
        self.entry = Some(CacheEntry {
            key,
            records: Arc::clone(&records),
        });
        Ok(records)
    }

    /// Drop the cached copy so the next [`load`](Self::load) re-reads the file.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    /// Whether a cached copy exists and matches the file on disk.
    pub fn is_fresh(&self) -> bool {
        match (&self.entry, CacheKey::of(&self.path)) {
            (Some(entry), Ok(key)) => entry.key == key,
            _ => false,
        }
    }

    /// Key of the cached copy, if any.
    pub fn key(&self) -> Option<CacheKey> {
        self.entry.as_ref().map(|e| e.key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tidy::write_tidy;
    use chrono::NaiveDate;

    fn record(registrations: u64) -> TidyRecord {
        TidyRecord::category_level(
            NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            "India",
            "2W",
            registrations,
        )
    }

    #[test]
    fn test_reload_after_change() {
        let path = std::env::temp_dir().join(format!("vahan_cache_{}.csv", std::process::id()));
        write_tidy(&path, &[record(1)]).unwrap();

        let mut cache = DatasetCache::new(&path);
        assert!(!cache.is_fresh());

        let first = cache.load().unwrap();
        assert_eq!(first.len(), 1);
        assert!(cache.is_fresh());

        let again = cache.load().unwrap();
        assert!(Arc::ptr_eq(&first, &again));

        // Length changes even when the mtime granularity is coarse.
        write_tidy(&path, &[record(1), record(22)]).unwrap();
        assert!(!cache.is_fresh());
        let reloaded = cache.load().unwrap();
        assert_eq!(reloaded.len(), 2);

        cache.invalidate();
        assert!(cache.key().is_none());

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_missing_file_is_error() {
        let mut cache = DatasetCache::new("/nonexistent/vahan/registrations_tidy.csv");
        assert!(cache.load().is_err());
        assert!(!cache.is_fresh());
    }
}
