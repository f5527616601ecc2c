#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/vahan-insights/vahan/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod calendar;
pub mod catalog;
pub mod error;
pub mod ingest;
pub mod record;
pub mod sample;
pub mod tidy;

pub use cache::{CacheKey, DatasetCache};
pub use catalog::{Catalog, CategorySpec, ManufacturerSpec};
pub use error::{DataError, Result};
pub use ingest::{IngestOptions, RawSources, ingest, ingest_dir};
pub use record::TidyRecord;
pub use sample::{SampleConfig, SampleGenerator};
pub use tidy::{read_tidy, write_tidy};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
