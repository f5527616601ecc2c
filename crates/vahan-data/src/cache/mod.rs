//! Caching layer for the tidy dataset.

pub mod dataset;

pub use dataset::{CacheKey, DatasetCache};
