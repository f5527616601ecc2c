#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/vahan-insights/vahan/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod engine;
pub mod error;
pub mod group;
pub mod query;
pub mod snapshot;

pub use vahan_data::calendar;

pub use engine::{GrowthConfig, GrowthEngine, GrowthIndex, GrowthRecord, compute_growth, pct_change};
pub use error::{GrowthError, Result};
pub use group::{GroupBy, GroupField, GroupKey};
pub use query::{Query, RecordLevel, level_rows, split_levels};
pub use snapshot::{Kpi, headline_kpi, latest_snapshot, league_table};
