#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/vahan-insights/vahan/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod export;
pub mod frame;
pub mod report;

pub use export::{ExportError, ExportFormat, Exporter, GrowthRow};
pub use frame::{growth_frame, tidy_frame};
pub use report::{GrowthTable, format_count, format_pct, kpi_block};
