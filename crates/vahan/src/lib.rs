#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/vahan-insights/vahan/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod dashboard;

// Re-export main types from sub-crates
pub use vahan_data as data;
pub use vahan_growth as growth;
pub use vahan_output as output;

pub use dashboard::{Dashboard, DashboardView, ViewCache, fingerprint};
pub use vahan_growth::level_rows;

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
