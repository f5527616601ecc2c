//! CLI configuration.
//!
//! Settings resolve as built-in defaults, then the JSON config file, then
//! command-line flags.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use vahan::data::record::DEFAULT_STATE;
use vahan::data::{Catalog, DataError};

const CONFIG_FILE: &str = "config.json";
const TIDY_FILE: &str = "registrations_tidy.csv";

/// Get the default data directory path.
///
/// Uses platform-specific data directories:
/// - Linux: `~/.local/share/vahan/`
/// - macOS: `~/Library/Application Support/vahan/`
/// - Windows: `%APPDATA%\vahan\`
pub(crate) fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vahan")
}

/// Default location of the config file, `<config dir>/vahan/config.json`.
pub(crate) fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("vahan").join(CONFIG_FILE))
}

/// Application settings. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    /// Root of the `raw/` and `processed/` directories
    pub(crate) data_dir: PathBuf,
    /// Region tag stamped on ingested and generated rows
    pub(crate) state: String,
    /// Catalog JSON; the built-in catalog when unset
    pub(crate) catalog: Option<PathBuf>,
    /// Sample generator seed
    pub(crate) seed: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            state: DEFAULT_STATE.to_string(),
            catalog: None,
            seed: 42,
        }
    }
}

impl AppConfig {
    /// Parse settings from JSON, filling absent fields with defaults.
    pub(crate) fn from_json(json: &str) -> Result<Self, DataError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings from `path`, or from the default location when `path`
    /// is `None`. A missing default file yields the defaults; a missing
    /// explicit file is an error.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self, DataError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match default_config_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        let json = std::fs::read_to_string(&path)?;
        tracing::debug!(path = %path.display(), "Loaded config file");
        Self::from_json(&json)
    }

    /// Directory holding raw portal exports.
    pub(crate) fn raw_dir(&self) -> PathBuf {
        self.data_dir.join("raw")
    }

    /// Path of the persisted tidy dataset.
    pub(crate) fn tidy_path(&self) -> PathBuf {
        self.data_dir.join("processed").join(TIDY_FILE)
    }

    /// The configured catalog, or the built-in one.
    pub(crate) fn catalog(&self) -> Result<Catalog, DataError> {
        self.catalog
            .as_ref()
            .map_or_else(|| Ok(Catalog::default()), Catalog::load)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.state, "India");
        assert_eq!(config.seed, 42);
        assert!(config.data_dir.ends_with("vahan"));
        assert!(config.tidy_path().ends_with("processed/registrations_tidy.csv"));
    }

    #[test]
    fn test_partial_file() {
        let config = AppConfig::from_json(r#"{ "data_dir": "/tmp/vahan", "seed": 7 }"#).unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/tmp/vahan"));
        assert_eq!(config.seed, 7);
        assert_eq!(config.state, "India");
        assert_eq!(config.raw_dir(), PathBuf::from("/tmp/vahan/raw"));
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let path = std::env::temp_dir().join("vahan_missing_config.json");
        assert!(AppConfig::load(Some(&path)).is_err());
    }

    #[test]
    fn test_builtin_catalog() {
        let catalog = AppConfig::default().catalog().unwrap();
        assert_eq!(catalog.categories.len(), 3);
    }
}
