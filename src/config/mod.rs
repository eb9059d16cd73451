//! Catalog configuration loading, parsing, and validation.
//!
//! This module handles all aspects of configuration:
//! - Schema definitions in [`schema`]
//! - File loading in [`loader`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use compat_probe::config::{load_catalog, validate};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let path = temp.path().join("catalog.yml");
//! fs::write(
//!     &path,
//!     "ecosystem: python\ntoolchain_versions: [\"3.12\", \"3.13\"]\npackages:\n  - name: six\n",
//! )
//! .unwrap();
//!
//! let catalog = load_catalog(Some(&path), None).unwrap();
//! validate(&catalog).unwrap();
//! assert_eq!(catalog.packages[0].name, "six");
//! ```

pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::{load_catalog, load_config_file, parse_config};
pub use schema::{CatalogConfig, Settings, Timeouts, Tools};
pub use validator::{validate, validate_config, ValidationError};

/// JSON Schema for catalog files.
pub fn catalog_schema() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(CatalogConfig)).unwrap_or_default()
}
