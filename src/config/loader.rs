//! Catalog file loading.
//!
//! A run's catalog comes from one of two places, in priority order:
//! 1. An explicit `--config` file
//! 2. The built-in catalog for the selected ecosystem

use crate::config::schema::CatalogConfig;
use crate::config::validator::validate;
use crate::ecosystems::{builtin_catalog, Ecosystem};
use crate::error::{CompatError, Result};
use std::fs;
use std::path::Path;

/// Load a catalog file and parse it into [`CatalogConfig`].
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<CatalogConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            CompatError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            CompatError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into [`CatalogConfig`].
///
/// # Arguments
///
/// * `content` - The YAML content to parse
/// * `source_path` - Path for error reporting
pub fn parse_config(content: &str, source_path: &Path) -> Result<CatalogConfig> {
    serde_yaml::from_str(content).map_err(|e| CompatError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Resolve and validate the catalog for a run.
///
/// An explicit file wins. Its `ecosystem` must agree with `ecosystem` when
/// both are given.
pub fn load_catalog(config: Option<&Path>, ecosystem: Option<Ecosystem>) -> Result<CatalogConfig> {
    let catalog = match config {
        Some(path) => {
            let catalog = load_config_file(path)?;
            if let Some(requested) = ecosystem {
                if requested != catalog.ecosystem {
                    return Err(CompatError::ConfigValidationError {
                        message: format!(
                            "{} is a {} catalog but --ecosystem {} was given",
                            path.display(),
                            catalog.ecosystem,
                            requested
                        ),
                    });
                }
            }
            tracing::debug!("Loaded catalog from {}", path.display());
            catalog
        }
        None => builtin_catalog(ecosystem.unwrap_or_default())?,
    };

    validate(&catalog)?;
    Ok(catalog)
}
