//! Configuration validation rules.
//!
//! This module validates a catalog for correctness:
//! - At least one toolchain version, with no duplicates
//! - Package names are non-empty, unique, and not the reserved `CONTROL`
//! - Java packages are `groupId:artifactId` coordinates
//! - Every timeout and `max_parallel` is positive

use crate::config::schema::CatalogConfig;
use crate::ecosystems::{java, Ecosystem};
use crate::error::{CompatError, Result};
use crate::probe::CONTROL_PACKAGE;
use std::collections::HashSet;

/// Validation error with context.
#[derive(Debug, Clone)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
    /// Package name if error is package-specific
    pub package: Option<String>,
}

impl ValidationError {
    fn new(rule: &str, message: String) -> Self {
        Self {
            rule: rule.to_string(),
            message,
            package: None,
        }
    }

    fn for_package(rule: &str, package: &str, message: String) -> Self {
        Self {
            rule: rule.to_string(),
            message,
            package: Some(package.to_string()),
        }
    }
}

/// Validate a catalog and return all errors.
///
/// This function collects all validation errors rather than stopping
/// at the first one, allowing users to fix multiple issues at once.
pub fn validate_config(config: &CatalogConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    errors.extend(validate_versions(config));
    errors.extend(validate_packages(config));
    errors.extend(validate_settings(config));

    errors
}

fn validate_versions(config: &CatalogConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.toolchain_versions.is_empty() {
        errors.push(ValidationError::new(
            "no-versions",
            "At least one toolchain version is required".to_string(),
        ));
    }

    let mut seen = HashSet::new();
    for version in &config.toolchain_versions {
        if version.trim().is_empty() {
            errors.push(ValidationError::new(
                "empty-version",
                "Toolchain versions must not be empty".to_string(),
            ));
        } else if !seen.insert(version.as_str()) {
            errors.push(ValidationError::new(
                "duplicate-version",
                format!("Toolchain version '{}' is listed more than once", version),
            ));
        }
    }

    errors
}

fn validate_packages(config: &CatalogConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut seen = HashSet::new();

    for package in &config.packages {
        let name = package.name.as_str();

        if name.trim().is_empty() {
            errors.push(ValidationError::new(
                "empty-package",
                "Package names must not be empty".to_string(),
            ));
            continue;
        }

        if package.is_control() {
            errors.push(ValidationError::for_package(
                "reserved-package",
                name,
                format!("Package name '{}' is reserved for the control case", CONTROL_PACKAGE),
            ));
        }

        if config.ecosystem == Ecosystem::Java && java::coordinate(name).is_err() {
            errors.push(ValidationError::for_package(
                "maven-coordinate",
                name,
                format!("Package '{}' must be a groupId:artifactId coordinate", name),
            ));
        }

        if !seen.insert(name) {
            errors.push(ValidationError::for_package(
                "duplicate-package",
                name,
                format!("Package '{}' is listed more than once", name),
            ));
        }
    }

    errors
}

fn validate_settings(config: &CatalogConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let settings = &config.settings;

    if settings.max_parallel == 0 {
        errors.push(ValidationError::new(
            "max-parallel",
            "settings.max_parallel must be at least 1".to_string(),
        ));
    }

    let t = &settings.timeouts;
    for (name, secs) in [
        ("toolchain_install", t.toolchain_install),
        ("environment_create", t.environment_create),
        ("package_install", t.package_install),
        ("check", t.check),
        ("version_query", t.version_query),
    ] {
        if secs == 0 {
            errors.push(ValidationError::new(
                "zero-timeout",
                format!("settings.timeouts.{} must be greater than zero", name),
            ));
        }
    }

    errors
}

/// Validate a catalog, combining all problems into one error.
pub fn validate(config: &CatalogConfig) -> Result<()> {
    let errors = validate_config(config);

    if errors.is_empty() {
        Ok(())
    } else {
        let messages: Vec<_> = errors.iter().map(|e| e.message.clone()).collect();
        Err(CompatError::ConfigValidationError {
            message: messages.join("; "),
        })
    }
}
