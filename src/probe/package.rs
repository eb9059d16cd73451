//! Package specifications.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Reserved package name for the no-dependency baseline.
pub const CONTROL_PACKAGE: &str = "CONTROL";

/// Version spec recorded for the baseline.
pub const CONTROL_VERSION_SPEC: &str = "none";

/// A package to install and import, with the constraint handed to the resolver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PackageSpec {
    /// Name as known to the package registry.
    pub name: String,

    /// Version constraint in the ecosystem's own syntax (e.g. `>=2.32`, `1`).
    #[serde(default)]
    pub version_spec: String,

    /// Module name to import when it differs from the derived one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub import_name: Option<String>,
}

impl PackageSpec {
    /// Create a spec with a derived import name.
    pub fn new(name: impl Into<String>, version_spec: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version_spec: version_spec.into(),
            import_name: None,
        }
    }

    /// Override the runtime-visible module name.
    pub fn with_import_name(mut self, import_name: impl Into<String>) -> Self {
        self.import_name = Some(import_name.into());
        self
    }

    /// The name used to import or `use` the package at runtime.
    ///
    /// Falls back to the registry name with `-` replaced by `_`.
    pub fn module_name(&self) -> String {
        match &self.import_name {
            Some(name) => name.clone(),
            None => normalize_module_name(&self.name),
        }
    }

    /// The import path for ecosystems that import by registry name (Go
    /// modules, npm packages), unless `import_name` points elsewhere.
    pub fn import_path(&self) -> &str {
        self.import_name.as_deref().unwrap_or(&self.name)
    }

    /// Whether this is the reserved baseline sentinel.
    pub fn is_control(&self) -> bool {
        self.name == CONTROL_PACKAGE
    }
}

/// Derive a module name from a registry name.
pub fn normalize_module_name(name: &str) -> String {
    name.replace('-', "_")
}
