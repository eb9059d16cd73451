//! Per-package experiment results.

use crate::probe::{PackageSpec, CONTROL_PACKAGE, CONTROL_VERSION_SPEC};
use serde::{Deserialize, Serialize};

/// Outcome of testing one package (or the control case).
///
/// Serialized field names are consumed by downstream charting and must stay
/// stable. Absent values serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentResult {
    /// Package name, or `CONTROL` for the baseline.
    pub package_name: String,

    /// Constraint the package was installed with.
    pub version_spec: String,

    /// Concrete version installed under the newest toolchain.
    pub resolved_version: Option<String>,

    /// Oldest toolchain version the package worked with.
    pub oldest_compatible: Option<String>,

    /// Newest toolchain version, recorded for charting.
    pub latest_compatible: Option<String>,

    /// Diagnostic for a package whose test could not complete.
    pub error: Option<String>,
}

impl ExperimentResult {
    /// Create an empty result.
    pub fn new(package_name: impl Into<String>, version_spec: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
            version_spec: version_spec.into(),
            resolved_version: None,
            oldest_compatible: None,
            latest_compatible: None,
            error: None,
        }
    }

    /// Create an empty result for the no-dependency baseline.
    pub fn control() -> Self {
        Self::new(CONTROL_PACKAGE, CONTROL_VERSION_SPEC)
    }

    /// Create an empty result for a catalog package.
    pub fn for_package(package: &PackageSpec) -> Self {
        Self::new(package.name.clone(), package.version_spec.clone())
    }

    /// Whether this is the baseline record.
    pub fn is_control(&self) -> bool {
        self.package_name == CONTROL_PACKAGE
    }

    /// Whether some tested toolchain version worked.
    pub fn is_compatible(&self) -> bool {
        self.oldest_compatible.is_some()
    }

    /// Whether the test was cut short by an error.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
