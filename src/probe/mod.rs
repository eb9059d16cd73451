//! Compatibility probes.
//!
//! This module provides the leaf of the engine: answering "does this
//! toolchain version work with this package?" for one version at a time.
//!
//! # Modules
//!
//! - [`environment`] - The [`EnvironmentManager`] capability wrapping external tooling
//! - [`package`] - Package specifications and module-name derivation
//! - [`scratch`] - Scoped scratch directories
//! - [`version_probe`] - The fail-closed [`VersionProbe`]
//! - [`mock`] - In-memory managers and probes for tests

pub mod environment;
pub mod mock;
pub mod package;
pub mod scratch;
pub mod version_probe;

pub use environment::{Environment, EnvironmentManager};
pub use mock::{MockManager, MockProbe};
pub use package::{normalize_module_name, PackageSpec, CONTROL_PACKAGE, CONTROL_VERSION_SPEC};
pub use scratch::ScratchDir;
pub use version_probe::{ProbeFailure, ProbeOutcome, VersionProbe};

/// The predicate the compatibility search is driven by.
///
/// Implementations never fail: anything inconclusive is `false` or `None`.
pub trait CompatibilityProbe {
    /// Whether `version` works with `package` installed, or on its own when
    /// `package` is `None`.
    fn probe(&self, version: &str, package: Option<&PackageSpec>) -> bool;

    /// Concrete version of `package` that gets installed under `version`.
    fn resolve_version(&self, version: &str, package: &PackageSpec) -> Option<String>;
}

impl<P: CompatibilityProbe + ?Sized> CompatibilityProbe for &P {
    fn probe(&self, version: &str, package: Option<&PackageSpec>) -> bool {
        (**self).probe(version, package)
    }

    fn resolve_version(&self, version: &str, package: &PackageSpec) -> Option<String> {
        (**self).resolve_version(version, package)
    }
}
