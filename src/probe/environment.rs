//! The external environment-manager capability.
//!
//! An [`EnvironmentManager`] wraps whatever tool installs toolchains and
//! packages for an ecosystem (`uv` for Python, `rustup` + `cargo` for Rust,
//! and so on).
//! Implementations report failures as errors; [`VersionProbe`] is the layer
//! that turns them into verdicts.
//!
//! [`VersionProbe`]: super::VersionProbe

use crate::error::Result;
use crate::probe::package::PackageSpec;
use std::path::{Path, PathBuf};

/// An isolated environment created for a single probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    /// Toolchain version the environment was created for.
    pub toolchain: String,

    /// Root of the environment on disk.
    pub root: PathBuf,
}

impl Environment {
    /// Create an environment handle.
    pub fn new(toolchain: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            toolchain: toolchain.into(),
            root: root.into(),
        }
    }
}

/// Operations a version/environment manager must provide.
///
/// Every call is expected to be bounded by a timeout chosen by the
/// implementation.
pub trait EnvironmentManager {
    /// Short name for logs (e.g. "uv").
    fn name(&self) -> &str;

    /// Install or activate a toolchain version. Must be idempotent.
    fn install_toolchain(&self, version: &str) -> Result<()>;

    /// Create an empty environment for `version` at `dest`.
    fn create_environment(&self, version: &str, dest: &Path) -> Result<Environment>;

    /// Run a trivial instruction with the bare toolchain.
    fn run_smoke_check(&self, env: &Environment) -> Result<()>;

    /// Install a package into the environment.
    fn install_package(&self, env: &Environment, package: &PackageSpec) -> Result<()>;

    /// Import or compile against an installed package.
    fn import_package(&self, env: &Environment, package: &PackageSpec) -> Result<()>;

    /// Concrete version of an installed package, if the registry reports one.
    fn query_installed_version(
        &self,
        env: &Environment,
        package: &PackageSpec,
    ) -> Result<Option<String>>;
}

impl<M: EnvironmentManager + ?Sized> EnvironmentManager for Box<M> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn install_toolchain(&self, version: &str) -> Result<()> {
        (**self).install_toolchain(version)
    }

    fn create_environment(&self, version: &str, dest: &Path) -> Result<Environment> {
        (**self).create_environment(version, dest)
    }

    fn run_smoke_check(&self, env: &Environment) -> Result<()> {
        (**self).run_smoke_check(env)
    }

    fn install_package(&self, env: &Environment, package: &PackageSpec) -> Result<()> {
        (**self).install_package(env, package)
    }

    fn import_package(&self, env: &Environment, package: &PackageSpec) -> Result<()> {
        (**self).import_package(env, package)
    }

    fn query_installed_version(
        &self,
        env: &Environment,
        package: &PackageSpec,
    ) -> Result<Option<String>> {
        (**self).query_installed_version(env, package)
    }
}
