//! Fail-closed compatibility probes.
//!
//! [`VersionProbe`] answers one question per call: does toolchain version V,
//! with package P installed (or nothing installed), behave correctly? Each
//! call provisions a fresh environment inside a [`ScratchDir`], so probes
//! share no state and may run concurrently.
//!
//! Any failure along the way (a non-zero exit, an expired timeout, a missing
//! binary) is logged and reported as "not compatible". An inconclusive probe
//! is never counted as a pass.

use crate::probe::environment::{Environment, EnvironmentManager};
use crate::probe::package::PackageSpec;
use crate::probe::scratch::ScratchDir;
use crate::probe::CompatibilityProbe;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a probe failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeFailure {
    /// Toolchain install or environment creation failed.
    #[error("provisioning failed: {0}")]
    Provisioning(String),

    /// Package installation failed.
    #[error("install failed: {0}")]
    Install(String),

    /// Package installed but could not be loaded, or the bare toolchain
    /// could not run a trivial instruction.
    #[error("import failed: {0}")]
    Import(String),

    /// Installed version could not be determined.
    #[error("version resolution failed: {0}")]
    Resolution(String),
}

/// Outcome of a single probe attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Every step succeeded.
    Success,
    /// Some step failed; later steps were not attempted.
    Failure(ProbeFailure),
}

impl ProbeOutcome {
    /// Whether the probe passed.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

/// Probes toolchain versions through an [`EnvironmentManager`].
#[derive(Debug)]
pub struct VersionProbe<M> {
    manager: M,
    scratch_root: Option<PathBuf>,
}

impl<M: EnvironmentManager> VersionProbe<M> {
    /// Create a probe that places scratch environments in the system temp dir.
    pub fn new(manager: M) -> Self {
        Self {
            manager,
            scratch_root: None,
        }
    }

    /// Place scratch environments under `root` instead of the system temp dir.
    pub fn with_scratch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.scratch_root = Some(root.into());
        self
    }

    /// The underlying manager.
    pub fn manager(&self) -> &M {
        &self.manager
    }

    /// Install or activate `version`, returning whether it is usable.
    pub fn ensure_toolchain_available(&self, version: &str) -> bool {
        match self.manager.install_toolchain(version) {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!("{}: toolchain {} unavailable: {}", self.manager.name(), version, e);
                false
            }
        }
    }

    /// Run the full probe protocol and report which step failed, if any.
    pub fn check(&self, version: &str, package: Option<&PackageSpec>) -> ProbeOutcome {
        let outcome = self.run_protocol(version, package);
        let subject = package.map(|p| p.name.as_str()).unwrap_or("toolchain");
        match &outcome {
            ProbeOutcome::Success => tracing::info!("{} @ {}: ok", subject, version),
            ProbeOutcome::Failure(failure) => {
                tracing::info!("{} @ {}: {}", subject, version, failure)
            }
        }
        outcome
    }

    fn run_protocol(&self, version: &str, package: Option<&PackageSpec>) -> ProbeOutcome {
        let (_scratch, env) = match self.provision(version) {
            Ok(provisioned) => provisioned,
            Err(failure) => return ProbeOutcome::Failure(failure),
        };

        let Some(package) = package else {
            return match self.manager.run_smoke_check(&env) {
                Ok(()) => ProbeOutcome::Success,
                Err(e) => ProbeOutcome::Failure(ProbeFailure::Import(e.to_string())),
            };
        };

        if let Err(e) = self.manager.install_package(&env, package) {
            return ProbeOutcome::Failure(ProbeFailure::Install(e.to_string()));
        }

        match self.manager.import_package(&env, package) {
            Ok(()) => ProbeOutcome::Success,
            Err(e) => ProbeOutcome::Failure(ProbeFailure::Import(e.to_string())),
        }
    }

    /// Install `package` at `version` and read back the concrete version.
    pub fn resolve(&self, version: &str, package: &PackageSpec) -> Result<String, ProbeFailure> {
        let (_scratch, env) = self.provision(version)?;

        self.manager
            .install_package(&env, package)
            .map_err(|e| ProbeFailure::Install(e.to_string()))?;

        match self.manager.query_installed_version(&env, package) {
            Ok(Some(resolved)) => Ok(resolved),
            Ok(None) => Err(ProbeFailure::Resolution(format!(
                "{} not reported by {}",
                package.name,
                self.manager.name()
            ))),
            Err(e) => Err(ProbeFailure::Resolution(e.to_string())),
        }
    }

    /// Toolchain install, scratch directory and empty environment.
    ///
    /// The returned [`ScratchDir`] must outlive every use of the environment.
    fn provision(&self, version: &str) -> Result<(ScratchDir, Environment), ProbeFailure> {
        if !self.ensure_toolchain_available(version) {
            return Err(ProbeFailure::Provisioning(format!(
                "toolchain {} unavailable",
                version
            )));
        }

        let scratch = match &self.scratch_root {
            Some(root) => ScratchDir::new_in(root),
            None => ScratchDir::new(),
        }
        .map_err(|e| ProbeFailure::Provisioning(e.to_string()))?;

        let env = self
            .manager
            .create_environment(version, &scratch.environment_path())
            .map_err(|e| ProbeFailure::Provisioning(e.to_string()))?;

        Ok((scratch, env))
    }

    /// Root that scratch environments are created under, if overridden.
    pub fn scratch_root(&self) -> Option<&Path> {
        self.scratch_root.as_deref()
    }
}

impl<M: EnvironmentManager> CompatibilityProbe for VersionProbe<M> {
    fn probe(&self, version: &str, package: Option<&PackageSpec>) -> bool {
        self.check(version, package).is_success()
    }

    fn resolve_version(&self, version: &str, package: &PackageSpec) -> Option<String> {
        match self.resolve(version, package) {
            Ok(resolved) => Some(resolved),
            Err(failure) => {
                tracing::info!("{} @ {}: {}", package.name, version, failure);
                None
            }
        }
    }
}
