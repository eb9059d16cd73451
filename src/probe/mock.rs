//! In-memory stand-ins for the external tooling.
//!
//! [`MockManager`] implements [`EnvironmentManager`] without spawning any
//! process, and [`MockProbe`] implements [`CompatibilityProbe`] from plain
//! predicates. Both record what was asked of them for later assertion.
//!
//! # Example
//!
//! ```
//! use compat_probe::probe::{CompatibilityProbe, MockProbe, PackageSpec};
//!
//! let probe = MockProbe::new().with_package("numpy", |v| v != "3.8");
//! let numpy = PackageSpec::new("numpy", ">=1.26");
//!
//! assert!(!probe.probe("3.8", Some(&numpy)));
//! assert!(probe.probe("3.12", Some(&numpy)));
//! assert_eq!(probe.probe_count(Some("numpy")), 2);
//! ```

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{CompatError, Result};
use crate::probe::environment::{Environment, EnvironmentManager};
use crate::probe::package::PackageSpec;
use crate::probe::CompatibilityProbe;

/// Scripted [`EnvironmentManager`] for tests.
///
/// Everything succeeds unless configured otherwise. Environments are real
/// directories so cleanup can be observed.
#[derive(Debug, Default)]
pub struct MockManager {
    failing_toolchains: HashSet<String>,
    timed_out_toolchains: HashSet<String>,
    failing_environments: HashSet<String>,
    failing_smoke_checks: HashSet<String>,
    install_failures: HashSet<(String, String)>,
    install_timeouts: HashSet<(String, String)>,
    import_failures: HashSet<(String, String)>,
    installed_versions: HashMap<String, String>,
    panic_on_install: HashSet<String>,
    calls: Mutex<Vec<String>>,
    environment_roots: Mutex<Vec<PathBuf>>,
}

impl MockManager {
    /// Create a manager where every operation succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make toolchain installation fail for `version`.
    pub fn with_failing_toolchain(mut self, version: &str) -> Self {
        self.failing_toolchains.insert(version.to_string());
        self
    }

    /// Make toolchain installation time out for `version`.
    pub fn with_timed_out_toolchain(mut self, version: &str) -> Self {
        self.timed_out_toolchains.insert(version.to_string());
        self
    }

    /// Make environment creation fail for `version`.
    pub fn with_failing_environment(mut self, version: &str) -> Self {
        self.failing_environments.insert(version.to_string());
        self
    }

    /// Make the bare-toolchain check fail for `version`.
    pub fn with_failing_smoke_check(mut self, version: &str) -> Self {
        self.failing_smoke_checks.insert(version.to_string());
        self
    }

    /// Make installing `package` fail under `version`.
    pub fn with_install_failure(mut self, package: &str, version: &str) -> Self {
        self.install_failures
            .insert((package.to_string(), version.to_string()));
        self
    }

    /// Make installing `package` time out under `version`.
    pub fn with_timed_out_install(mut self, package: &str, version: &str) -> Self {
        self.install_timeouts
            .insert((package.to_string(), version.to_string()));
        self
    }

    /// Make importing `package` fail under `version`.
    pub fn with_import_failure(mut self, package: &str, version: &str) -> Self {
        self.import_failures
            .insert((package.to_string(), version.to_string()));
        self
    }

    /// Report `resolved` as the installed version of `package`.
    pub fn with_installed_version(mut self, package: &str, resolved: &str) -> Self {
        self.installed_versions
            .insert(package.to_string(), resolved.to_string());
        self
    }

    /// Panic while installing `package`.
    pub fn with_panic_on_install(mut self, package: &str) -> Self {
        self.panic_on_install.insert(package.to_string());
        self
    }

    /// Every call made so far, as `operation version [package]`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Every environment root created so far.
    pub fn environment_roots(&self) -> Vec<PathBuf> {
        self.environment_roots
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    fn record(&self, call: String) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn failed(operation: &str, version: &str) -> CompatError {
        CompatError::CommandFailed {
            command: format!("mock {} {}", operation, version),
            code: Some(1),
        }
    }

    fn timed_out(operation: &str, version: &str) -> CompatError {
        CompatError::CommandTimedOut {
            command: format!("mock {} {}", operation, version),
            seconds: 0,
        }
    }

    fn key(package: &PackageSpec, env: &Environment) -> (String, String) {
        (package.name.clone(), env.toolchain.clone())
    }
}

impl EnvironmentManager for MockManager {
    fn name(&self) -> &str {
        "mock"
    }

    fn install_toolchain(&self, version: &str) -> Result<()> {
        self.record(format!("install_toolchain {}", version));
        if self.timed_out_toolchains.contains(version) {
            return Err(Self::timed_out("install_toolchain", version));
        }
        if self.failing_toolchains.contains(version) {
            return Err(Self::failed("install_toolchain", version));
        }
        Ok(())
    }

    fn create_environment(&self, version: &str, dest: &Path) -> Result<Environment> {
        self.record(format!("create_environment {}", version));
        if self.failing_environments.contains(version) {
            return Err(Self::failed("create_environment", version));
        }
        std::fs::create_dir_all(dest.join("bin"))?;
        std::fs::write(dest.join("pyvenv.cfg"), format!("version = {}\n", version))?;
        if let Ok(mut roots) = self.environment_roots.lock() {
            roots.push(dest.to_path_buf());
        }
        Ok(Environment::new(version, dest))
    }

    fn run_smoke_check(&self, env: &Environment) -> Result<()> {
        self.record(format!("run_smoke_check {}", env.toolchain));
        if self.failing_smoke_checks.contains(&env.toolchain) {
            return Err(Self::failed("run_smoke_check", &env.toolchain));
        }
        Ok(())
    }

    fn install_package(&self, env: &Environment, package: &PackageSpec) -> Result<()> {
        self.record(format!("install_package {} {}", env.toolchain, package.name));
        if self.panic_on_install.contains(&package.name) {
            panic!("mock install of {} exploded", package.name);
        }
        let key = Self::key(package, env);
        if self.install_timeouts.contains(&key) {
            return Err(Self::timed_out("install_package", &env.toolchain));
        }
        if self.install_failures.contains(&key) {
            return Err(Self::failed("install_package", &env.toolchain));
        }
        std::fs::write(env.root.join(format!("{}.installed", package.name)), "")?;
        Ok(())
    }

    fn import_package(&self, env: &Environment, package: &PackageSpec) -> Result<()> {
        self.record(format!("import_package {} {}", env.toolchain, package.name));
        if self.import_failures.contains(&Self::key(package, env)) {
            return Err(Self::failed("import_package", &env.toolchain));
        }
        Ok(())
    }

    fn query_installed_version(
        &self,
        env: &Environment,
        package: &PackageSpec,
    ) -> Result<Option<String>> {
        self.record(format!(
            "query_installed_version {} {}",
            env.toolchain, package.name
        ));
        Ok(self.installed_versions.get(&package.name).cloned())
    }
}

type Predicate = Box<dyn Fn(&str) -> bool + Send + Sync>;

/// [`CompatibilityProbe`] driven by per-package predicates.
///
/// Packages without a predicate fail every probe; the control case fails
/// unless [`MockProbe::with_control`] is set.
#[derive(Default)]
pub struct MockProbe {
    control: Option<Predicate>,
    packages: HashMap<String, Predicate>,
    resolved: HashMap<String, String>,
    panics: HashSet<String>,
    log: Mutex<Vec<(String, Option<String>)>>,
}

impl MockProbe {
    /// Create a probe where everything fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the predicate for the no-package baseline.
    pub fn with_control(mut self, predicate: impl Fn(&str) -> bool + Send + Sync + 'static) -> Self {
        self.control = Some(Box::new(predicate));
        self
    }

    /// Set the predicate for `package`.
    pub fn with_package(
        mut self,
        package: &str,
        predicate: impl Fn(&str) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.packages
            .insert(package.to_string(), Box::new(predicate));
        self
    }

    /// Report `resolved` from `resolve_version` for `package`.
    pub fn with_resolved(mut self, package: &str, resolved: &str) -> Self {
        self.resolved
            .insert(package.to_string(), resolved.to_string());
        self
    }

    /// Panic whenever `package` is probed or resolved.
    pub fn with_panic(mut self, package: &str) -> Self {
        self.panics.insert(package.to_string());
        self
    }

    /// Versions probed so far, in order, with the package name (None for control).
    pub fn probe_log(&self) -> Vec<(String, Option<String>)> {
        self.log.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Number of probes made for `package` (None for control).
    pub fn probe_count(&self, package: Option<&str>) -> usize {
        self.probe_log()
            .iter()
            .filter(|(_, p)| p.as_deref() == package)
            .count()
    }

    /// Versions probed for `package`, in order.
    pub fn probed_versions(&self, package: Option<&str>) -> Vec<String> {
        self.probe_log()
            .into_iter()
            .filter(|(_, p)| p.as_deref() == package)
            .map(|(v, _)| v)
            .collect()
    }
}

impl std::fmt::Debug for MockProbe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockProbe")
            .field("packages", &self.packages.keys().collect::<Vec<_>>())
            .field("resolved", &self.resolved)
            .field("panics", &self.panics)
            .finish()
    }
}

impl CompatibilityProbe for MockProbe {
    fn probe(&self, version: &str, package: Option<&PackageSpec>) -> bool {
        let name = package.map(|p| p.name.clone());
        if let Ok(mut log) = self.log.lock() {
            log.push((version.to_string(), name.clone()));
        }

        match name {
            None => self.control.as_ref().is_some_and(|f| f(version)),
            Some(name) => {
                if self.panics.contains(&name) {
                    panic!("mock probe of {} exploded", name);
                }
                self.packages.get(&name).is_some_and(|f| f(version))
            }
        }
    }

    fn resolve_version(&self, _version: &str, package: &PackageSpec) -> Option<String> {
        if self.panics.contains(&package.name) {
            panic!("mock resolve of {} exploded", package.name);
        }
        self.resolved.get(&package.name).cloned()
    }
}
