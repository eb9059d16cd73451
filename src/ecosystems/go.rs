//! Go toolchains via the `golang.org/dl` wrappers.
//!
//! Each candidate version is a wrapper binary `go<version>`, installed by the
//! bootstrap `go` and downloaded on first use. An environment is a module
//! with a single `main` package. Installing a package requires it with
//! `go get` and imports it for side effects; the check is `go build`.

use super::path_arg;
use crate::config::schema::Timeouts;
use crate::error::Result;
use crate::probe::{Environment, EnvironmentManager, PackageSpec};
use crate::shell::{execute_checked, CommandOptions};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Module path of the generated environment.
const MODULE_PATH: &str = "compatcheck";

/// First minor release whose `go` directive carries a patch number.
const PATCH_DIRECTIVE_SINCE_MINOR: u32 = 21;

/// Drives the bootstrap `go` and the per-version wrappers it installs.
#[derive(Debug, Clone)]
pub struct GoManager {
    go: String,
    bin_dir: PathBuf,
    timeouts: Timeouts,
}

impl GoManager {
    /// Create a manager that bootstraps with `go` from `PATH`.
    pub fn new(timeouts: Timeouts) -> Self {
        Self {
            go: "go".to_string(),
            bin_dir: default_bin_dir(),
            timeouts,
        }
    }

    /// Use a different bootstrap `go` executable.
    pub fn with_program(mut self, go: impl Into<String>) -> Self {
        self.go = go.into();
        self
    }

    /// Install and look up version wrappers in `dir`.
    pub fn with_bin_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.bin_dir = dir.into();
        self
    }

    /// Wrapper binary for `version`.
    pub fn wrapper(&self, version: &str) -> PathBuf {
        let name = if cfg!(windows) {
            format!("go{}.exe", version)
        } else {
            format!("go{}", version)
        };
        self.bin_dir.join(name)
    }

    fn options(&self, timeout: Duration) -> Result<CommandOptions> {
        let mut options = CommandOptions::with_timeout(timeout);
        options
            .env
            .insert("GOBIN".to_string(), path_arg(&self.bin_dir)?.to_string());
        // Keep 1.21+ from switching to the toolchain named in go.mod.
        options
            .env
            .insert("GOTOOLCHAIN".to_string(), "local".to_string());
        Ok(options)
    }

    fn go(&self, env: &Environment, args: &[&str], timeout: Duration) -> Result<String> {
        let wrapper = self.wrapper(&env.toolchain);
        let options = self.options(timeout)?.in_dir(&env.root);
        execute_checked(path_arg(&wrapper)?, args, &options).map(|r| r.stdout)
    }
}

/// Where `go install` puts binaries: `$GOBIN`, then the first `$GOPATH`
/// entry's `bin`, then `~/go/bin`.
pub fn default_bin_dir() -> PathBuf {
    bin_dir_from(&super::sourced::home_dir(), |key| std::env::var(key).ok())
}

fn bin_dir_from<F>(home: &Path, env_fn: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(gobin) = env_fn("GOBIN").filter(|v| !v.is_empty()) {
        return PathBuf::from(gobin);
    }
    if let Some(gopath) = env_fn("GOPATH") {
        if let Some(first) = std::env::split_paths(&gopath).find(|p| !p.as_os_str().is_empty()) {
            return first.join("bin");
        }
    }
    home.join("go").join("bin")
}

/// `go` directive for `version`: `1.N` before 1.21, the full version after.
pub fn go_directive(version: &str) -> String {
    let mut parts = version.split('.');
    let major = parts.next().unwrap_or(version);
    match parts.next().and_then(|minor| minor.parse::<u32>().ok()) {
        Some(minor) if minor < PATCH_DIRECTIVE_SINCE_MINOR => format!("{}.{}", major, minor),
        _ => version.to_string(),
    }
}

/// `go.mod` for the environment.
pub fn go_mod(version: &str) -> String {
    format!("module {}\n\ngo {}\n", MODULE_PATH, go_directive(version))
}

/// `main.go`, importing `package` for side effects when given.
pub fn main_source(package: Option<&PackageSpec>) -> String {
    match package {
        Some(p) => format!(
            "package main\n\nimport _ \"{}\"\n\nfunc main() {{}}\n",
            p.import_path()
        ),
        None => "package main\n\nfunc main() {}\n".to_string(),
    }
}

/// `module@query` argument for `go get`.
pub fn module_query(package: &PackageSpec) -> String {
    match package.version_spec.trim() {
        "" => format!("{}@latest", package.name),
        spec => format!("{}@{}", package.name, spec),
    }
}

/// Version of `module` in `go list -m` output.
pub fn parse_list_version(output: &str, module: &str) -> Option<String> {
    output.lines().find_map(|line| {
        let mut fields = line.split_whitespace();
        match (fields.next(), fields.next()) {
            (Some(path), Some(version)) if path == module => Some(version.to_string()),
            _ => None,
        }
    })
}

impl EnvironmentManager for GoManager {
    fn name(&self) -> &str {
        "go"
    }

    fn install_toolchain(&self, version: &str) -> Result<()> {
        let options = self.options(self.timeouts.toolchain_install())?;
        let source = format!("golang.org/dl/go{}@latest", version);
        execute_checked(&self.go, &["install", &source], &options)?;

        let wrapper = self.wrapper(version);
        execute_checked(path_arg(&wrapper)?, &["download"], &options)?;
        Ok(())
    }

    fn create_environment(&self, version: &str, dest: &Path) -> Result<Environment> {
        fs::create_dir_all(dest)?;
        fs::write(dest.join("go.mod"), go_mod(version))?;
        fs::write(dest.join("main.go"), main_source(None))?;
        Ok(Environment::new(version, dest))
    }

    fn run_smoke_check(&self, env: &Environment) -> Result<()> {
        self.go(env, &["build", "./..."], self.timeouts.check())?;
        Ok(())
    }

    fn install_package(&self, env: &Environment, package: &PackageSpec) -> Result<()> {
        fs::write(env.root.join("main.go"), main_source(Some(package)))?;
        let target = module_query(package);
        let timeout = self.timeouts.package_install();
        self.go(env, &["get", "-d", &target], timeout)?;
        self.go(env, &["mod", "tidy"], timeout)?;
        Ok(())
    }

    fn import_package(&self, env: &Environment, _package: &PackageSpec) -> Result<()> {
        self.go(env, &["build", "./..."], self.timeouts.check())?;
        Ok(())
    }

    fn query_installed_version(
        &self,
        env: &Environment,
        package: &PackageSpec,
    ) -> Result<Option<String>> {
        let stdout = self.go(
            env,
            &["list", "-m", &package.name],
            self.timeouts.version_query(),
        )?;
        Ok(parse_list_version(&stdout, &package.name))
    }
}
