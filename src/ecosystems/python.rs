//! Python environments via `uv`.

use super::path_arg;
use crate::config::schema::Timeouts;
use crate::error::Result;
use crate::probe::{Environment, EnvironmentManager, PackageSpec};
use crate::shell::{execute_checked, CommandOptions};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Matches the `Version:` field of `uv pip show` output.
static VERSION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^Version:\s*(\S+)\s*$").expect("VERSION_LINE must compile")
});

/// Drives `uv` for interpreter installs, virtualenvs and package installs.
#[derive(Debug, Clone)]
pub struct UvManager {
    program: String,
    timeouts: Timeouts,
}

impl UvManager {
    /// Create a manager that invokes `uv` from `PATH`.
    pub fn new(timeouts: Timeouts) -> Self {
        Self {
            program: "uv".to_string(),
            timeouts,
        }
    }

    /// Use a different `uv` executable.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    fn uv(&self, args: &[&str], options: &CommandOptions) -> Result<String> {
        execute_checked(&self.program, args, options).map(|r| r.stdout)
    }
}

/// Interpreter inside a virtualenv.
pub fn venv_python(root: &Path) -> PathBuf {
    if cfg!(windows) {
        root.join("Scripts").join("python.exe")
    } else {
        root.join("bin").join("python")
    }
}

/// Requirement string handed to the installer, e.g. `requests>=2.32`.
pub fn requirement(package: &PackageSpec) -> String {
    format!("{}{}", package.name, package.version_spec.trim())
}

/// Extract the installed version from `uv pip show` output.
pub fn parse_show_version(output: &str) -> Option<String> {
    VERSION_LINE
        .captures(output)
        .map(|caps| caps[1].to_string())
}

impl EnvironmentManager for UvManager {
    fn name(&self) -> &str {
        "uv"
    }

    fn install_toolchain(&self, version: &str) -> Result<()> {
        let options = CommandOptions::with_timeout(self.timeouts.toolchain_install());
        self.uv(&["python", "install", version], &options)?;
        Ok(())
    }

    fn create_environment(&self, version: &str, dest: &Path) -> Result<Environment> {
        let options = CommandOptions::with_timeout(self.timeouts.environment_create());
        self.uv(&["venv", "--python", version, path_arg(dest)?], &options)?;
        Ok(Environment::new(version, dest))
    }

    fn run_smoke_check(&self, env: &Environment) -> Result<()> {
        let python = venv_python(&env.root);
        let options = CommandOptions::with_timeout(self.timeouts.check());
        execute_checked(path_arg(&python)?, &["-c", "print('ok')"], &options)?;
        Ok(())
    }

    fn install_package(&self, env: &Environment, package: &PackageSpec) -> Result<()> {
        let python = venv_python(&env.root);
        let requirement = requirement(package);
        let options = CommandOptions::with_timeout(self.timeouts.package_install());
        self.uv(
            &["pip", "install", "--python", path_arg(&python)?, &requirement],
            &options,
        )?;
        Ok(())
    }

    fn import_package(&self, env: &Environment, package: &PackageSpec) -> Result<()> {
        let python = venv_python(&env.root);
        let statement = format!("import {}", package.module_name());
        let options = CommandOptions::with_timeout(self.timeouts.check());
        execute_checked(path_arg(&python)?, &["-c", &statement], &options)?;
        Ok(())
    }

    fn query_installed_version(
        &self,
        env: &Environment,
        package: &PackageSpec,
    ) -> Result<Option<String>> {
        let python = venv_python(&env.root);
        let options = CommandOptions::with_timeout(self.timeouts.version_query());
        let stdout = self.uv(
            &["pip", "show", "--python", path_arg(&python)?, &package.name],
            &options,
        )?;
        Ok(parse_show_version(&stdout))
    }
}
