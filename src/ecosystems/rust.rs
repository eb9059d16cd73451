//! Rust toolchains via `rustup` and `cargo`.
//!
//! An environment here is a generated library crate. Installing a package
//! adds it as a dependency and resolves a lockfile; importing it means the
//! crate must type-check cleanly with the dependency linked in.
//!
//! The generated crate targets the 2015 edition and links dependencies with
//! `extern crate`, which every stable toolchain back to 1.0 parses. `cargo
//! check` only ships from 1.16, so older toolchains run `cargo build`.

use crate::config::schema::Timeouts;
use crate::error::Result;
use crate::probe::{Environment, EnvironmentManager, PackageSpec};
use crate::shell::{execute_checked, CommandOptions};
use std::fs;
use std::path::Path;

/// Drives `rustup` for toolchain installs and `cargo +<version>` for checks.
#[derive(Debug, Clone)]
pub struct RustupManager {
    rustup: String,
    cargo: String,
    timeouts: Timeouts,
}

impl RustupManager {
    /// Create a manager that invokes `rustup` and `cargo` from `PATH`.
    pub fn new(timeouts: Timeouts) -> Self {
        Self {
            rustup: "rustup".to_string(),
            cargo: "cargo".to_string(),
            timeouts,
        }
    }

    /// Use different `rustup` and `cargo` executables.
    pub fn with_programs(mut self, rustup: impl Into<String>, cargo: impl Into<String>) -> Self {
        self.rustup = rustup.into();
        self.cargo = cargo.into();
        self
    }

    fn cargo(&self, env: &Environment, subcommand: &str, options: CommandOptions) -> Result<()> {
        let toolchain = format!("+{}", env.toolchain);
        let options = options.in_dir(&env.root);
        execute_checked(&self.cargo, &[&toolchain, subcommand], &options)?;
        Ok(())
    }
}

/// First stable minor release whose cargo has a `check` subcommand.
const CARGO_CHECK_SINCE_MINOR: u32 = 16;

/// Cargo subcommand that compiles the crate on `toolchain` without running it.
pub fn check_subcommand(toolchain: &str) -> &'static str {
    let minor = toolchain
        .strip_prefix("1.")
        .and_then(|rest| rest.split('.').next())
        .and_then(|minor| minor.parse::<u32>().ok());
    match minor {
        Some(minor) if minor < CARGO_CHECK_SINCE_MINOR => "build",
        _ => "check",
    }
}

/// `Cargo.toml` for the probe crate, with `package` as its only dependency.
pub fn manifest(package: Option<&PackageSpec>) -> String {
    let mut out = String::from("[package]\n");
    match package {
        Some(p) => out.push_str(&format!("name = \"probe-{}\"\n", p.name)),
        None => out.push_str("name = \"probe-control\"\n"),
    }
    out.push_str("version = \"0.1.0\"\n");
    out.push_str("authors = [\"compat-probe\"]\n\n");
    out.push_str("[dependencies]\n");
    if let Some(p) = package {
        let spec = match p.version_spec.trim() {
            "" => "*",
            spec => spec,
        };
        out.push_str(&format!("{} = \"{}\"\n", p.name, spec));
    }
    out
}

/// `src/lib.rs` for the probe crate.
pub fn library_source(package: Option<&PackageSpec>) -> String {
    match package {
        Some(p) => format!("extern crate {};\n", p.module_name()),
        None => String::new(),
    }
}

/// Version recorded for `name` in a `Cargo.lock`.
pub fn parse_lock_version(lock: &str, name: &str) -> Option<String> {
    let wanted = format!("name = \"{}\"", name);
    let mut in_package = false;

    for line in lock.lines().map(str::trim) {
        if line.starts_with('[') {
            in_package = false;
        } else if line == wanted {
            in_package = true;
        } else if in_package {
            if let Some(version) = line.strip_prefix("version = ") {
                return Some(version.trim_matches('"').to_string());
            }
        }
    }

    None
}

fn write_crate(root: &Path, package: Option<&PackageSpec>) -> Result<()> {
    fs::create_dir_all(root.join("src"))?;
    fs::write(root.join("Cargo.toml"), manifest(package))?;
    fs::write(root.join("src").join("lib.rs"), library_source(package))?;
    Ok(())
}

impl EnvironmentManager for RustupManager {
    fn name(&self) -> &str {
        "rustup"
    }

    fn install_toolchain(&self, version: &str) -> Result<()> {
        let options = CommandOptions::with_timeout(self.timeouts.toolchain_install());
        execute_checked(
            &self.rustup,
            &["toolchain", "install", version, "--profile", "minimal"],
            &options,
        )?;
        Ok(())
    }

    fn create_environment(&self, version: &str, dest: &Path) -> Result<Environment> {
        write_crate(dest, None)?;
        Ok(Environment::new(version, dest))
    }

    fn run_smoke_check(&self, env: &Environment) -> Result<()> {
        let subcommand = check_subcommand(&env.toolchain);
        self.cargo(env, subcommand, CommandOptions::with_timeout(self.timeouts.check()))
    }

    fn install_package(&self, env: &Environment, package: &PackageSpec) -> Result<()> {
        write_crate(&env.root, Some(package))?;
        self.cargo(
            env,
            "generate-lockfile",
            CommandOptions::with_timeout(self.timeouts.package_install()),
        )
    }

    fn import_package(&self, env: &Environment, _package: &PackageSpec) -> Result<()> {
        let subcommand = check_subcommand(&env.toolchain);
        self.cargo(env, subcommand, CommandOptions::with_timeout(self.timeouts.check()))
    }

    fn query_installed_version(
        &self,
        env: &Environment,
        package: &PackageSpec,
    ) -> Result<Option<String>> {
        let lock = fs::read_to_string(env.root.join("Cargo.lock"))?;
        Ok(parse_lock_version(&lock, &package.name))
    }
}
