//! Node.js versions via `nvm` and `npm`.
//!
//! An environment is a directory with a `package.json` and an `.npmrc` that
//! turns on `engine-strict`, so a package whose `engines` field excludes the
//! active Node fails to install. Importing means `require`-ing it from a
//! script that prints a marker.

use super::sourced::{home_dir, locate_init_script, SourcedShell};
use crate::config::schema::Timeouts;
use crate::error::{CompatError, Result};
use crate::probe::{Environment, EnvironmentManager, PackageSpec};
use crate::shell::CommandOptions;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Script each environment runs.
const SCRIPT_FILE: &str = "check.js";

/// Printed by the control script.
const SMOKE_MARKER: &str = "ok";

/// Printed by the import script when `require` returns a module.
const IMPORT_MARKER: &str = "TEST_OK";

/// Drives `nvm` for Node versions and `npm` for packages.
#[derive(Debug, Clone)]
pub struct NodeManager {
    shell: SourcedShell,
    timeouts: Timeouts,
}

impl NodeManager {
    /// Create a manager that sources the usual `nvm.sh`.
    pub fn new(timeouts: Timeouts) -> Self {
        Self {
            shell: SourcedShell::new(default_nvm_script()),
            timeouts,
        }
    }

    /// Source a different `nvm.sh`.
    pub fn with_nvm_script(mut self, script: impl Into<PathBuf>) -> Self {
        self.shell = SourcedShell::new(script);
        self
    }

    /// The `nvm.sh` sourced before each call.
    pub fn nvm_script(&self) -> &Path {
        self.shell.init_script()
    }

    fn with_node(&self, env: &Environment, command: &[&str], timeout: Duration) -> Result<String> {
        let options = CommandOptions::with_timeout(timeout).in_dir(&env.root);
        let result = self
            .shell
            .run("nvm use \"$2\"", &env.toolchain, command, &options)?;
        Ok(result.stdout)
    }

    fn run_script(&self, env: &Environment, marker: &str) -> Result<()> {
        let stdout = self.with_node(env, &["node", SCRIPT_FILE], self.timeouts.check())?;
        if stdout.contains(marker) {
            Ok(())
        } else {
            Err(CompatError::Other(anyhow::anyhow!(
                "node {} did not print {}",
                SCRIPT_FILE,
                marker
            )))
        }
    }
}

/// `$NVM_DIR/nvm.sh`, `~/.nvm/nvm.sh` or `~/.config/nvm/nvm.sh`.
pub fn default_nvm_script() -> PathBuf {
    locate_init_script(
        &home_dir(),
        "NVM_DIR",
        &[".nvm", ".config/nvm"],
        "nvm.sh",
        |key| std::env::var(key).ok(),
    )
}

/// npm range for `package`; an empty spec means the latest release.
pub fn npm_range(package: &PackageSpec) -> &str {
    match package.version_spec.trim() {
        "" => "latest",
        spec => spec,
    }
}

/// `package.json` with `package` as the only dependency.
pub fn package_json(package: Option<&PackageSpec>) -> Result<String> {
    let mut dependencies = Map::new();
    if let Some(p) = package {
        dependencies.insert(p.name.clone(), Value::String(npm_range(p).to_string()));
    }
    let manifest = json!({
        "name": "compat-check",
        "version": "1.0.0",
        "private": true,
        "dependencies": dependencies,
    });
    Ok(serde_json::to_string_pretty(&manifest)? + "\n")
}

/// Script that `require`s `package`, or just prints the smoke marker.
pub fn check_script(package: Option<&PackageSpec>) -> Result<String> {
    match package {
        Some(p) => Ok(format!(
            "const pkg = require({});\nconsole.log(pkg ? '{}' : 'FAIL');\n",
            serde_json::to_string(p.import_path())?,
            IMPORT_MARKER
        )),
        None => Ok(format!("console.log('{}');\n", SMOKE_MARKER)),
    }
}

/// `version` from an installed package's own `package.json`.
pub fn parse_package_version(manifest: &str) -> Result<Option<String>> {
    let value: Value = serde_json::from_str(manifest)?;
    Ok(value
        .get("version")
        .and_then(Value::as_str)
        .map(str::to_string))
}

impl EnvironmentManager for NodeManager {
    fn name(&self) -> &str {
        "nvm"
    }

    fn install_toolchain(&self, version: &str) -> Result<()> {
        let options = CommandOptions::with_timeout(self.timeouts.toolchain_install());
        self.shell.run("nvm install \"$2\"", version, &[], &options)?;
        Ok(())
    }

    fn create_environment(&self, version: &str, dest: &Path) -> Result<Environment> {
        fs::create_dir_all(dest)?;
        fs::write(dest.join("package.json"), package_json(None)?)?;
        fs::write(dest.join(".npmrc"), "engine-strict=true\n")?;
        fs::write(dest.join(SCRIPT_FILE), check_script(None)?)?;
        Ok(Environment::new(version, dest))
    }

    fn run_smoke_check(&self, env: &Environment) -> Result<()> {
        self.run_script(env, SMOKE_MARKER)
    }

    fn install_package(&self, env: &Environment, package: &PackageSpec) -> Result<()> {
        fs::write(env.root.join("package.json"), package_json(Some(package))?)?;
        self.with_node(
            env,
            &["npm", "install", "--no-audit", "--no-fund"],
            self.timeouts.package_install(),
        )?;
        Ok(())
    }

    fn import_package(&self, env: &Environment, package: &PackageSpec) -> Result<()> {
        fs::write(env.root.join(SCRIPT_FILE), check_script(Some(package))?)?;
        self.run_script(env, IMPORT_MARKER)
    }

    fn query_installed_version(
        &self,
        env: &Environment,
        package: &PackageSpec,
    ) -> Result<Option<String>> {
        let manifest = env
            .root
            .join("node_modules")
            .join(&package.name)
            .join("package.json");
        parse_package_version(&fs::read_to_string(manifest)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn manifest_pins_dependency_range() {
        let manifest = package_json(Some(&PackageSpec::new("express", "^4.19"))).unwrap();
        let value: Value = serde_json::from_str(&manifest).unwrap();

        assert_eq!(value["dependencies"]["express"], "^4.19");
        assert_eq!(value["private"], true);
    }

    #[test]
    fn empty_spec_installs_latest() {
        let manifest = package_json(Some(&PackageSpec::new("lodash", ""))).unwrap();
        let value: Value = serde_json::from_str(&manifest).unwrap();

        assert_eq!(value["dependencies"]["lodash"], "latest");
    }

    #[test]
    fn control_manifest_has_no_dependencies() {
        let value: Value = serde_json::from_str(&package_json(None).unwrap()).unwrap();
        assert_eq!(value["dependencies"], json!({}));
    }

    #[test]
    fn import_script_requires_registry_name() {
        let script = check_script(Some(&PackageSpec::new("date-fns", "latest"))).unwrap();

        assert!(script.starts_with("const pkg = require(\"date-fns\");"));
        assert!(script.contains("TEST_OK"));
    }

    #[test]
    fn import_script_escapes_name() {
        let spec = PackageSpec::new("x", "").with_import_name("a\"b");
        let script = check_script(Some(&spec)).unwrap();
        assert!(script.contains("require(\"a\\\"b\")"));
    }

    #[test]
    fn reads_version_from_installed_manifest() {
        let manifest = r#"{"name": "axios", "version": "1.7.9", "main": "index.js"}"#;
        assert_eq!(
            parse_package_version(manifest).unwrap(),
            Some("1.7.9".to_string())
        );
        assert_eq!(parse_package_version("{}").unwrap(), None);
    }

    #[test]
    fn create_environment_enables_engine_strict() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("env");
        let manager = NodeManager::new(Timeouts::default());

        let env = manager.create_environment("v20.19.5", &dest).unwrap();

        assert_eq!(env.toolchain, "v20.19.5");
        assert_eq!(
            fs::read_to_string(dest.join(".npmrc")).unwrap(),
            "engine-strict=true\n"
        );
        assert!(dest.join("package.json").exists());
        assert!(dest.join(SCRIPT_FILE).exists());
    }

    #[test]
    fn query_reads_node_modules() {
        let temp = TempDir::new().unwrap();
        let installed = temp.path().join("node_modules").join("chalk");
        fs::create_dir_all(&installed).unwrap();
        fs::write(installed.join("package.json"), r#"{"version": "5.3.0"}"#).unwrap();
        let env = Environment::new("v22.20.0", temp.path());
        let manager = NodeManager::new(Timeouts::default());

        let version = manager
            .query_installed_version(&env, &PackageSpec::new("chalk", ""))
            .unwrap();

        assert_eq!(version.as_deref(), Some("5.3.0"));
    }

    #[test]
    fn missing_nvm_fails_toolchain_install() {
        let temp = TempDir::new().unwrap();
        let manager = NodeManager::new(Timeouts::default())
            .with_nvm_script(temp.path().join("no-such-nvm.sh"));

        assert!(manager.install_toolchain("v20.19.5").is_err());
    }
}
