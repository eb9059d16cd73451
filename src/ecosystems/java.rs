//! Java versions via SDKMAN! and Maven.
//!
//! Packages are Maven coordinates (`groupId:artifactId`) with a version
//! range as their spec. An environment is a Maven project compiled for the
//! candidate's feature release; installing resolves the dependency and the
//! check is `mvn compile` under the candidate JDK.

use super::sourced::{home_dir, locate_init_script, SourcedShell};
use crate::config::schema::Timeouts;
use crate::error::{CompatError, Result};
use crate::probe::{Environment, EnvironmentManager, PackageSpec};
use crate::shell::CommandOptions;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Installs only when the candidate directory is missing.
const SDK_INSTALL: &str =
    "[ -d \"$SDKMAN_CANDIDATES_DIR/java/$2\" ] || sdk install java \"$2\" </dev/null";

const SDK_USE: &str = "sdk use java \"$2\"";

/// Range used when a package gives no spec.
const ANY_VERSION: &str = "[0,)";

const MAIN_SOURCE: &str = "public class Main { public static void main(String[] args) {} }\n";

/// Drives `sdk` for JDKs and `mvn` for dependencies and builds.
#[derive(Debug, Clone)]
pub struct JavaManager {
    shell: SourcedShell,
    mvn: String,
    timeouts: Timeouts,
}

impl JavaManager {
    /// Create a manager that sources the usual SDKMAN! init script and runs
    /// `mvn` from `PATH`.
    pub fn new(timeouts: Timeouts) -> Self {
        Self {
            shell: SourcedShell::new(default_sdkman_script()),
            mvn: "mvn".to_string(),
            timeouts,
        }
    }

    /// Source a different `sdkman-init.sh`.
    pub fn with_sdkman_script(mut self, script: impl Into<PathBuf>) -> Self {
        self.shell = SourcedShell::new(script);
        self
    }

    /// Use a different `mvn` executable.
    pub fn with_maven(mut self, mvn: impl Into<String>) -> Self {
        self.mvn = mvn.into();
        self
    }

    fn maven(&self, env: &Environment, goals: &[&str], timeout: Duration) -> Result<String> {
        let mut command = vec![self.mvn.as_str(), "--batch-mode"];
        command.extend_from_slice(goals);
        let options = CommandOptions::with_timeout(timeout).in_dir(&env.root);
        let result = self.shell.run(SDK_USE, &env.toolchain, &command, &options)?;
        Ok(result.stdout)
    }
}

/// `$SDKMAN_DIR/bin/sdkman-init.sh` or `~/.sdkman/bin/sdkman-init.sh`.
pub fn default_sdkman_script() -> PathBuf {
    locate_init_script(
        &home_dir(),
        "SDKMAN_DIR",
        &[".sdkman"],
        "bin/sdkman-init.sh",
        |key| std::env::var(key).ok(),
    )
}

/// Split `groupId:artifactId`.
pub fn coordinate(name: &str) -> Result<(&str, &str)> {
    match name.split_once(':') {
        Some((group, artifact))
            if !group.is_empty() && !artifact.is_empty() && !artifact.contains(':') =>
        {
            Ok((group, artifact))
        }
        _ => Err(CompatError::ConfigValidationError {
            message: format!("'{}' is not a groupId:artifactId coordinate", name),
        }),
    }
}

/// Feature release of an SDKMAN! identifier, e.g. `8.0.432-tem` is `8`.
pub fn feature_release(version: &str) -> &str {
    version.split(['.', '-']).next().unwrap_or(version)
}

/// Maven range for `package`; an empty spec accepts any version.
pub fn version_range(package: &PackageSpec) -> &str {
    match package.version_spec.trim() {
        "" => ANY_VERSION,
        spec => spec,
    }
}

/// `pom.xml` compiling for `release`, with `package` as the only dependency.
pub fn pom_xml(release: &str, package: Option<&PackageSpec>) -> Result<String> {
    let mut pom = String::from(concat!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n",
        "<project xmlns=\"http://maven.apache.org/POM/4.0.0\"\n",
        "         xmlns:xsi=\"http://www.w3.org/2001/XMLSchema-instance\"\n",
        "         xsi:schemaLocation=\"http://maven.apache.org/POM/4.0.0 ",
        "http://maven.apache.org/xsd/maven-4.0.0.xsd\">\n",
        "    <modelVersion>4.0.0</modelVersion>\n",
        "    <groupId>compat.check</groupId>\n",
        "    <artifactId>compat-check</artifactId>\n",
        "    <version>1.0-SNAPSHOT</version>\n",
    ));
    pom.push_str("    <properties>\n");
    pom.push_str(&format!(
        "        <maven.compiler.source>{}</maven.compiler.source>\n",
        release
    ));
    pom.push_str(&format!(
        "        <maven.compiler.target>{}</maven.compiler.target>\n",
        release
    ));
    pom.push_str("        <project.build.sourceEncoding>UTF-8</project.build.sourceEncoding>\n");
    pom.push_str("    </properties>\n");

    if let Some(p) = package {
        let (group, artifact) = coordinate(&p.name)?;
        pom.push_str("    <dependencies>\n        <dependency>\n");
        pom.push_str(&format!("            <groupId>{}</groupId>\n", group));
        pom.push_str(&format!("            <artifactId>{}</artifactId>\n", artifact));
        pom.push_str(&format!("            <version>{}</version>\n", version_range(p)));
        pom.push_str("        </dependency>\n    </dependencies>\n");
    }

    pom.push_str("</project>\n");
    Ok(pom)
}

/// Resolved version of `group:artifact` in `mvn dependency:tree` output.
pub fn parse_tree_version(output: &str, group: &str, artifact: &str) -> Option<String> {
    let prefix = format!("{}:{}:", group, artifact);
    output.lines().find_map(|line| {
        let start = line.find(&prefix)?;
        let entry = line[start..].split_whitespace().next()?;
        entry.split(':').nth(3).map(str::to_string)
    })
}

fn write_project(root: &Path, release: &str, package: Option<&PackageSpec>) -> Result<()> {
    let sources = root.join("src").join("main").join("java");
    fs::create_dir_all(&sources)?;
    fs::write(root.join("pom.xml"), pom_xml(release, package)?)?;
    fs::write(sources.join("Main.java"), MAIN_SOURCE)?;
    Ok(())
}

impl EnvironmentManager for JavaManager {
    fn name(&self) -> &str {
        "sdkman"
    }

    fn install_toolchain(&self, version: &str) -> Result<()> {
        let options = CommandOptions::with_timeout(self.timeouts.toolchain_install());
        self.shell.run(SDK_INSTALL, version, &[], &options)?;
        Ok(())
    }

    fn create_environment(&self, version: &str, dest: &Path) -> Result<Environment> {
        write_project(dest, feature_release(version), None)?;
        Ok(Environment::new(version, dest))
    }

    fn run_smoke_check(&self, env: &Environment) -> Result<()> {
        // Maven fetches its plugins on the first compile.
        self.maven(env, &["compile"], self.timeouts.package_install())?;
        Ok(())
    }

    fn install_package(&self, env: &Environment, package: &PackageSpec) -> Result<()> {
        write_project(&env.root, feature_release(&env.toolchain), Some(package))?;
        self.maven(env, &["dependency:resolve"], self.timeouts.package_install())?;
        Ok(())
    }

    fn import_package(&self, env: &Environment, _package: &PackageSpec) -> Result<()> {
        self.maven(env, &["compile"], self.timeouts.package_install())?;
        Ok(())
    }

    fn query_installed_version(
        &self,
        env: &Environment,
        package: &PackageSpec,
    ) -> Result<Option<String>> {
        let (group, artifact) = coordinate(&package.name)?;
        let stdout = self.maven(env, &["dependency:tree"], self.timeouts.package_install())?;
        Ok(parse_tree_version(&stdout, group, artifact))
    }
}
