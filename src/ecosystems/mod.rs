//! Supported ecosystems and their built-in catalogs.
//!
//! Each ecosystem pairs an [`EnvironmentManager`] implementation with a
//! catalog embedded at compile time from `catalogs/<name>.yml`.

pub mod go;
pub mod java;
pub mod node;
pub mod python;
pub mod rust;
pub mod sourced;

pub use go::GoManager;
pub use java::JavaManager;
pub use node::NodeManager;
pub use python::UvManager;
pub use rust::RustupManager;

use crate::config::schema::{CatalogConfig, Settings};
use crate::error::{CompatError, Result};
use crate::probe::EnvironmentManager;
use clap::ValueEnum;
use include_dir::{include_dir, Dir};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Embedded catalogs directory.
static CATALOGS_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/catalogs");

/// A language ecosystem whose toolchain versions can be probed.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    JsonSchema,
    ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    /// CPython interpreters managed by `uv`
    #[default]
    Python,
    /// Rust toolchains managed by `rustup`
    Rust,
    /// Go releases installed through the `golang.org/dl` wrappers
    Go,
    /// Node.js versions managed by `nvm`
    Node,
    /// JDKs managed by SDKMAN!, built with Maven
    Java,
}

impl Ecosystem {
    /// Every supported ecosystem.
    pub const ALL: [Ecosystem; 5] = [
        Ecosystem::Python,
        Ecosystem::Rust,
        Ecosystem::Go,
        Ecosystem::Node,
        Ecosystem::Java,
    ];

    /// Lowercase identifier used in files and on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            Ecosystem::Python => "python",
            Ecosystem::Rust => "rust",
            Ecosystem::Go => "go",
            Ecosystem::Node => "node",
            Ecosystem::Java => "java",
        }
    }

    /// Version spec used for packages that aren't in the catalog.
    pub fn default_version_spec(&self) -> &'static str {
        match self {
            Ecosystem::Python => "",
            Ecosystem::Rust => "*",
            Ecosystem::Go => "latest",
            Ecosystem::Node => "latest",
            Ecosystem::Java => "[0,)",
        }
    }
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Load the catalog embedded for `ecosystem`.
pub fn builtin_catalog(ecosystem: Ecosystem) -> Result<CatalogConfig> {
    let file_name = format!("{}.yml", ecosystem.as_str());
    let display_path = format!("catalogs/{}", file_name);

    let file = CATALOGS_DIR
        .get_file(&file_name)
        .ok_or_else(|| CompatError::ConfigNotFound {
            path: display_path.clone().into(),
        })?;

    let content = file
        .contents_utf8()
        .ok_or_else(|| CompatError::ConfigParseError {
            path: display_path.clone().into(),
            message: "Invalid UTF-8".to_string(),
        })?;

    let catalog: CatalogConfig =
        serde_yaml::from_str(content).map_err(|e| CompatError::ConfigParseError {
            path: display_path.into(),
            message: e.to_string(),
        })?;

    if catalog.ecosystem != ecosystem {
        return Err(CompatError::ConfigValidationError {
            message: format!(
                "catalogs/{} declares ecosystem {}",
                file_name, catalog.ecosystem
            ),
        });
    }

    Ok(catalog)
}

/// The environment manager that drives `ecosystem`'s external tooling.
pub fn manager_for(
    ecosystem: Ecosystem,
    settings: &Settings,
) -> Box<dyn EnvironmentManager + Send + Sync> {
    let timeouts = settings.timeouts;
    let tools = &settings.tools;
    match ecosystem {
        Ecosystem::Python => {
            let uv = tools.uv.as_deref().unwrap_or("uv");
            Box::new(UvManager::new(timeouts).with_program(uv))
        }
        Ecosystem::Rust => {
            let rustup = tools.rustup.as_deref().unwrap_or("rustup");
            let cargo = tools.cargo.as_deref().unwrap_or("cargo");
            Box::new(RustupManager::new(timeouts).with_programs(rustup, cargo))
        }
        Ecosystem::Go => {
            let go = tools.go.as_deref().unwrap_or("go");
            let mut manager = GoManager::new(timeouts).with_program(go);
            if let Some(dir) = &tools.gobin {
                manager = manager.with_bin_dir(dir);
            }
            Box::new(manager)
        }
        Ecosystem::Node => {
            let nvm = tools
                .nvm
                .as_ref()
                .map(PathBuf::from)
                .unwrap_or_else(node::default_nvm_script);
            Box::new(NodeManager::new(timeouts).with_nvm_script(nvm))
        }
        Ecosystem::Java => {
            let sdkman = tools
                .sdkman
                .as_ref()
                .map(PathBuf::from)
                .unwrap_or_else(java::default_sdkman_script);
            let mvn = tools.mvn.as_deref().unwrap_or("mvn");
            Box::new(
                JavaManager::new(timeouts)
                    .with_sdkman_script(sdkman)
                    .with_maven(mvn),
            )
        }
    }
}

/// A path as a command-line argument.
fn path_arg(path: &Path) -> Result<&str> {
    path.to_str().ok_or_else(|| {
        CompatError::Other(anyhow::anyhow!(
            "path is not valid UTF-8: {}",
            path.display()
        ))
    })
}
