//! Configuration schema definitions.
//!
//! A catalog file names the ecosystem, the toolchain versions to bisect
//! over (oldest first), and the packages to test.

use crate::ecosystems::Ecosystem;
use crate::probe::PackageSpec;
use crate::search::SearchSettings;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration structure for a catalog file.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CatalogConfig {
    /// Ecosystem whose toolchain is being probed.
    pub ecosystem: Ecosystem,

    /// Candidate toolchain versions, oldest first.
    pub toolchain_versions: Vec<String>,

    /// Packages to test.
    #[serde(default)]
    pub packages: Vec<PackageSpec>,

    /// Run settings.
    #[serde(default)]
    pub settings: Settings,
}

impl CatalogConfig {
    /// Look up a package by name.
    pub fn package(&self, name: &str) -> Option<&PackageSpec> {
        self.packages.iter().find(|p| p.name == name)
    }

    /// The newest candidate version.
    pub fn newest(&self) -> Option<&str> {
        self.toolchain_versions.last().map(String::as_str)
    }
}

/// Settings that apply to a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Settings {
    /// Maximum packages tested concurrently
    #[serde(
        default = "default_max_parallel",
        skip_serializing_if = "is_default_max_parallel"
    )]
    pub max_parallel: usize,

    /// Probe the newest toolchain instead of assuming it is compatible
    #[serde(default, skip_serializing_if = "is_false")]
    pub verify_latest: bool,

    /// Per-operation time budgets
    pub timeouts: Timeouts,

    /// External tool overrides
    #[serde(skip_serializing_if = "Tools::is_empty")]
    pub tools: Tools,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_parallel: default_max_parallel(),
            verify_latest: false,
            timeouts: Timeouts::default(),
            tools: Tools::default(),
        }
    }
}

impl Settings {
    /// Settings for the search driver.
    pub fn search_settings(&self) -> SearchSettings {
        SearchSettings {
            verify_latest: self.verify_latest,
            max_parallel: self.max_parallel,
        }
    }
}

/// Time budgets, in seconds, for each kind of external call.
///
/// Installing a toolchain is by far the slowest step, so it gets the
/// largest budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Timeouts {
    /// Toolchain install or activation
    pub toolchain_install: u64,

    /// Isolated environment creation
    pub environment_create: u64,

    /// Package installation
    pub package_install: u64,

    /// Smoke run and import check
    pub check: u64,

    /// Installed-version query
    pub version_query: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            toolchain_install: 300,
            environment_create: 60,
            package_install: 120,
            check: 30,
            version_query: 30,
        }
    }
}

impl Timeouts {
    /// Toolchain install budget.
    pub fn toolchain_install(&self) -> Duration {
        Duration::from_secs(self.toolchain_install)
    }

    /// Environment creation budget.
    pub fn environment_create(&self) -> Duration {
        Duration::from_secs(self.environment_create)
    }

    /// Package install budget.
    pub fn package_install(&self) -> Duration {
        Duration::from_secs(self.package_install)
    }

    /// Smoke/import check budget.
    pub fn check(&self) -> Duration {
        Duration::from_secs(self.check)
    }

    /// Version query budget.
    pub fn version_query(&self) -> Duration {
        Duration::from_secs(self.version_query)
    }
}

/// Executables used for each ecosystem's tooling. Unset means look up the
/// default name on `PATH`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Tools {
    /// `uv` executable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uv: Option<String>,

    /// `rustup` executable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rustup: Option<String>,

    /// `cargo` executable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cargo: Option<String>,

    /// Bootstrap `go` executable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub go: Option<String>,

    /// Directory holding the `go<version>` wrappers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gobin: Option<String>,

    /// `nvm.sh` init script
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nvm: Option<String>,

    /// `sdkman-init.sh` init script
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sdkman: Option<String>,

    /// `mvn` executable
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mvn: Option<String>,
}

impl Tools {
    /// Whether no override is set.
    pub fn is_empty(&self) -> bool {
        self == &Tools::default()
    }
}

fn default_max_parallel() -> usize {
    1
}

fn is_default_max_parallel(v: &usize) -> bool {
    *v == default_max_parallel()
}

fn is_false(v: &bool) -> bool {
    !v
}
