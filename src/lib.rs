//! compat-probe - Find the oldest toolchain version each package still works with.
//!
//! For every package in a catalog, compat-probe installs it into a fresh,
//! isolated environment under a candidate toolchain version, checks that it
//! imports, and bisects the ordered candidates for the oldest version that
//! works. A no-dependency control run establishes the baseline.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Catalog loading, parsing, and validation
//! - [`ecosystems`] - Python, Rust, Go, Node.js and Java tooling and built-in catalogs
//! - [`error`] - Error types and result aliases
//! - [`probe`] - Fail-closed single-version compatibility probes
//! - [`report`] - Results documents
//! - [`search`] - Oldest-compatible search and the per-package driver
//! - [`shell`] - External command execution with timeouts
//! - [`ui`] - Spinners, tables, and terminal output
//!
//! # Example
//!
//! ```
//! use compat_probe::probe::{MockProbe, PackageSpec};
//! use compat_probe::search::CompatibilitySearch;
//!
//! let versions: Vec<String> = ["3.8", "3.9", "3.10", "3.11", "3.12", "3.13"]
//!     .iter()
//!     .map(|v| v.to_string())
//!     .collect();
//! let probe = MockProbe::new()
//!     .with_control(|_| true)
//!     .with_package("requests", |v| v != "3.8" && v != "3.9");
//!
//! let search = CompatibilitySearch::new(probe, versions, vec![PackageSpec::new("requests", ">=2.32")])
//!     .unwrap();
//! let results = search.run();
//!
//! assert_eq!(results[0].package_name, "CONTROL");
//! assert_eq!(results[1].oldest_compatible.as_deref(), Some("3.10"));
//! ```

pub mod cli;
pub mod config;
pub mod ecosystems;
pub mod error;
pub mod probe;
pub mod report;
pub mod search;
pub mod shell;
pub mod ui;

pub use error::{CompatError, Result};
