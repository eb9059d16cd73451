//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::ecosystems::Ecosystem;
use crate::report::DEFAULT_RESULTS_FILE;

/// compat-probe - Find the oldest toolchain each package still works with.
#[derive(Debug, Parser)]
#[command(name = "compat-probe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Catalog file (overrides the built-in catalog)
    #[arg(short, long, global = true, env = "COMPAT_PROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Ecosystem to probe (defaults to the catalog's, or python)
    #[arg(short, long, global = true, value_enum)]
    pub ecosystem: Option<Ecosystem>,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Test the control case and every catalog package (default)
    Run(RunArgs),

    /// Test a single package, catalog entry or not
    Package(PackageArgs),

    /// Show the catalog that would be tested
    List(ListArgs),

    /// Print the JSON schema for catalog files
    Schema,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `run` command.
#[derive(Debug, Clone, Args)]
pub struct RunArgs {
    /// Where to write the results document
    #[arg(short, long, default_value = DEFAULT_RESULTS_FILE)]
    pub output: PathBuf,

    /// Packages to test at once (overrides settings.max_parallel)
    #[arg(short = 'j', long)]
    pub max_parallel: Option<usize>,

    /// Probe the newest toolchain instead of assuming it works
    #[arg(long)]
    pub verify_latest: bool,

    /// Directory to create scratch environments under
    #[arg(long)]
    pub scratch_dir: Option<PathBuf>,

    /// Only test these catalog packages
    #[arg(long = "only", value_name = "NAME")]
    pub only: Vec<String>,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_RESULTS_FILE),
            max_parallel: None,
            verify_latest: false,
            scratch_dir: None,
            only: Vec::new(),
        }
    }
}

/// Arguments for the `package` command.
#[derive(Debug, Clone, Args)]
pub struct PackageArgs {
    /// Registry name of the package
    pub name: String,

    /// Version constraint (defaults to the catalog's, or any version)
    #[arg(short, long)]
    pub spec: Option<String>,

    /// Module name to import, when it differs from the package name
    #[arg(long)]
    pub import_name: Option<String>,

    /// Directory to write result-<name>.json into
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Probe the newest toolchain instead of assuming it works
    #[arg(long)]
    pub verify_latest: bool,

    /// Directory to create scratch environments under
    #[arg(long)]
    pub scratch_dir: Option<PathBuf>,
}

/// Arguments for the `list` command.
#[derive(Debug, Clone, Default, Args)]
pub struct ListArgs {
    /// Print the toolchain versions as well
    #[arg(long)]
    pub versions: bool,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_parses() {
        let cli = Cli::try_parse_from(["compat-probe"]).unwrap();
        assert!(cli.command.is_none());
        assert!(cli.ecosystem.is_none());
    }

    #[test]
    fn run_defaults_to_results_json() {
        let cli = Cli::try_parse_from(["compat-probe", "run"]).unwrap();
        match cli.command {
            Some(Commands::Run(args)) => {
                assert_eq!(args.output, PathBuf::from("results.json"));
                assert!(args.max_parallel.is_none());
                assert!(!args.verify_latest);
            }
            other => panic!("expected run, got {:?}", other),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "compat-probe",
            "run",
            "--ecosystem",
            "rust",
            "--quiet",
            "-j",
            "4",
            "--only",
            "serde",
            "--only",
            "log",
        ])
        .unwrap();
        assert_eq!(cli.ecosystem, Some(Ecosystem::Rust));
        assert!(cli.quiet);
        match cli.command {
            Some(Commands::Run(args)) => {
                assert_eq!(args.max_parallel, Some(4));
                assert_eq!(args.only, vec!["serde", "log"]);
            }
            other => panic!("expected run, got {:?}", other),
        }
    }

    #[test]
    fn package_takes_name_and_spec() {
        let cli =
            Cli::try_parse_from(["compat-probe", "package", "requests", "--spec", ">=2.0"]).unwrap();
        match cli.command {
            Some(Commands::Package(args)) => {
                assert_eq!(args.name, "requests");
                assert_eq!(args.spec.as_deref(), Some(">=2.0"));
                assert_eq!(args.output_dir, PathBuf::from("."));
            }
            other => panic!("expected package, got {:?}", other),
        }
    }

    #[test]
    fn package_requires_name() {
        assert!(Cli::try_parse_from(["compat-probe", "package"]).is_err());
    }

    #[test]
    fn unknown_ecosystem_is_rejected() {
        assert!(Cli::try_parse_from(["compat-probe", "--ecosystem", "cobol", "list"]).is_err());
    }
}
