//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::PathBuf;

use crate::cli::args::{Cli, Commands, RunArgs};
use crate::config::{load_catalog, CatalogConfig};
use crate::ecosystems::Ecosystem;
use crate::error::Result;
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Where a command's catalog comes from, per the global flags.
#[derive(Debug, Clone, Default)]
pub struct CatalogSource {
    /// Explicit catalog file.
    pub config: Option<PathBuf>,

    /// Requested ecosystem.
    pub ecosystem: Option<Ecosystem>,
}

impl CatalogSource {
    /// Load and validate the catalog.
    pub fn load(&self) -> Result<CatalogConfig> {
        load_catalog(self.config.as_deref(), self.ecosystem)
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    source: CatalogSource,
}

impl CommandDispatcher {
    /// Create a dispatcher reading catalogs from `source`.
    pub fn new(source: CatalogSource) -> Self {
        Self { source }
    }

    /// Create a dispatcher from the parsed global flags.
    pub fn from_cli(cli: &Cli) -> Self {
        Self::new(CatalogSource {
            config: cli.config.clone(),
            ecosystem: cli.ecosystem,
        })
    }

    /// The catalog source commands will use.
    pub fn source(&self) -> &CatalogSource {
        &self.source
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &cli.command {
            Some(Commands::Run(args)) => {
                let cmd = super::run::RunCommand::new(self.source.clone(), args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Package(args)) => {
                let cmd = super::package::PackageCommand::new(self.source.clone(), args.clone());
                cmd.execute(ui)
            }
            Some(Commands::List(args)) => {
                let cmd = super::list::ListCommand::new(self.source.clone(), args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Schema) => super::schema::SchemaCommand.execute(ui),
            Some(Commands::Completions(args)) => {
                let cmd = super::completions::CompletionsCommand::new(args.clone());
                cmd.execute(ui)
            }
            None => {
                let cmd = super::run::RunCommand::new(self.source.clone(), RunArgs::default());
                cmd.execute(ui)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompatError;
    use crate::ui::MockUI;
    use clap::Parser;

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(1);
        assert!(!result.success);
        assert_eq!(result.exit_code, 1);
    }

    #[test]
    fn from_cli_copies_global_flags() {
        let cli = Cli::try_parse_from(["compat-probe", "--ecosystem", "rust", "list"]).unwrap();
        let dispatcher = CommandDispatcher::from_cli(&cli);
        assert_eq!(dispatcher.source().ecosystem, Some(Ecosystem::Rust));
        assert!(dispatcher.source().config.is_none());
    }

    #[test]
    fn dispatch_list_uses_builtin_catalog() {
        let cli = Cli::try_parse_from(["compat-probe", "list"]).unwrap();
        let mut ui = MockUI::new();

        let result = CommandDispatcher::from_cli(&cli).dispatch(&cli, &mut ui).unwrap();

        assert!(result.success);
        assert!(ui.has_message("requests"));
    }

    #[test]
    fn dispatch_surfaces_missing_config() {
        let cli =
            Cli::try_parse_from(["compat-probe", "--config", "/no/such/catalog.yml", "list"])
                .unwrap();
        let mut ui = MockUI::new();

        let err = CommandDispatcher::from_cli(&cli)
            .dispatch(&cli, &mut ui)
            .unwrap_err();

        assert!(matches!(err, CompatError::ConfigNotFound { .. }));
    }
}
