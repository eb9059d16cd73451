//! The `compat-probe list` command.

use crate::cli::args::ListArgs;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{CatalogSource, Command, CommandResult};

/// The list command implementation.
pub struct ListCommand {
    source: CatalogSource,
    args: ListArgs,
}

impl ListCommand {
    /// Create a new list command.
    pub fn new(source: CatalogSource, args: ListArgs) -> Self {
        Self { source, args }
    }
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let catalog = self.source.load()?;

        ui.show_header(&format!(
            "{} catalog: {} packages, {} toolchain versions",
            catalog.ecosystem,
            catalog.packages.len(),
            catalog.toolchain_versions.len()
        ));

        for package in &catalog.packages {
            let mut line = format!("  {}", package.name);
            if !package.version_spec.is_empty() {
                line.push_str(&format!(" {}", package.version_spec));
            }
            if let Some(import_name) = &package.import_name {
                line.push_str(&format!(" (imports {})", import_name));
            }
            ui.message(&line);
        }

        if self.args.versions {
            ui.message("");
            ui.message(&format!("Versions: {}", catalog.toolchain_versions.join(", ")));
        } else if let (Some(oldest), Some(newest)) =
            (catalog.toolchain_versions.first(), catalog.newest())
        {
            ui.message("");
            ui.message(&format!("Versions: {} .. {}", oldest, newest));
        }

        Ok(CommandResult::success())
    }
}
