//! The `compat-probe schema` command.
//!
//! Prints the JSON schema for catalog files, for editor integration.

use std::io::Write;

use crate::config::catalog_schema;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The schema command implementation.
pub struct SchemaCommand;

impl SchemaCommand {
    /// Render the schema as pretty JSON.
    pub fn render() -> Result<String> {
        Ok(serde_json::to_string_pretty(&catalog_schema())?)
    }
}

impl Command for SchemaCommand {
    fn execute(&self, _ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let rendered = Self::render()?;
        writeln!(std::io::stdout(), "{}", rendered)?;
        Ok(CommandResult::success())
    }
}
