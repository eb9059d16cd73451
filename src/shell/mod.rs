//! External command execution.

pub mod command;

pub use command::{
    display_command, execute, execute_checked, CommandOptions, CommandResult,
};
