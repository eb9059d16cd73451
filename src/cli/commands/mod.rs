//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results. Commands are
//! routed by [`CommandDispatcher`] and share one [`CatalogSource`] built from
//! the global flags.

pub mod completions;
pub mod dispatcher;
pub mod list;
pub mod package;
pub mod run;
pub mod schema;

pub use dispatcher::{CatalogSource, Command, CommandDispatcher, CommandResult};
