//! Terminal output.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for real terminal usage
//! - [`MockUI`] for capturing output in tests
//! - The results [`Table`] and per-package [`ProgressObserver`]
//!
//! # Example
//!
//! ```
//! use compat_probe::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.show_header("Results");
//! ui.success("Done!");
//!
//! assert_eq!(ui.headers(), ["Results"]);
//! assert_eq!(ui.successes(), ["Done!"]);
//! ```

pub mod mock;
pub mod progress;
pub mod table;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use progress::ProgressObserver;
pub use table::{results_table, Table};
pub use terminal::TerminalUI;
pub use theme::{should_use_colors, ProbeTheme};

use crate::search::{ExperimentResult, SearchObserver};

/// Output verbosity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Show everything, including debug logs.
    Verbose,
    /// Show progress and status.
    #[default]
    Normal,
    /// Show nothing except errors.
    Quiet,
}

impl OutputMode {
    /// Pick a mode from the global CLI flags. `--quiet` wins.
    pub fn from_flags(debug: bool, quiet: bool) -> Self {
        match (debug, quiet) {
            (_, true) => Self::Quiet,
            (true, false) => Self::Verbose,
            (false, false) => Self::Normal,
        }
    }

    /// Check if this mode shows progress spinners.
    pub fn shows_spinners(&self) -> bool {
        !matches!(self, Self::Quiet)
    }

    /// Check if this mode shows status messages.
    pub fn shows_status(&self) -> bool {
        !matches!(self, Self::Quiet)
    }
}

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    /// Get the current output mode.
    fn output_mode(&self) -> OutputMode;

    /// Display a message to the user.
    fn message(&mut self, msg: &str);

    /// Display a success message.
    fn success(&mut self, msg: &str);

    /// Display a warning message.
    fn warning(&mut self, msg: &str);

    /// Display an error message. Shown in every mode.
    fn error(&mut self, msg: &str);

    /// Show a header/banner.
    fn show_header(&mut self, title: &str);

    /// Show the summary table for a run.
    fn show_results(&mut self, results: &[ExperimentResult]);

    /// Observer that reports progress while a search runs.
    fn search_observer(&self) -> Box<dyn SearchObserver>;
}
