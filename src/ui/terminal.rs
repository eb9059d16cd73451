//! Terminal UI.

use console::Term;
use std::io::Write;

use crate::search::{ExperimentResult, SearchObserver};

use super::{results_table, OutputMode, ProbeTheme, ProgressObserver, UserInterface};

/// Writes status to stdout and spinners to stderr.
pub struct TerminalUI {
    term: Term,
    theme: ProbeTheme,
    mode: OutputMode,
}

impl TerminalUI {
    /// Create a terminal UI.
    pub fn new(mode: OutputMode, colors: bool) -> Self {
        Self {
            term: Term::stdout(),
            theme: ProbeTheme::for_colors(colors),
            mode,
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", msg).ok();
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_success(msg)).ok();
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_warning(msg)).ok();
        }
    }

    fn error(&mut self, msg: &str) {
        writeln!(Term::stderr(), "{}", self.theme.format_error(msg)).ok();
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "\n{}\n", self.theme.format_header(title)).ok();
        }
    }

    fn show_results(&mut self, results: &[ExperimentResult]) {
        if self.mode.shows_status() && !results.is_empty() {
            let table = results_table(results, &self.theme);
            writeln!(self.term, "{}", table.render(&self.theme)).ok();
        }
    }

    fn search_observer(&self) -> Box<dyn SearchObserver> {
        if self.mode.shows_spinners() && Term::stderr().is_term() {
            Box::new(ProgressObserver::new(self.theme.clone()))
        } else {
            Box::new(ProgressObserver::hidden())
        }
    }
}
