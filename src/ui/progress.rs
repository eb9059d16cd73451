//! Per-package progress spinners.

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use crate::search::{ExperimentResult, SearchObserver};

use super::theme::ProbeTheme;

/// Shows one spinner per package while it is being tested.
///
/// Spinners are grouped under a [`MultiProgress`] so packages running on
/// parallel workers each get their own line.
pub struct ProgressObserver {
    multi: MultiProgress,
    active: Mutex<HashMap<String, ProgressBar>>,
    theme: ProbeTheme,
}

impl ProgressObserver {
    /// Create an observer drawing to stderr.
    pub fn new(theme: ProbeTheme) -> Self {
        Self {
            multi: MultiProgress::new(),
            active: Mutex::new(HashMap::new()),
            theme,
        }
    }

    /// Create an observer that draws nothing.
    pub fn hidden() -> Self {
        Self {
            multi: MultiProgress::with_draw_target(ProgressDrawTarget::hidden()),
            active: Mutex::new(HashMap::new()),
            theme: ProbeTheme::plain(),
        }
    }

    /// Number of packages currently in progress.
    pub fn active_count(&self) -> usize {
        self.active.lock().map(|a| a.len()).unwrap_or_default()
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.magenta} {msg} {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn finished_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn finish_message(&self, result: &ExperimentResult) -> String {
        match (&result.oldest_compatible, &result.error) {
            (_, Some(error)) => self
                .theme
                .format_error(&format!("{}: {}", result.package_name, error)),
            (Some(oldest), None) => self
                .theme
                .format_success(&format!("{}: oldest {}", result.package_name, oldest)),
            (None, None) => self
                .theme
                .format_warning(&format!("{}: no compatible version", result.package_name)),
        }
    }
}

impl SearchObserver for ProgressObserver {
    fn package_started(&self, package_name: &str) {
        let bar = self.multi.add(ProgressBar::new_spinner());
        bar.set_style(Self::spinner_style());
        bar.set_message(format!("Testing {}", package_name));
        bar.enable_steady_tick(Duration::from_millis(80));

        if let Ok(mut active) = self.active.lock() {
            active.insert(package_name.to_string(), bar);
        }
    }

    fn package_finished(&self, result: &ExperimentResult) {
        let bar = self
            .active
            .lock()
            .ok()
            .and_then(|mut active| active.remove(&result.package_name));

        if let Some(bar) = bar {
            bar.set_style(Self::finished_style());
            bar.finish_with_message(self.finish_message(result));
        }
    }
}
