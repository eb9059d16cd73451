//! Box-drawn results table.

use crate::search::ExperimentResult;
use console::{measure_text_width, pad_str, Alignment};

use super::theme::ProbeTheme;

/// Column headers of the results table.
pub const RESULT_HEADERS: [&str; 5] = ["Package", "Spec", "Resolved", "Oldest", "Latest"];

/// A table whose cells may carry terminal styling.
#[derive(Debug)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    column_widths: Vec<usize>,
}

impl Table {
    /// Create a table with the given headers.
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
            column_widths: headers.iter().map(|h| measure_text_width(h)).collect(),
        }
    }

    /// Add a row. Width is measured without ANSI escapes.
    pub fn add_row(&mut self, row: Vec<String>) {
        for (width, cell) in self.column_widths.iter_mut().zip(&row) {
            *width = (*width).max(measure_text_width(cell));
        }
        self.rows.push(row);
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Render the table with borders styled by `theme`.
    pub fn render(&self, theme: &ProbeTheme) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 4);
        lines.push(self.border(theme, '┌', '┬', '┐'));
        lines.push(self.row(theme, &self.headers));
        lines.push(self.border(theme, '├', '┼', '┤'));
        for row in &self.rows {
            lines.push(self.row(theme, row));
        }
        lines.push(self.border(theme, '└', '┴', '┘'));
        lines.join("\n")
    }

    fn border(&self, theme: &ProbeTheme, left: char, mid: char, right: char) -> String {
        let segments: Vec<String> = self
            .column_widths
            .iter()
            .map(|w| "─".repeat(w + 2))
            .collect();
        let line = format!("{}{}{}", left, segments.join(&mid.to_string()), right);
        theme.border.apply_to(line).to_string()
    }

    fn row(&self, theme: &ProbeTheme, cells: &[String]) -> String {
        let bar = theme.border.apply_to("│").to_string();
        let mut line = bar.clone();
        for (i, width) in self.column_widths.iter().enumerate() {
            let cell = cells.get(i).map(String::as_str).unwrap_or("");
            line.push(' ');
            line.push_str(&pad_str(cell, *width, Alignment::Left, None));
            line.push(' ');
            line.push_str(&bar);
        }
        line
    }
}

/// Build the summary table for a run.
///
/// Incompatible packages are marked in the warning style and packages whose
/// test errored show the error in place of the oldest version.
pub fn results_table(results: &[ExperimentResult], theme: &ProbeTheme) -> Table {
    let mut table = Table::new(&RESULT_HEADERS);

    for result in results {
        let dash = || theme.dim.apply_to("-").to_string();
        let resolved = result.resolved_version.clone().unwrap_or_else(dash);
        let latest = result.latest_compatible.clone().unwrap_or_else(dash);
        let oldest = match (&result.oldest_compatible, &result.error) {
            (_, Some(error)) => theme.error.apply_to(format!("error: {}", error)).to_string(),
            (Some(oldest), None) => theme.success.apply_to(oldest).to_string(),
            (None, None) => theme.warning.apply_to("none").to_string(),
        };
        let name = if result.is_control() {
            theme.highlight.apply_to(&result.package_name).to_string()
        } else {
            result.package_name.clone()
        };

        table.add_row(vec![name, result.version_spec.clone(), resolved, oldest, latest]);
    }

    table
}
