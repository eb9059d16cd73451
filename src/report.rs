//! Result documents.
//!
//! A full run writes one JSON array with the control record first. A single
//! package run writes that package's record on its own to
//! `result-<name>.json`.

use crate::error::Result;
use crate::search::ExperimentResult;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Default output file for a full run.
pub const DEFAULT_RESULTS_FILE: &str = "results.json";

/// File name used for a single-package run.
pub fn single_result_file_name(package_name: &str) -> String {
    let safe: String = package_name
        .chars()
        .map(|c| if matches!(c, '/' | '\\' | ':') { '_' } else { c })
        .collect();
    format!("result-{}.json", safe)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json + "\n")?;
    Ok(())
}

/// Write results as a pretty-printed JSON array.
pub fn write_results(path: &Path, results: &[ExperimentResult]) -> Result<()> {
    write_json(path, results)?;
    tracing::debug!("Wrote {} results to {}", results.len(), path.display());
    Ok(())
}

/// Write a single package's result into `dir`, returning the file path.
pub fn write_single_result(dir: &Path, result: &ExperimentResult) -> Result<PathBuf> {
    let path = dir.join(single_result_file_name(&result.package_name));
    write_json(&path, result)?;
    tracing::debug!("Wrote {} result to {}", result.package_name, path.display());
    Ok(path)
}

/// Read a results document back.
pub fn read_results(path: &Path) -> Result<Vec<ExperimentResult>> {
    let json = fs::read_to_string(path)?;
    let results = serde_json::from_str(&json)?;
    Ok(results)
}

/// Counts shown at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    /// Catalog packages tested, excluding the control record.
    pub packages: usize,
    /// Packages with an oldest compatible version.
    pub compatible: usize,
    /// Packages whose search finished without a compatible version.
    pub incompatible: usize,
    /// Records whose test was cut short by an error.
    pub errors: usize,
}

impl Summary {
    /// Tally a result set.
    pub fn from_results(results: &[ExperimentResult]) -> Self {
        let mut summary = Self::default();
        for result in results {
            if result.is_error() {
                summary.errors += 1;
            }
            if result.is_control() {
                continue;
            }
            summary.packages += 1;
            if result.is_compatible() {
                summary.compatible += 1;
            } else if !result.is_error() {
                summary.incompatible += 1;
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample() -> Vec<ExperimentResult> {
        let mut control = ExperimentResult::control();
        control.oldest_compatible = Some("3.8".to_string());
        control.latest_compatible = Some("3.13".to_string());

        let mut requests = ExperimentResult::new("requests", ">=2.32");
        requests.resolved_version = Some("2.32.3".to_string());
        requests.oldest_compatible = Some("3.8".to_string());
        requests.latest_compatible = Some("3.13".to_string());

        let mut numpy = ExperimentResult::new("numpy", ">=1.26");
        numpy.error = Some("boom".to_string());

        vec![control, requests, numpy]
    }

    #[test]
    fn single_result_file_name_uses_package() {
        assert_eq!(single_result_file_name("requests"), "result-requests.json");
        assert_eq!(single_result_file_name("a/b"), "result-a_b.json");
        assert_eq!(
            single_result_file_name("com.google.code.gson:gson"),
            "result-com.google.code.gson_gson.json"
        );
    }

    #[test]
    fn write_then_read_preserves_order() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("out").join("results.json");

        write_results(&path, &sample()).unwrap();
        let read = read_results(&path).unwrap();

        assert_eq!(read, sample());
        assert!(read[0].is_control());
    }

    #[test]
    fn absent_fields_are_written_as_null() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("results.json");

        write_results(&path, &sample()).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();

        assert!(value[2]["resolved_version"].is_null());
        assert_eq!(value[2]["error"], "boom");
        assert!(value[0]["resolved_version"].is_null());
    }

    #[test]
    fn single_result_is_a_bare_object() {
        let temp = TempDir::new().unwrap();
        let result = sample().remove(1);

        let path = write_single_result(temp.path(), &result).unwrap();

        assert_eq!(path.file_name().unwrap(), "result-requests.json");
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(value.is_object());
        assert_eq!(value["package_name"], "requests");
    }

    #[test]
    fn summary_excludes_control_from_package_counts() {
        let summary = Summary::from_results(&sample());
        assert_eq!(
            summary,
            Summary {
                packages: 2,
                compatible: 1,
                incompatible: 0,
                errors: 1,
            }
        );
    }

    #[test]
    fn summary_counts_finished_searches_as_incompatible() {
        let mut results = sample();
        results.push(ExperimentResult::new("tomli", ">=2.0"));

        let summary = Summary::from_results(&results);

        assert_eq!(summary.packages, 3);
        assert_eq!(summary.incompatible, 1);
        assert_eq!(summary.errors, 1);
    }
}
