//! The per-package experiment driver.
//!
//! [`CompatibilitySearch`] owns the ordered candidate list and the package
//! catalog. For each package it asks the probe which concrete version gets
//! installed under the newest toolchain, then bisects the candidates for the
//! oldest one that works. A control run with no package establishes the
//! baseline every package is compared against.
//!
//! # Failure isolation
//!
//! Each package is tested inside its own boundary: an error or panic while
//! testing one package is recorded in that package's `error` field, keeps
//! whatever was learned before the failure, and never stops the batch.

use crate::error::{CompatError, Result};
use crate::probe::{CompatibilityProbe, PackageSpec};
use crate::search::binary::{find_oldest_compatible, SearchOutcome};
use crate::search::result::ExperimentResult;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::thread;

/// Knobs for a search run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSettings {
    /// Probe the newest candidate instead of assuming it is compatible.
    pub verify_latest: bool,

    /// Packages tested at once. 1 keeps the run strictly sequential.
    pub max_parallel: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            verify_latest: false,
            max_parallel: 1,
        }
    }
}

/// Receives progress notifications during a run.
///
/// Calls may arrive from worker threads when `max_parallel > 1`.
pub trait SearchObserver: Sync {
    /// A package (or the control case) is about to be tested.
    fn package_started(&self, _package_name: &str) {}

    /// A package's result is final.
    fn package_finished(&self, _result: &ExperimentResult) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SearchObserver for NoopObserver {}

/// Finds the oldest compatible toolchain version for each catalog package.
#[derive(Debug)]
pub struct CompatibilitySearch<P> {
    probe: P,
    candidates: Vec<String>,
    catalog: Vec<PackageSpec>,
    settings: SearchSettings,
}

impl<P: CompatibilityProbe> CompatibilitySearch<P> {
    /// Create a search over `candidates` (oldest first) for every package in `catalog`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigValidationError` if `candidates` is empty.
    pub fn new(probe: P, candidates: Vec<String>, catalog: Vec<PackageSpec>) -> Result<Self> {
        if candidates.is_empty() {
            return Err(CompatError::ConfigValidationError {
                message: "at least one toolchain version is required".to_string(),
            });
        }

        Ok(Self {
            probe,
            candidates,
            catalog,
            settings: SearchSettings::default(),
        })
    }

    /// Replace the run settings.
    pub fn with_settings(mut self, settings: SearchSettings) -> Self {
        self.settings = settings;
        self
    }

    /// The probe driving the search.
    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Candidate toolchain versions, oldest first.
    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// The package catalog.
    pub fn catalog(&self) -> &[PackageSpec] {
        &self.catalog
    }

    /// The newest candidate version.
    pub fn newest(&self) -> &str {
        // `new` rejects an empty candidate list.
        self.candidates.last().map(String::as_str).unwrap_or_default()
    }

    /// Bisect the candidates for the oldest version that works with `package`.
    pub fn find_oldest_compatible(&self, package: Option<&PackageSpec>) -> SearchOutcome {
        let outcome = find_oldest_compatible(&self.candidates, |version| {
            self.probe.probe(version, package)
        });
        tracing::debug!(
            "{}: oldest={:?} after {} probes",
            package.map(|p| p.name.as_str()).unwrap_or("control"),
            outcome.oldest,
            outcome.probes
        );
        outcome
    }

    /// Test the toolchain on its own.
    pub fn test_control_case(&self) -> ExperimentResult {
        self.isolated(ExperimentResult::control(), |result| {
            let outcome = self.find_oldest_compatible(None);
            result.oldest_compatible = outcome.oldest;
            result.latest_compatible = self.latest_compatible(None);
            Ok(())
        })
    }

    /// Test one package. Never fails; problems land in the result's `error`.
    pub fn test_package(&self, package: &PackageSpec) -> ExperimentResult {
        self.isolated(ExperimentResult::for_package(package), |result| {
            if package.name.trim().is_empty() {
                return Err(CompatError::ConfigValidationError {
                    message: "package name is empty".to_string(),
                });
            }
            if package.is_control() {
                return Err(CompatError::ConfigValidationError {
                    message: format!("'{}' is reserved for the control case", package.name),
                });
            }

            result.resolved_version = self.probe.resolve_version(self.newest(), package);

            let outcome = self.find_oldest_compatible(Some(package));
            result.oldest_compatible = outcome.oldest;
            result.latest_compatible = self.latest_compatible(Some(package));
            Ok(())
        })
    }

    /// Test the control case, then every catalog package.
    pub fn run(&self) -> Vec<ExperimentResult>
    where
        P: Sync,
    {
        self.run_with_observer(&NoopObserver)
    }

    /// Like [`run`](Self::run), reporting progress to `observer`.
    ///
    /// The control result comes first, followed by packages in catalog order
    /// regardless of how many ran in parallel.
    pub fn run_with_observer(&self, observer: &dyn SearchObserver) -> Vec<ExperimentResult>
    where
        P: Sync,
    {
        tracing::info!(
            "Testing {} packages across {} toolchain versions",
            self.catalog.len(),
            self.candidates.len()
        );

        let mut results = Vec::with_capacity(self.catalog.len() + 1);

        observer.package_started(crate::probe::CONTROL_PACKAGE);
        let control = self.test_control_case();
        observer.package_finished(&control);
        results.push(control);

        results.extend(self.run_packages(observer));
        results
    }

    fn run_packages(&self, observer: &dyn SearchObserver) -> Vec<ExperimentResult>
    where
        P: Sync,
    {
        let workers = self.settings.max_parallel.clamp(1, self.catalog.len().max(1));

        if workers == 1 {
            return self
                .catalog
                .iter()
                .map(|package| self.observed(package, observer))
                .collect();
        }

        tracing::debug!("Running {} workers", workers);

        let next = AtomicUsize::new(0);
        let slots: Mutex<Vec<Option<ExperimentResult>>> = Mutex::new(vec![None; self.catalog.len()]);

        thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| loop {
                    let index = next.fetch_add(1, Ordering::SeqCst);
                    let Some(package) = self.catalog.get(index) else {
                        break;
                    };
                    let result = self.observed(package, observer);
                    store_slot(&slots, index, result);
                });
            }
        });

        collect_slots(slots)
    }

    fn observed(&self, package: &PackageSpec, observer: &dyn SearchObserver) -> ExperimentResult {
        observer.package_started(&package.name);
        let result = self.test_package(package);
        observer.package_finished(&result);
        result
    }

    /// The value recorded as `latest_compatible`.
    ///
    /// By default the newest candidate is assumed compatible. With
    /// `verify_latest` it is probed, and recorded only if it passes.
    fn latest_compatible(&self, package: Option<&PackageSpec>) -> Option<String> {
        let newest = self.newest();
        if !self.settings.verify_latest || self.probe.probe(newest, package) {
            Some(newest.to_string())
        } else {
            None
        }
    }

    fn isolated<F>(&self, mut result: ExperimentResult, test: F) -> ExperimentResult
    where
        F: FnOnce(&mut ExperimentResult) -> Result<()>,
    {
        let outcome = catch_unwind(AssertUnwindSafe(|| test(&mut result)));

        let error = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e.to_string()),
            Err(payload) => Some(panic_message(payload.as_ref())),
        };

        if let Some(message) = error {
            tracing::warn!("{} failed: {}", result.package_name, message);
            result.error = Some(message);
        }

        result
    }
}

/// Extract a readable message from a panic payload.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Record a worker's result. A poisoned lock still accepts writes.
fn store_slot(slots: &Mutex<Vec<Option<ExperimentResult>>>, index: usize, result: ExperimentResult) {
    let mut slots = slots.lock().unwrap_or_else(PoisonError::into_inner);
    slots[index] = Some(result);
}

/// Filled slots in catalog order.
fn collect_slots(slots: Mutex<Vec<Option<ExperimentResult>>>) -> Vec<ExperimentResult> {
    slots
        .into_inner()
        .unwrap_or_else(PoisonError::into_inner)
        .into_iter()
        .flatten()
        .collect()
}
