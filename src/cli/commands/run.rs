//! The `compat-probe run` command.
//!
//! Tests the control case and every catalog package, then writes the
//! results document.

use std::path::Path;

use crate::cli::args::RunArgs;
use crate::config::CatalogConfig;
use crate::ecosystems::manager_for;
use crate::error::{CompatError, Result};
use crate::probe::{CompatibilityProbe, EnvironmentManager, VersionProbe};
use crate::report::{write_results, Summary};
use crate::search::{CompatibilitySearch, ExperimentResult};
use crate::ui::UserInterface;

use super::dispatcher::{CatalogSource, Command, CommandResult};

/// Probe backed by the catalog's real tooling.
pub type ToolchainProbe = VersionProbe<Box<dyn EnvironmentManager + Send + Sync>>;

/// Build the probe for `catalog`, placing scratch environments under
/// `scratch_dir` when given.
pub fn toolchain_probe(catalog: &CatalogConfig, scratch_dir: Option<&Path>) -> ToolchainProbe {
    let probe = VersionProbe::new(manager_for(catalog.ecosystem, &catalog.settings));
    match scratch_dir {
        Some(dir) => probe.with_scratch_root(dir),
        None => probe,
    }
}

/// Run the control case and every catalog package against `probe`.
pub fn run_catalog<P>(
    catalog: &CatalogConfig,
    probe: P,
    ui: &mut dyn UserInterface,
) -> Result<Vec<ExperimentResult>>
where
    P: CompatibilityProbe + Sync,
{
    let search = CompatibilitySearch::new(
        probe,
        catalog.toolchain_versions.clone(),
        catalog.packages.clone(),
    )?
    .with_settings(catalog.settings.search_settings());

    ui.show_header(&format!(
        "Testing {} {} packages across {} toolchain versions",
        catalog.packages.len(),
        catalog.ecosystem,
        catalog.toolchain_versions.len()
    ));

    let observer = ui.search_observer();
    Ok(search.run_with_observer(observer.as_ref()))
}

/// Print the end-of-run counts.
pub fn report_summary(ui: &mut dyn UserInterface, results: &[ExperimentResult]) {
    let summary = Summary::from_results(results);

    if let Some(control) = results.iter().find(|r| r.is_control()) {
        match &control.oldest_compatible {
            Some(oldest) => ui.message(&format!("Baseline: oldest working toolchain is {}", oldest)),
            None => ui.warning("Baseline: no candidate toolchain worked on its own"),
        }
    }

    ui.message(&format!(
        "{} packages: {} compatible, {} with no compatible version",
        summary.packages, summary.compatible, summary.incompatible
    ));

    if summary.errors > 0 {
        ui.warning(&format!("{} records could not be completed", summary.errors));
    }
}

/// The run command implementation.
pub struct RunCommand {
    source: CatalogSource,
    args: RunArgs,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(source: CatalogSource, args: RunArgs) -> Self {
        Self { source, args }
    }

    /// Apply command-line overrides to a loaded catalog.
    pub fn apply_overrides(&self, catalog: &mut CatalogConfig) -> Result<()> {
        if let Some(max_parallel) = self.args.max_parallel {
            if max_parallel == 0 {
                return Err(CompatError::ConfigValidationError {
                    message: "--max-parallel must be at least 1".to_string(),
                });
            }
            catalog.settings.max_parallel = max_parallel;
        }

        if self.args.verify_latest {
            catalog.settings.verify_latest = true;
        }

        if !self.args.only.is_empty() {
            if let Some(missing) = self.args.only.iter().find(|n| catalog.package(n).is_none()) {
                return Err(CompatError::UnknownPackage {
                    name: missing.clone(),
                });
            }
            catalog.packages.retain(|p| self.args.only.contains(&p.name));
        }

        Ok(())
    }
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let mut catalog = self.source.load()?;
        self.apply_overrides(&mut catalog)?;

        let probe = toolchain_probe(&catalog, self.args.scratch_dir.as_deref());
        let results = run_catalog(&catalog, probe, ui)?;

        write_results(&self.args.output, &results)?;

        ui.show_results(&results);
        report_summary(ui, &results);
        ui.success(&format!("Results written to {}", self.args.output.display()));

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecosystems::{builtin_catalog, Ecosystem};
    use crate::probe::MockProbe;
    use crate::ui::MockUI;

    fn catalog() -> CatalogConfig {
        builtin_catalog(Ecosystem::Python).unwrap()
    }

    fn command(args: RunArgs) -> RunCommand {
        RunCommand::new(CatalogSource::default(), args)
    }

    #[test]
    fn run_catalog_puts_control_first() {
        let mut catalog = catalog();
        catalog.packages.truncate(3);
        let probe = MockProbe::new()
            .with_control(|v| v != "3.8")
            .with_package("certifi", |_| true);
        let mut ui = MockUI::new();

        let results = run_catalog(&catalog, &probe, &mut ui).unwrap();

        assert_eq!(results.len(), 4);
        assert!(results[0].is_control());
        assert_eq!(results[0].oldest_compatible.as_deref(), Some("3.9"));
        assert_eq!(results[1].package_name, "certifi");
        assert_eq!(results[1].oldest_compatible.as_deref(), Some("3.8"));
        assert_eq!(results[2].oldest_compatible, None);
        assert_eq!(ui.headers().len(), 1);
        assert!(ui.headers()[0].contains("3 python packages"));
    }

    #[test]
    fn overrides_apply_parallelism_and_filter() {
        let mut catalog = catalog();
        let cmd = command(RunArgs {
            max_parallel: Some(4),
            verify_latest: true,
            only: vec!["six".to_string(), "requests".to_string()],
            ..Default::default()
        });

        cmd.apply_overrides(&mut catalog).unwrap();

        assert_eq!(catalog.settings.max_parallel, 4);
        assert!(catalog.settings.verify_latest);
        let names: Vec<_> = catalog.packages.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["requests", "six"]);
    }

    #[test]
    fn overrides_reject_unknown_package() {
        let mut catalog = catalog();
        let cmd = command(RunArgs {
            only: vec!["left-pad".to_string()],
            ..Default::default()
        });

        let err = cmd.apply_overrides(&mut catalog).unwrap_err();

        assert!(matches!(err, CompatError::UnknownPackage { name } if name == "left-pad"));
    }

    #[test]
    fn overrides_reject_zero_parallelism() {
        let mut catalog = catalog();
        let cmd = command(RunArgs {
            max_parallel: Some(0),
            ..Default::default()
        });

        assert!(cmd.apply_overrides(&mut catalog).is_err());
    }

    #[test]
    fn summary_reports_baseline_and_errors() {
        let mut control = ExperimentResult::control();
        control.oldest_compatible = Some("3.9".to_string());
        let mut broken = ExperimentResult::new("broken", "");
        broken.error = Some("boom".to_string());
        let mut ui = MockUI::new();

        report_summary(&mut ui, &[control, broken]);

        assert!(ui.has_message("oldest working toolchain is 3.9"));
        assert!(ui.has_message("1 packages: 0 compatible, 0 with no compatible version"));
        assert_eq!(ui.warnings(), ["1 records could not be completed"]);
    }

    #[test]
    fn toolchain_probe_uses_scratch_dir() {
        let probe = toolchain_probe(&catalog(), Some(Path::new("/tmp/scratch")));
        assert_eq!(probe.scratch_root(), Some(Path::new("/tmp/scratch")));
        assert_eq!(probe.manager().name(), "uv");
    }
}
