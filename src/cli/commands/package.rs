//! The `compat-probe package` command.
//!
//! Tests one package against the catalog's toolchain versions and writes
//! `result-<name>.json`. Packages missing from the catalog are tested anyway
//! with the given spec, or the ecosystem's default.

use std::slice;

use crate::cli::args::PackageArgs;
use crate::config::CatalogConfig;
use crate::error::Result;
use crate::probe::{CompatibilityProbe, PackageSpec};
use crate::report::write_single_result;
use crate::search::{CompatibilitySearch, ExperimentResult};
use crate::ui::UserInterface;

use super::dispatcher::{CatalogSource, Command, CommandResult};
use super::run::toolchain_probe;

/// The package command implementation.
pub struct PackageCommand {
    source: CatalogSource,
    args: PackageArgs,
}

impl PackageCommand {
    /// Create a new package command.
    pub fn new(source: CatalogSource, args: PackageArgs) -> Self {
        Self { source, args }
    }

    /// The spec to test: the catalog entry with any overrides applied, or a
    /// fresh one for packages the catalog doesn't know.
    pub fn package_spec(&self, catalog: &CatalogConfig, ui: &mut dyn UserInterface) -> PackageSpec {
        let mut package = match catalog.package(&self.args.name) {
            Some(known) => known.clone(),
            None => {
                let spec = self
                    .args
                    .spec
                    .as_deref()
                    .unwrap_or(catalog.ecosystem.default_version_spec());
                ui.warning(&format!(
                    "'{}' is not in the {} catalog; testing anyway with spec '{}'",
                    self.args.name, catalog.ecosystem, spec
                ));
                PackageSpec::new(&self.args.name, spec)
            }
        };

        if let Some(spec) = &self.args.spec {
            package.version_spec = spec.clone();
        }
        if let Some(import_name) = &self.args.import_name {
            package.import_name = Some(import_name.clone());
        }

        package
    }

    /// Test `package` against every catalog version using `probe`.
    pub fn test<P: CompatibilityProbe>(
        &self,
        catalog: &CatalogConfig,
        package: &PackageSpec,
        probe: P,
        ui: &mut dyn UserInterface,
    ) -> Result<ExperimentResult> {
        let mut settings = catalog.settings.search_settings();
        settings.verify_latest |= self.args.verify_latest;

        let search = CompatibilitySearch::new(
            probe,
            catalog.toolchain_versions.clone(),
            vec![package.clone()],
        )?
        .with_settings(settings);

        ui.show_header(&format!(
            "Testing {} ({}) across {} {} versions",
            package.name,
            if package.version_spec.is_empty() { "any" } else { package.version_spec.as_str() },
            catalog.toolchain_versions.len(),
            catalog.ecosystem
        ));

        let observer = ui.search_observer();
        observer.package_started(&package.name);
        let result = search.test_package(package);
        observer.package_finished(&result);

        Ok(result)
    }
}

impl Command for PackageCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let catalog = self.source.load()?;
        let package = self.package_spec(&catalog, ui);

        let probe = toolchain_probe(&catalog, self.args.scratch_dir.as_deref());
        let result = self.test(&catalog, &package, probe, ui)?;

        let path = write_single_result(&self.args.output_dir, &result)?;
        ui.show_results(slice::from_ref(&result));

        if let Some(error) = &result.error {
            ui.error(&format!("Failed to test {}: {}", package.name, error));
            return Ok(CommandResult::failure(1));
        }

        ui.success(&format!("Result written to {}", path.display()));
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ecosystems::{builtin_catalog, Ecosystem};
    use crate::probe::MockProbe;
    use crate::ui::MockUI;
    use std::path::PathBuf;

    fn args(name: &str) -> PackageArgs {
        PackageArgs {
            name: name.to_string(),
            spec: None,
            import_name: None,
            output_dir: PathBuf::from("."),
            verify_latest: false,
            scratch_dir: None,
        }
    }

    fn command(args: PackageArgs) -> PackageCommand {
        PackageCommand::new(CatalogSource::default(), args)
    }

    #[test]
    fn known_package_uses_catalog_entry() {
        let catalog = builtin_catalog(Ecosystem::Python).unwrap();
        let mut ui = MockUI::new();

        let package = command(args("pyyaml")).package_spec(&catalog, &mut ui);

        assert_eq!(package.version_spec, ">=6.0");
        assert_eq!(package.module_name(), "yaml");
        assert!(ui.warnings().is_empty());
    }

    #[test]
    fn unknown_package_warns_and_uses_default_spec() {
        let catalog = builtin_catalog(Ecosystem::Rust).unwrap();
        let mut ui = MockUI::new();

        let package = command(args("left-pad")).package_spec(&catalog, &mut ui);

        assert_eq!(package.version_spec, "*");
        assert_eq!(ui.warnings().len(), 1);
        assert!(ui.warnings()[0].contains("not in the rust catalog"));
    }

    #[test]
    fn flags_override_catalog_entry() {
        let catalog = builtin_catalog(Ecosystem::Python).unwrap();
        let mut ui = MockUI::new();
        let mut args = args("requests");
        args.spec = Some(">=2.0".to_string());
        args.import_name = Some("requests_alias".to_string());

        let package = command(args).package_spec(&catalog, &mut ui);

        assert_eq!(package.version_spec, ">=2.0");
        assert_eq!(package.module_name(), "requests_alias");
    }

    #[test]
    fn test_searches_single_package() {
        let catalog = builtin_catalog(Ecosystem::Python).unwrap();
        let package = PackageSpec::new("requests", ">=2.32");
        let probe = MockProbe::new()
            .with_package("requests", |v| v != "3.8")
            .with_resolved("requests", "2.32.3");
        let mut ui = MockUI::new();

        let result = command(args("requests"))
            .test(&catalog, &package, &probe, &mut ui)
            .unwrap();

        assert_eq!(result.resolved_version.as_deref(), Some("2.32.3"));
        assert_eq!(result.oldest_compatible.as_deref(), Some("3.9"));
        assert_eq!(result.latest_compatible.as_deref(), Some("3.13"));
        assert_eq!(probe.probe_count(None), 0);
    }
}
