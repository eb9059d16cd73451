//! End-to-end search tests against a scripted environment manager.

use compat_probe::probe::{MockManager, PackageSpec, VersionProbe};
use compat_probe::report::{read_results, write_results};
use compat_probe::search::{CompatibilitySearch, SearchSettings};
use std::fs;
use tempfile::TempDir;

fn versions() -> Vec<String> {
    ["3.8", "3.9", "3.10", "3.11", "3.12", "3.13"]
        .iter()
        .map(|v| v.to_string())
        .collect()
}

fn catalog() -> Vec<PackageSpec> {
    vec![
        PackageSpec::new("requests", ">=2.32"),
        PackageSpec::new("numpy", ">=1.26"),
        PackageSpec::new("boom", ""),
        PackageSpec::new("slowpkg", ">=1"),
    ]
}

fn manager() -> MockManager {
    MockManager::new()
        .with_failing_smoke_check("3.8")
        .with_installed_version("requests", "2.32.3")
        .with_install_failure("requests", "3.8")
        .with_install_failure("requests", "3.9")
        .with_import_failure("numpy", "3.8")
        .with_import_failure("numpy", "3.9")
        .with_import_failure("numpy", "3.10")
        .with_import_failure("numpy", "3.11")
        .with_import_failure("numpy", "3.12")
        .with_import_failure("numpy", "3.13")
        .with_panic_on_install("boom")
        .with_installed_version("slowpkg", "1.0")
        .with_timed_out_install("slowpkg", "3.8")
        .with_timed_out_install("slowpkg", "3.9")
        .with_timed_out_install("slowpkg", "3.10")
        .with_timed_out_install("slowpkg", "3.11")
}

fn leftover_entries(dir: &TempDir) -> usize {
    fs::read_dir(dir.path()).unwrap().count()
}

#[test]
fn full_run_records_every_package() {
    let scratch = TempDir::new().unwrap();
    let probe = VersionProbe::new(manager()).with_scratch_root(scratch.path());
    let search = CompatibilitySearch::new(probe, versions(), catalog()).unwrap();

    let results = search.run();

    insta::assert_json_snapshot!(results, @r#"
    [
      {
        "package_name": "CONTROL",
        "version_spec": "none",
        "resolved_version": null,
        "oldest_compatible": "3.9",
        "latest_compatible": "3.13",
        "error": null
      },
      {
        "package_name": "requests",
        "version_spec": ">=2.32",
        "resolved_version": "2.32.3",
        "oldest_compatible": "3.10",
        "latest_compatible": "3.13",
        "error": null
      },
      {
        "package_name": "numpy",
        "version_spec": ">=1.26",
        "resolved_version": null,
        "oldest_compatible": null,
        "latest_compatible": "3.13",
        "error": null
      },
      {
        "package_name": "boom",
        "version_spec": "",
        "resolved_version": null,
        "oldest_compatible": null,
        "latest_compatible": null,
        "error": "mock install of boom exploded"
      },
      {
        "package_name": "slowpkg",
        "version_spec": ">=1",
        "resolved_version": "1.0",
        "oldest_compatible": "3.12",
        "latest_compatible": "3.13",
        "error": null
      }
    ]
    "#);

    assert_eq!(leftover_entries(&scratch), 0);
}

#[test]
fn control_case_never_installs_a_package() {
    let scratch = TempDir::new().unwrap();
    let probe = VersionProbe::new(manager()).with_scratch_root(scratch.path());
    let search = CompatibilitySearch::new(probe, versions(), Vec::new()).unwrap();

    let control = search.test_control_case();

    assert_eq!(control.oldest_compatible.as_deref(), Some("3.9"));
    let calls = search.probe().manager().calls();
    assert!(calls.iter().any(|c| c.starts_with("run_smoke_check")));
    assert!(!calls.iter().any(|c| c.starts_with("install_package")));
}

#[test]
fn parallel_run_matches_sequential_order() {
    let sequential = {
        let scratch = TempDir::new().unwrap();
        let probe = VersionProbe::new(manager()).with_scratch_root(scratch.path());
        CompatibilitySearch::new(probe, versions(), catalog())
            .unwrap()
            .run()
    };

    let scratch = TempDir::new().unwrap();
    let probe = VersionProbe::new(manager()).with_scratch_root(scratch.path());
    let parallel = CompatibilitySearch::new(probe, versions(), catalog())
        .unwrap()
        .with_settings(SearchSettings {
            max_parallel: 3,
            ..Default::default()
        })
        .run();

    assert_eq!(parallel, sequential);
    assert_eq!(leftover_entries(&scratch), 0);
}

#[test]
fn verify_latest_drops_unverified_newest() {
    let scratch = TempDir::new().unwrap();
    let probe = VersionProbe::new(manager()).with_scratch_root(scratch.path());
    let search = CompatibilitySearch::new(probe, versions(), catalog())
        .unwrap()
        .with_settings(SearchSettings {
            verify_latest: true,
            ..Default::default()
        });

    let numpy = search.test_package(&PackageSpec::new("numpy", ">=1.26"));
    let requests = search.test_package(&PackageSpec::new("requests", ">=2.32"));

    assert_eq!(numpy.latest_compatible, None);
    assert_eq!(requests.latest_compatible.as_deref(), Some("3.13"));
}

#[test]
fn results_document_survives_a_round_trip() {
    let scratch = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let probe = VersionProbe::new(manager()).with_scratch_root(scratch.path());
    let results = CompatibilitySearch::new(probe, versions(), catalog())
        .unwrap()
        .run();
    let path = out.path().join("results.json");

    write_results(&path, &results).unwrap();

    assert_eq!(read_results(&path).unwrap(), results);
}
