//! Integration tests for the compat-probe binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// A catalog whose tooling can't be found, so every probe fails fast.
const UNREACHABLE_CATALOG: &str = r#"
ecosystem: python
toolchain_versions: ["3.11", "3.12", "3.13"]
packages:
  - name: requests
    version_spec: ">=2.32"
  - name: six
settings:
  tools:
    uv: /nonexistent/compat-probe/uv
"#;

fn compat_probe(dir: &Path) -> Command {
    let mut cmd = Command::new(cargo_bin("compat-probe"));
    cmd.current_dir(dir);
    cmd.env_remove("COMPAT_PROBE_CONFIG");
    cmd.env_remove("RUST_LOG");
    cmd.env("NO_COLOR", "1");
    cmd
}

fn write_catalog(dir: &Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("catalog.yml");
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn cli_shows_help() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    compat_probe(temp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("oldest toolchain"));
    Ok(())
}

#[test]
fn cli_shows_version() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    compat_probe(temp.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn cli_list_shows_builtin_python_catalog() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    compat_probe(temp.path())
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("python catalog"))
        .stdout(predicate::str::contains("pyyaml >=6.0 (imports yaml)"));
    Ok(())
}

#[test]
fn cli_list_rust_versions() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    compat_probe(temp.path())
        .args(["list", "--ecosystem", "rust", "--versions"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rust catalog"))
        .stdout(predicate::str::contains("unicode-segmentation 1"))
        .stdout(predicate::str::contains("1.0.0, 1.1.0"));
    Ok(())
}

#[test]
fn cli_list_covers_go_node_and_java() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    compat_probe(temp.path())
        .args(["list", "--ecosystem", "go"])
        .assert()
        .success()
        .stdout(predicate::str::contains("go catalog: 26 packages, 12 toolchain versions"))
        .stdout(predicate::str::contains(
            "github.com/stretchr/testify v1 (imports github.com/stretchr/testify/assert)",
        ));
    compat_probe(temp.path())
        .args(["list", "--ecosystem", "node"])
        .assert()
        .success()
        .stdout(predicate::str::contains("node catalog: 21 packages"))
        .stdout(predicate::str::contains("Versions: v14.21.3 .. v24.0.2"));
    compat_probe(temp.path())
        .args(["list", "--ecosystem", "java"])
        .assert()
        .success()
        .stdout(predicate::str::contains("java catalog: 26 packages, 5 toolchain versions"))
        .stdout(predicate::str::contains("org.slf4j:slf4j-api [2.0,3.0)"));
    Ok(())
}

#[test]
fn cli_rejects_unknown_ecosystem() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    compat_probe(temp.path())
        .args(["list", "--ecosystem", "cobol"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("cobol"));
    Ok(())
}

#[test]
fn cli_missing_config_fails() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    compat_probe(temp.path())
        .args(["run", "--config", "missing.yml"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Configuration not found"));
    assert!(!temp.path().join("results.json").exists());
    Ok(())
}

#[test]
fn cli_invalid_catalog_reports_every_problem() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let catalog = write_catalog(
        temp.path(),
        "ecosystem: python\ntoolchain_versions: []\npackages:\n  - name: CONTROL\n",
    );
    compat_probe(temp.path())
        .arg("run")
        .arg("--config")
        .arg(&catalog)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("At least one toolchain version"))
        .stderr(predicate::str::contains("reserved"));
    Ok(())
}

#[test]
fn cli_schema_prints_json_schema() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let output = compat_probe(temp.path()).arg("schema").output()?;
    assert!(output.status.success());

    let schema: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    assert!(schema["properties"].get("toolchain_versions").is_some());
    Ok(())
}

#[test]
fn cli_generates_completions() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    compat_probe(temp.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("compat-probe"));
    Ok(())
}

#[test]
fn cli_run_without_tooling_still_writes_results() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let catalog = write_catalog(temp.path(), UNREACHABLE_CATALOG);

    compat_probe(temp.path())
        .arg("run")
        .arg("--config")
        .arg(&catalog)
        .assert()
        .success()
        .stdout(predicate::str::contains("Results written to results.json"));

    let json = fs::read_to_string(temp.path().join("results.json"))?;
    let results: serde_json::Value = serde_json::from_str(&json)?;
    let results = results.as_array().unwrap();

    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["package_name"], "CONTROL");
    assert_eq!(results[0]["version_spec"], "none");
    assert_eq!(results[1]["package_name"], "requests");
    assert_eq!(results[2]["package_name"], "six");
    for result in results {
        assert!(result["oldest_compatible"].is_null());
        assert!(result["resolved_version"].is_null());
        assert!(result["error"].is_null());
        assert_eq!(result["latest_compatible"], "3.13");
    }
    Ok(())
}

#[test]
fn cli_run_honors_output_and_only() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let catalog = write_catalog(temp.path(), UNREACHABLE_CATALOG);

    compat_probe(temp.path())
        .arg("--quiet")
        .arg("run")
        .arg("--config")
        .arg(&catalog)
        .args(["--only", "six", "--output", "out/six.json"])
        .assert()
        .success();

    let json = fs::read_to_string(temp.path().join("out/six.json"))?;
    let results: serde_json::Value = serde_json::from_str(&json)?;
    assert_eq!(results.as_array().unwrap().len(), 2);
    assert_eq!(results[1]["package_name"], "six");
    Ok(())
}

#[test]
fn cli_package_writes_single_result() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let catalog = write_catalog(temp.path(), UNREACHABLE_CATALOG);

    compat_probe(temp.path())
        .arg("package")
        .arg("left-pad")
        .arg("--config")
        .arg(&catalog)
        .assert()
        .success()
        .stdout(predicate::str::contains("not in the python catalog"))
        .stdout(predicate::str::contains("result-left-pad.json"));

    let json = fs::read_to_string(temp.path().join("result-left-pad.json"))?;
    let result: serde_json::Value = serde_json::from_str(&json)?;
    assert_eq!(result["package_name"], "left-pad");
    assert_eq!(result["version_spec"], "");
    assert!(result["oldest_compatible"].is_null());
    Ok(())
}

#[test]
fn cli_package_reserved_name_fails_but_writes_result() -> Result<(), Box<dyn std::error::Error>>
{
    let temp = TempDir::new()?;
    let catalog = write_catalog(temp.path(), UNREACHABLE_CATALOG);

    compat_probe(temp.path())
        .arg("package")
        .arg("CONTROL")
        .arg("--config")
        .arg(&catalog)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("reserved"));

    let json = fs::read_to_string(temp.path().join("result-CONTROL.json"))?;
    let result: serde_json::Value = serde_json::from_str(&json)?;
    assert!(result["error"].as_str().unwrap().contains("reserved"));
    Ok(())
}
