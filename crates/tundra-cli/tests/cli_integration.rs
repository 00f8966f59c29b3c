//! CLI subprocess integration tests.
//!
//! These tests invoke the `tundra` binary as a subprocess and verify
//! exit codes, stdout content, and JSON output stability.

use std::process::Command;

fn tundra_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_tundra"))
}

fn write_manifest(dir: &std::path::Path, content: &str) -> std::path::PathBuf {
    let path = dir.join("tundra.toml");
    std::fs::write(&path, content).unwrap();
    path
}

const VALID: &str = r#"
[project]
name = "demo"
platforms = ["linux-64"]
channels = ["conda-forge"]

[tasks]
fmt = "cargo fmt"
"#;

const INVALID: &str = r#"
[project]
platforms = ["linux-64"]

[bogus-key]
x = 1
"#;

#[test]
fn cli_version_exits_zero() {
    let output = tundra_bin().arg("--version").output().unwrap();
    assert!(output.status.success());
}

#[test]
fn check_valid_manifest_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_manifest(dir.path(), VALID);
    let output = tundra_bin().arg("check").arg(&manifest).output().unwrap();
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8(output.stdout).unwrap();
    assert!(stdout.contains("valid manifest"));
}

#[test]
fn check_invalid_manifest_exits_two_and_lists_violations() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_manifest(dir.path(), INVALID);
    let output = tundra_bin().arg("check").arg(&manifest).output().unwrap();
    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("project.name"));
    assert!(stderr.contains("bogus-key"));
}

#[test]
fn check_json_output_carries_violation_kinds() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = write_manifest(dir.path(), INVALID);
    let output = tundra_bin()
        .arg("check")
        .arg(&manifest)
        .arg("--json")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(2));
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["valid"], false);
    let kinds: Vec<&str> = report["violations"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["kind"].as_str().unwrap())
        .collect();
    assert!(kinds.contains(&"missing-field"));
    assert!(kinds.contains(&"unknown-field"));
}

#[test]
fn check_missing_file_exits_one() {
    let output = tundra_bin()
        .arg("check")
        .arg("/nonexistent/tundra.toml")
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn schema_prints_a_schema_document() {
    let output = tundra_bin().arg("schema").output().unwrap();
    assert!(output.status.success());
    let schema: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(schema["title"], "Manifest");
    assert!(schema["definitions"]["Feature"].is_object());
}

#[test]
fn schema_output_is_stable_across_runs() {
    let first = tundra_bin().arg("schema").output().unwrap();
    let second = tundra_bin().arg("schema").output().unwrap();
    assert_eq!(first.stdout, second.stdout);
}

#[test]
fn schema_output_flag_writes_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("schema.json");
    let output = tundra_bin()
        .arg("schema")
        .arg("--output")
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    let content = std::fs::read_to_string(&path).unwrap();
    let schema: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(schema["title"], "Manifest");
}
