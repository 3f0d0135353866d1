//! CLI integration tests
//!
//! Exercise the binary end to end on repositories that need no compiler:
//! packages without a tsconfig are skipped, so these runs never spawn tsc.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn monocheck_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_monocheck"))
}

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn run(args: &[&str]) -> std::process::Output {
    Command::new(monocheck_bin())
        .args(args)
        .env_remove("MONOCHECK_TSCONFIG")
        .env_remove("MONOCHECK_OUTPUT")
        .env_remove("MONOCHECK_LOG_LEVEL")
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run monocheck")
}

#[test]
fn test_cli_help() {
    let output = run(&["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--output"));
    assert!(stdout.contains("--quiet"));
}

#[test]
fn test_cli_version() {
    let output = run(&["--version"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_repository_without_tsconfig() {
    let temp = TempDir::new().unwrap();
    write(temp.path(), "pnpm-workspace.yaml", "packages:\n  - packages/*\n");
    write(temp.path(), "packages/a/package.json", r#"{"name": "a"}"#);
    write(temp.path(), "packages/b/package.json", r#"{"name": "b"}"#);
    let report = temp.path().join("out/report.tsv");

    let output = run(&[
        temp.path().to_str().unwrap(),
        "-o",
        report.to_str().unwrap(),
    ]);

    assert_eq!(output.status.code(), Some(0));
    let content = fs::read_to_string(&report).unwrap();
    assert_eq!(content, "id\tpackage_name\tfile_name\terror_code\tdescription\n");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("0 diagnostics in 2 packages"), "stdout: {}", stdout);
}

#[test]
fn test_quiet_prints_no_summary() {
    let temp = TempDir::new().unwrap();
    let report = temp.path().join("report.tsv");

    let output = run(&[temp.path().to_str().unwrap(), "-q", "-o", report.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(0));
    assert!(output.stdout.is_empty());
    assert!(report.is_file());
}

#[test]
fn test_missing_directory_exits_with_failure() {
    let temp = TempDir::new().unwrap();
    let output = run(&[temp.path().join("nope").to_str().unwrap(), "-q"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Not a directory"));
}

#[test]
fn test_invalid_tsconfig_name_exits_with_failure() {
    let temp = TempDir::new().unwrap();
    let output = run(&[temp.path().to_str().unwrap(), "--tsconfig", "a/b.json", "-q"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_json_format() {
    let temp = TempDir::new().unwrap();
    let report = temp.path().join("report.json");

    let output = run(&[
        temp.path().to_str().unwrap(),
        "-q",
        "-f",
        "json",
        "-o",
        report.to_str().unwrap(),
    ]);
    assert_eq!(output.status.code(), Some(0));
    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(value, serde_json::json!([]));
}
