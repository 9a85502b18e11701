//! End-to-end CLI tests against the golden fixtures in `tests/fixtures/`.
//!
//! Each fixture directory contains:
//! - `fallback.toml` (and usually `records.json`)
//! - `case.json`: the CLI arguments and the expected exit code
//! - `expected.report.json`: the report, with `__TIMESTAMP__` / `__VERSION__`
//!   placeholders and the source path reduced to its file name

use assert_cmd::Command;
use fallback_test_util::normalize_nondeterministic;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to get a Command for the fallback binary.
/// Wraps the deprecated cargo_bin to centralize the deprecation warning.
#[allow(deprecated)]
fn fallback_cmd() -> Command {
    Command::cargo_bin("fallback").expect("fallback binary not found - run `cargo build` first")
}

/// Get the path to the test fixtures directory
fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .expect("fallback-cli crate should have a parent directory")
        .parent()
        .expect("crates directory should have a parent (repo root)")
        .join("tests")
        .join("fixtures")
}

fn read_json(path: &Path) -> Value {
    let text = std::fs::read_to_string(path)
        .unwrap_or_else(|e| panic!("read {}: {e}", path.display()));
    serde_json::from_str(&text).unwrap_or_else(|e| panic!("parse {}: {e}", path.display()))
}

/// Run one fixture; returns (exit code, report written to --report-out, stdout report).
fn run_fixture(name: &str) -> (i32, Value, Value) {
    let dir = fixtures_dir().join(name);
    let case = read_json(&dir.join("case.json"));
    let args: Vec<String> = case["args"]
        .as_array()
        .expect("case.args is an array")
        .iter()
        .map(|v| v.as_str().expect("args are strings").to_string())
        .collect();

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let report_path = temp_dir.path().join("report.json");

    let output = fallback_cmd()
        .env_remove("FALLBACK_LOG")
        .arg("--config")
        .arg(dir.join("fallback.toml"))
        .args(&args)
        .arg("--report-out")
        .arg(&report_path)
        .output()
        .expect("Failed to run command");

    let code = output.status.code().unwrap_or(-1);
    let file_report = read_json(&report_path);
    let stdout_report: Value =
        serde_json::from_slice(&output.stdout).expect("stdout is a JSON report");
    (code, file_report, stdout_report)
}

fn check_fixture(name: &str) {
    let dir = fixtures_dir().join(name);
    let case = read_json(&dir.join("case.json"));
    let expected = read_json(&dir.join("expected.report.json"));

    let (code, file_report, stdout_report) = run_fixture(name);

    assert_eq!(
        Some(i64::from(code)),
        case["exit_code"].as_i64(),
        "fixture {name}: exit code"
    );
    assert_eq!(file_report, stdout_report, "fixture {name}: file and stdout differ");
    assert_eq!(
        normalize_nondeterministic(file_report),
        expected,
        "fixture {name}: report differs from expected.report.json"
    );
}

#[test]
fn fixture_primary_match() {
    check_fixture("primary_match");
}

#[test]
fn fixture_fallback_match() {
    check_fixture("fallback_match");
}

#[test]
fn fixture_no_match() {
    check_fixture("no_match");
}

#[test]
fn fixture_canonical_predicates() {
    check_fixture("canonical_predicates");
}

#[test]
fn fixture_missing_source() {
    check_fixture("missing_source");
}

#[test]
fn every_fixture_directory_is_covered() {
    let mut names: Vec<String> = std::fs::read_dir(fixtures_dir())
        .expect("read fixtures dir")
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .map(|e| e.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "canonical_predicates",
            "fallback_match",
            "missing_source",
            "no_match",
            "primary_match",
        ]
    );
}
