#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn kmerfeat_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_kmerfeat"));
    cmd.env("NO_COLOR", "1");
    cmd
}

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn run_build(out: &Path, extra: &[&str]) -> Output {
    kmerfeat_cmd()
        .arg("build")
        .arg("--fasta-dir")
        .arg(fixture_path("cohort"))
        .arg("--meta")
        .arg(fixture_path("metadata.csv"))
        .arg("--out")
        .arg(out)
        .args(extra)
        .output()
        .expect("Failed to execute")
}

#[test]
fn cli_help_flag() {
    let output = kmerfeat_cmd()
        .arg("--help")
        .output()
        .expect("Failed to execute");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("kmerfeat"));
    assert!(stdout.contains("build"));
    assert!(stdout.contains("align"));
}

#[test]
fn cli_version_flag() {
    let output = kmerfeat_cmd()
        .arg("--version")
        .output()
        .expect("Failed to execute");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn cli_missing_subcommand() {
    let output = kmerfeat_cmd().output().expect("Failed to execute");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Usage"));
}

#[test]
fn cli_build_missing_args() {
    let output = kmerfeat_cmd()
        .arg("build")
        .output()
        .expect("Failed to execute");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("required"));
}

#[test]
fn cli_build_writes_table_and_schema() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("features.csv");
    let output = run_build(&out, &["--top-kmers", "10"]);
    assert!(output.status.success());

    let table = std::fs::read_to_string(&out).unwrap();
    let mut lines = table.lines();
    let header = lines.next().unwrap();
    assert!(header.starts_with("sample_id,label,seq_len,gc,k_"));
    assert_eq!(header.split(',').count(), 4 + 10);
    assert_eq!(lines.count(), 4);

    let schema = dir.path().join("features.csv.schema.json");
    let schema = std::fs::read_to_string(schema).unwrap();
    assert!(schema.contains("\"k\": 3"));
}

#[test]
fn cli_build_reports_missing_sample() {
    let dir = TempDir::new().unwrap();
    let output = run_build(&dir.path().join("features.csv"), &["--quiet"]);
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Degraded sample:"));
    assert!(stderr.contains("S9"));
    assert!(output.stdout.is_empty(), "quiet build should print nothing");
}

#[test]
fn cli_build_custom_schema_path() {
    let dir = TempDir::new().unwrap();
    let schema = dir.path().join("model").join("vocab.json");
    let output = run_build(
        &dir.path().join("features.csv"),
        &["--schema", schema.to_str().unwrap(), "-q"],
    );
    assert!(output.status.success());
    assert!(schema.exists());
    assert!(!dir.path().join("features.csv.schema.json").exists());
}

#[test]
fn cli_build_rejects_zero_k() {
    let dir = TempDir::new().unwrap();
    let output = run_build(&dir.path().join("features.csv"), &["-k", "0"]);
    assert!(!output.status.success());
}

#[test]
fn cli_build_missing_metadata_fails() {
    let dir = TempDir::new().unwrap();
    let output = kmerfeat_cmd()
        .args(["build", "--fasta-dir"])
        .arg(fixture_path("cohort"))
        .arg("--meta")
        .arg(dir.path().join("absent.csv"))
        .arg("--out")
        .arg(dir.path().join("features.csv"))
        .output()
        .expect("Failed to execute");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Application error"));
}

#[test]
fn cli_align_with_schema() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("features.csv");
    assert!(run_build(&out, &["--top-kmers", "6", "-q"]).status.success());

    let output = kmerfeat_cmd()
        .arg("align")
        .arg("--fasta")
        .arg(fixture_path("query.fasta"))
        .arg("--schema")
        .arg(dir.path().join("features.csv.schema.json"))
        .arg("-q")
        .output()
        .expect("Failed to execute");
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<_> = stdout.lines().collect();
    assert_eq!(lines.len(), 2 + 6);
    assert_eq!(lines[0], "seq_len\t18");
    assert!(lines[1].starts_with("gc\t"));
    assert!(lines[2..].iter().all(|line| line.starts_with("k_")));
}

#[test]
fn cli_align_with_features_matches_schema() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("features.csv");
    assert!(run_build(&out, &["-q"]).status.success());

    let via_schema = kmerfeat_cmd()
        .arg("align")
        .arg("--fasta")
        .arg(fixture_path("query.fasta"))
        .arg("--schema")
        .arg(dir.path().join("features.csv.schema.json"))
        .output()
        .expect("Failed to execute");
    let via_table = kmerfeat_cmd()
        .arg("align")
        .arg("--fasta")
        .arg(fixture_path("query.fasta"))
        .arg("--features")
        .arg(&out)
        .output()
        .expect("Failed to execute");

    assert!(via_schema.status.success());
    assert!(via_table.status.success());
    assert_eq!(via_schema.stdout, via_table.stdout);
}

#[test]
fn cli_align_json_format() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("features.csv");
    assert!(run_build(&out, &["--top-kmers", "4", "-q"]).status.success());

    let output = kmerfeat_cmd()
        .arg("align")
        .arg("--fasta")
        .arg(fixture_path("query.fasta"))
        .arg("--features")
        .arg(&out)
        .args(["--format", "json", "-q"])
        .output()
        .expect("Failed to execute");
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["columns"].as_array().unwrap().len(), 6);
    assert_eq!(value["values"].as_array().unwrap().len(), 6);
    assert_eq!(value["columns"][0], "seq_len");
    assert_eq!(value["values"][0], 18.0);
}

#[test]
fn cli_align_k_mismatch_fails() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("features.csv");
    assert!(run_build(&out, &["-q"]).status.success());

    let output = kmerfeat_cmd()
        .arg("align")
        .arg("--fasta")
        .arg(fixture_path("query.fasta"))
        .arg("--schema")
        .arg(dir.path().join("features.csv.schema.json"))
        .args(["-k", "4"])
        .output()
        .expect("Failed to execute");
    assert!(!output.status.success());
}

#[test]
fn cli_align_without_schema_fails() {
    let output = kmerfeat_cmd()
        .arg("align")
        .arg("--fasta")
        .arg(fixture_path("query.fasta"))
        .output()
        .expect("Failed to execute");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Application error"));
}
