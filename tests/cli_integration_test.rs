//! Integration tests for CLI argument handling.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

#[test]
fn test_no_args_prints_help() {
    let mut cmd = cargo_bin_cmd!("vocalign");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Usage"));
}

#[test]
fn test_config_path_prints_toml_path() {
    let mut cmd = cargo_bin_cmd!("vocalign");
    cmd.arg("config").arg("path");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn test_run_without_labels_fails() {
    let temp = tempfile::TempDir::new().unwrap();
    let mut cmd = cargo_bin_cmd!("vocalign");
    cmd.arg(temp.path()).arg("--utc-offset").arg("0");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("no label stream provided"));
}

#[test]
fn test_positive_silence_threshold_rejected() {
    let mut cmd = cargo_bin_cmd!("vocalign");
    cmd.arg("/tmp/day")
        .arg("--labels")
        .arg("/tmp/labels.csv")
        .arg("--silence-thresh")
        .arg("3.0");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("dBFS"));
}

#[test]
fn test_out_of_range_utc_offset_rejected() {
    let mut cmd = cargo_bin_cmd!("vocalign");
    cmd.arg("/tmp/day")
        .arg("--labels")
        .arg("/tmp/labels.csv")
        .arg("--utc-offset")
        .arg("20");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("UTC offset"));
}
