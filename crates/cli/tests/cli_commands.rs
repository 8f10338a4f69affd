use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

fn write_config(dir: &std::path::Path, body: &str) -> String {
    let path = dir.join("bench.yaml");
    fs::write(&path, body).unwrap();
    path.to_string_lossy().to_string()
}

#[test]
fn backends_lists_every_kind() {
    cargo_bin_cmd!("bmc-bench")
        .arg("backends")
        .assert()
        .success()
        .stdout(predicate::str::contains("rbmc"))
        .stdout(predicate::str::contains("passes=forward+once"))
        .stdout(predicate::str::contains("sources=.c,.i"));
}

#[test]
fn backends_json_is_machine_readable() {
    let output = cargo_bin_cmd!("bmc-bench")
        .args(["backends", "--json"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let body: serde_json::Value = serde_json::from_slice(&output).expect("backends json");
    let names: Vec<&str> =
        body.as_array().unwrap().iter().map(|b| b["name"].as_str().unwrap()).collect();
    assert_eq!(names, vec!["rbmc", "kani", "esbmc"]);
    assert_eq!(body[1]["rewrites_harness"], true);
}

#[test]
fn bounds_shows_builtins_and_config_overrides() {
    let temp = tempdir().unwrap();
    let config = write_config(temp.path(), "loop_bounds:\n  b: 4\n  lockfree-3-0: 6\n");

    cargo_bin_cmd!("bmc-bench")
        .arg("bounds")
        .assert()
        .success()
        .stdout(predicate::str::contains("lockfree-3-0: 3"));

    cargo_bin_cmd!("bmc-bench")
        .args(["bounds", "--config", config.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("b: 4"))
        .stdout(predicate::str::contains("lockfree-3-0: 6"));
}

#[test]
fn analyze_prints_sorted_report() {
    let temp = tempdir().unwrap();
    let output = temp.path().join("out");
    let logs = output.join("esbmc");
    fs::create_dir_all(&logs).unwrap();
    fs::write(logs.join("zz.log"), "Generated 3 VCC(s), 1 remaining after simplification\n")
        .unwrap();
    fs::write(
        logs.join("aa.log"),
        "Generated 8 VCC(s), 4 remaining after simplification\n  memory leak\n",
    )
    .unwrap();
    let config = write_config(temp.path(), &format!("output_dir: {}\n", output.display()));

    let assert = cargo_bin_cmd!("bmc-bench")
        .args(["analyze", "--backend", "esbmc", "--config", config.as_str()])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("benchmark"));
    assert!(lines[1].starts_with("aa "));
    assert!(lines[1].contains("ML"));
    assert!(lines[2].starts_with("zz "));

    let json = cargo_bin_cmd!("bmc-bench")
        .args(["analyze", "--backend", "esbmc", "--json", "--config", config.as_str()])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let body: serde_json::Value = serde_json::from_slice(&json).expect("report json");
    assert_eq!(body["aa"]["conditions"], 8);
    assert_eq!(body["zz"]["checks"], 1);
}

#[test]
fn analyze_fails_without_partial_output_on_malformed_log() {
    let temp = tempdir().unwrap();
    let output = temp.path().join("out");
    let logs = output.join("esbmc");
    fs::create_dir_all(&logs).unwrap();
    fs::write(logs.join("a.log"), "Generated 2 VCC(s), 1 remaining\n").unwrap();
    fs::write(logs.join("b.log"), "Generated several VCC(s)\n").unwrap();
    let config = write_config(temp.path(), &format!("output_dir: {}\n", output.display()));

    cargo_bin_cmd!("bmc-bench")
        .args(["analyze", "--backend", "esbmc", "--config", config.as_str()])
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Malformed log line"));
}

#[test]
fn unsupported_backend_is_a_usage_error() {
    cargo_bin_cmd!("bmc-bench")
        .args(["analyze", "--backend", "cbmc"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("Unsupported backend 'cbmc'"));
}

#[test]
fn backend_selector_is_required_and_single() {
    cargo_bin_cmd!("bmc-bench").args(["run", "bench"]).assert().failure().code(2);

    cargo_bin_cmd!("bmc-bench")
        .args(["analyze", "--backend", "kani", "--backend", "esbmc"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn run_with_missing_directory_fails_loudly() {
    let temp = tempdir().unwrap();
    let config = write_config(
        temp.path(),
        &format!("output_dir: {}\n", temp.path().join("out").display()),
    );

    cargo_bin_cmd!("bmc-bench")
        .args(["run", "no-such-dir", "--backend", "esbmc", "--config", config.as_str()])
        .current_dir(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Benchmark directory not found"));
}

#[test]
fn history_requires_a_ledger() {
    let temp = tempdir().unwrap();
    let config = write_config(
        temp.path(),
        &format!("output_dir: {}\n", temp.path().join("out").display()),
    );

    cargo_bin_cmd!("bmc-bench")
        .args(["history", "--backend", "kani", "--config", config.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No run ledger found"));
}

#[test]
fn unreadable_config_is_reported() {
    cargo_bin_cmd!("bmc-bench")
        .args(["bounds", "--config", "/definitely/not/here.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to load experiment config"));
}
