//! Integration tests for the `pstmargin` binary

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// Command with an empty config directory, so no user config is picked up.
fn pstmargin(config_home: &Path) -> Command {
    let mut cmd = cargo_bin_cmd!("pstmargin");
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env("HOME", config_home);
    cmd
}

#[test]
fn test_help_lists_commands() {
    let tmp = tempdir().unwrap();
    pstmargin(tmp.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("optimize"))
        .stdout(predicate::str::contains("report"))
        .stdout(predicate::str::contains("dataset"));
}

#[test]
fn test_base_prints_synthetic_margins() {
    let tmp = tempdir().unwrap();
    pstmargin(tmp.path())
        .arg("base")
        .assert()
        .success()
        .stdout(predicate::str::contains("L6"))
        .stdout(predicate::str::contains("Min margin: 30.000 MW (line L1)"));
}

#[test]
fn test_optimize_writes_json() {
    let tmp = tempdir().unwrap();
    let out = tmp.path().join("result.json");
    pstmargin(tmp.path())
        .args(["optimize", "--out", out.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Status: Optimal"))
        .stdout(predicate::str::contains("Results written to"));

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["status"], "Optimal");
    assert_eq!(json["backend"], "microlp");
    assert_eq!(json["lines"].as_array().unwrap().len(), 6);
    let gap = json["consistency_gap"].as_f64().unwrap();
    assert!(gap < 1e-4);
    let objective = json["objective_min_margin"].as_f64().unwrap();
    assert!(objective >= json["base_min_margin"].as_f64().unwrap() - 1e-6);
}

#[test]
fn test_report_writes_four_tables() {
    let tmp = tempdir().unwrap();
    let out_dir = tmp.path().join("nested").join("results");
    pstmargin(tmp.path())
        .args(["report", "--out-dir", out_dir.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("margins_base_vs_opt.csv"));

    for name in [
        "margins_base_vs_opt.csv",
        "absflow_vs_limit.csv",
        "controls_taps.csv",
        "controls_gens.csv",
    ] {
        assert!(out_dir.join(name).exists(), "missing {name}");
    }
    let margins = fs::read_to_string(out_dir.join("margins_base_vs_opt.csv")).unwrap();
    let mut rows = margins.lines();
    assert_eq!(rows.next(), Some("line,base_margin,opt_margin"));
    assert_eq!(rows.count(), 6);
}

#[test]
fn test_report_without_controls_keeps_headers() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("lines_only.toml");
    fs::write(
        &path,
        "[[lines]]\nname = \"L1\"\nf_ref = 30.0\nf_max = 100.0\n",
    )
    .unwrap();
    let out_dir = tmp.path().join("results");
    pstmargin(tmp.path())
        .args(["report", "--dataset", path.to_str().unwrap()])
        .args(["--out-dir", out_dir.to_str().unwrap()])
        .assert()
        .success();

    let taps = fs::read_to_string(out_dir.join("controls_taps.csv")).unwrap();
    assert_eq!(taps.trim_end(), "pst,base_tap,opt_tap");
    let gens = fs::read_to_string(out_dir.join("controls_gens.csv")).unwrap();
    assert_eq!(gens.trim_end(), "generator,base_mw,opt_mw");
    let margins = fs::read_to_string(out_dir.join("margins_base_vs_opt.csv")).unwrap();
    assert_eq!(margins.lines().count(), 2);
}

#[test]
fn test_dataset_export_then_validate_and_optimize() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("net.toml");
    pstmargin(tmp.path())
        .args(["dataset", "export", "--out", path.to_str().unwrap()])
        .assert()
        .success();

    pstmargin(tmp.path())
        .args(["dataset", "validate", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("6 lines"))
        .stdout(predicate::str::contains("1 coupled tap pairs"));

    pstmargin(tmp.path())
        .args(["optimize", "--dataset", path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Optimal"));
}

#[test]
fn test_evaluate_controls_file() {
    let tmp = tempdir().unwrap();
    let controls = tmp.path().join("controls.json");
    fs::write(
        &controls,
        r#"{"taps": {"P1": 0, "P2": 2, "P3": 2}, "gens": {"G1": 300.0, "G2": 250.0, "G3": 200.0}}"#,
    )
    .unwrap();

    pstmargin(tmp.path())
        .args(["evaluate", "--controls", controls.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Min margin: 30.000 MW"));
}

#[test]
fn test_evaluate_missing_control_fails() {
    let tmp = tempdir().unwrap();
    let controls = tmp.path().join("controls.json");
    fs::write(&controls, r#"{"taps": {"P1": 0}}"#).unwrap();

    pstmargin(tmp.path())
        .args(["evaluate", "--controls", controls.to_str().unwrap()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no value for phase shifter"));
}

#[test]
fn test_invalid_dataset_fails() {
    let tmp = tempdir().unwrap();
    let path = tmp.path().join("bad.toml");
    fs::write(&path, "[[lines]]\nname = \"L1\"\nf_ref = 1.0\nf_max = 0.0\n").unwrap();

    pstmargin(tmp.path())
        .args(["dataset", "validate", path.to_str().unwrap()])
        .assert()
        .failure();
}

#[test]
fn test_config_file_supplies_dataset() {
    let tmp = tempdir().unwrap();
    let net = tmp.path().join("two.json");
    fs::write(
        &net,
        r#"{
            "name": "two-line",
            "lines": [
                {"name": "A", "f_ref": 90.0, "f_max": 100.0},
                {"name": "B", "f_ref": -30.0, "f_max": 100.0}
            ],
            "phase_shifters": [{"name": "P", "t_init": 0, "t_range": 5}],
            "psdf": [
                {"line": "A", "pst": "P", "value": -10.0},
                {"line": "B", "pst": "P", "value": -10.0}
            ]
        }"#,
    )
    .unwrap();
    let config = tmp.path().join("config.toml");
    fs::write(&config, "dataset = \"two.json\"\n").unwrap();

    pstmargin(tmp.path())
        .args(["--config", config.to_str().unwrap(), "optimize"])
        .assert()
        .success()
        .stdout(predicate::str::contains("two-line"))
        .stdout(predicate::str::contains("Objective min margin: 40.000 MW"));
}

#[cfg(not(feature = "solver-highs"))]
#[test]
fn test_unavailable_solver_fails() {
    let tmp = tempdir().unwrap();
    pstmargin(tmp.path())
        .args(["optimize", "--solver", "highs"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not available"));
}

#[test]
fn test_unknown_solver_rejected_by_parser() {
    let tmp = tempdir().unwrap();
    pstmargin(tmp.path())
        .args(["optimize", "--solver", "gurobi"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown MILP backend"));
}
