use serde_json::{Value, json};
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

fn binary() -> Command {
    Command::new(env!("CARGO_BIN_EXE_steinhardt-rs"))
}

/// Periodic simple-cubic lattice with unit spacing.
fn simple_cubic_snapshot(cells: usize) -> Value {
    let mut positions = Vec::new();
    for x in 0..cells {
        for y in 0..cells {
            for z in 0..cells {
                positions.push([x as f64, y as f64, z as f64]);
            }
        }
    }
    let length = cells as f64;
    json!({ "box": [length, length, length], "positions": positions })
}

fn run_compute(snapshot: &Value, temp: &TempDir, extra_args: &[&str]) -> Value {
    let input = temp.path().join("snapshot.json");
    let output = temp.path().join("report.json");
    fs::write(&input, snapshot.to_string()).expect("snapshot should be written");

    let status = binary()
        .arg("compute")
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(&output)
        .args(extra_args)
        .status()
        .expect("binary should run");
    assert!(status.success(), "compute should exit zero");

    read_report(&output)
}

fn read_report(path: &Path) -> Value {
    let source = fs::read_to_string(path).expect("report should exist");
    serde_json::from_str(&source).expect("report should be valid JSON")
}

fn scalar_array(report: &Value, key: &str) -> Vec<f64> {
    report[key]
        .as_array()
        .unwrap_or_else(|| panic!("report should carry '{key}'"))
        .iter()
        .map(|value| value.as_f64().expect("array entries should be numbers"))
        .collect()
}

#[test]
fn periodic_simple_cubic_lattice_matches_reference_q6() {
    let temp = TempDir::new().expect("tempdir should be created");
    let report = run_compute(
        &simple_cubic_snapshot(4),
        &temp,
        &["--r-max", "1.1", "--l", "6"],
    );

    assert_eq!(report["num_particles"], 64);
    // Six neighbors per site, each bond counted from both ends.
    assert_eq!(report["num_bonds"], 64 * 6);

    let ql = scalar_array(&report, "ql");
    assert_eq!(ql.len(), 64);
    for value in &ql {
        assert!(
            (value - 0.35355).abs() < 1.0e-4,
            "every site of a perfect SC lattice has the reference Q6, got {value}"
        );
    }

    // Identical environments: the system norm equals the per-particle value.
    let norm = report["system_norm"].as_f64().unwrap();
    assert!((norm - ql[0]).abs() < 1.0e-9);
}

#[test]
fn degree_four_run_matches_reference_q4() {
    let temp = TempDir::new().expect("tempdir should be created");
    let report = run_compute(
        &simple_cubic_snapshot(3),
        &temp,
        &["--r-max", "1.1", "--l", "4"],
    );

    for value in scalar_array(&report, "ql") {
        assert!((value - 0.76376).abs() < 1.0e-4);
    }
}

#[test]
fn averaging_reproduces_ql_on_a_perfect_crystal() {
    let temp = TempDir::new().expect("tempdir should be created");
    let report = run_compute(
        &simple_cubic_snapshot(3),
        &temp,
        &["--r-max", "1.1", "--l", "6", "--average", "--wl", "--normalize"],
    );

    let ql = scalar_array(&report, "ql");
    let ql_ave = scalar_array(&report, "ql_ave");
    for (direct, averaged) in ql.iter().zip(&ql_ave) {
        assert!(
            (direct - averaged).abs() < 1.0e-9,
            "identical environments make second-shell averaging a no-op"
        );
    }

    let wl = scalar_array(&report, "wl");
    assert_eq!(wl.len(), 27);
    for value in &wl {
        assert!((value - wl[0]).abs() < 1.0e-10);
        assert!(value.abs() > 0.0);
    }

    let normalized = scalar_array(&report, "normalized_ql");
    for value in normalized {
        assert!((value - 1.0).abs() < 1.0e-9);
    }
}

#[test]
fn reports_omit_unconfigured_result_arrays() {
    let temp = TempDir::new().expect("tempdir should be created");
    let report = run_compute(&simple_cubic_snapshot(2), &temp, &["--r-max", "1.1"]);

    assert!(report.get("ql_ave").is_none());
    assert!(report.get("wl").is_none());
    assert!(report.get("normalized_ql").is_none());
}

#[test]
fn invalid_degree_fails_with_a_descriptive_error() {
    let temp = TempDir::new().expect("tempdir should be created");
    let input = temp.path().join("snapshot.json");
    fs::write(&input, simple_cubic_snapshot(2).to_string()).unwrap();

    let output = binary()
        .arg("compute")
        .arg("--input")
        .arg(&input)
        .arg("--output")
        .arg(temp.path().join("report.json"))
        .args(["--r-max", "1.1", "--l", "1"])
        .output()
        .expect("binary should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("degree must be 2 or greater"),
        "stderr should explain the configuration failure: {stderr}"
    );
    assert!(!temp.path().join("report.json").exists());
}

#[test]
fn missing_snapshot_fails_with_the_offending_path() {
    let temp = TempDir::new().expect("tempdir should be created");
    let output = binary()
        .arg("compute")
        .arg("--input")
        .arg(temp.path().join("absent.json"))
        .arg("--output")
        .arg(temp.path().join("report.json"))
        .args(["--r-max", "1.1"])
        .output()
        .expect("binary should run");

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("absent.json"), "stderr was: {stderr}");
}

#[test]
fn missing_required_cutoff_is_a_usage_error() {
    let temp = TempDir::new().expect("tempdir should be created");
    let output = binary()
        .arg("compute")
        .arg("--input")
        .arg(temp.path().join("snapshot.json"))
        .arg("--output")
        .arg(temp.path().join("report.json"))
        .output()
        .expect("binary should run");

    assert_eq!(output.status.code(), Some(2));
}
