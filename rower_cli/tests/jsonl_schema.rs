//! `--json` mode must emit one well-formed JSON object per line on stdout,
//! with a stable field set per event kind.

use assert_cmd::Command;
use serde_json::Value;
use std::io::Write;

fn workout_csv(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("workout.csv");
    let mut f = std::fs::File::create(&path).unwrap();
    writeln!(f, "dt_s").unwrap();
    for _ in 0..3 {
        for _ in 0..35 {
            writeln!(f, "0.02").unwrap();
        }
        for _ in 0..43 {
            writeln!(f, "0.035").unwrap();
        }
    }
    path
}

#[test]
fn every_stdout_line_is_json_with_an_event_field() {
    let dir = tempfile::tempdir().unwrap();
    let csv = workout_csv(dir.path());
    let cfg = dir.path().join("rower.toml");
    std::fs::write(&cfg, "").unwrap();

    let assert = Command::cargo_bin("rower")
        .unwrap()
        .args([
            "--json",
            "--config",
            cfg.to_str().unwrap(),
            "replay",
            "--input",
        ])
        .arg(&csv)
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let mut strokes = 0;
    let mut summaries = 0;
    for line in stdout.lines().filter(|l| !l.is_empty()) {
        let v: Value = serde_json::from_str(line).unwrap_or_else(|e| {
            panic!("stdout line is not JSON ({e}): {line}");
        });
        match v["event"].as_str() {
            Some("stroke") => {
                strokes += 1;
                assert!(v["n"].as_u64().is_some());
                assert!(v["spm"].as_f64().is_some());
                assert!(v["power_w"].as_f64().is_some());
                assert!(v["distance_m"].as_f64().unwrap() >= 0.0);
                assert!(v["drag_factor"].as_f64().unwrap() > 0.0);
            }
            Some("summary") => {
                summaries += 1;
                assert_eq!(v["strokes"].as_u64(), Some(3));
                assert!(v["distance_m"].as_f64().unwrap() > 0.0);
                assert!(v["total_time_s"].as_f64().unwrap() > 6.0);
                assert!(v["avg_power_w"].as_f64().unwrap() > 0.0);
            }
            other => panic!("unexpected event kind {other:?} in {line}"),
        }
    }
    assert_eq!(strokes, 3);
    assert_eq!(summaries, 1);
}

#[test]
fn errors_in_json_mode_are_structured() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = dir.path().join("rower.toml");
    std::fs::write(&cfg, "[drag]\nbase_drag_factor = -1.0\n").unwrap();
    let csv = workout_csv(dir.path());

    let assert = Command::cargo_bin("rower")
        .unwrap()
        .args([
            "--json",
            "--config",
            cfg.to_str().unwrap(),
            "replay",
            "--input",
        ])
        .arg(&csv)
        .assert()
        .code(2);

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).unwrap();
    let line = stdout.lines().find(|l| !l.is_empty()).expect("an error line");
    let v: Value = serde_json::from_str(line).unwrap();
    assert_eq!(v["event"].as_str(), Some("error"));
    assert_eq!(v["kind"].as_str(), Some("config"));
    assert!(v["message"].as_str().is_some());
}
