// Unless explicitly stated otherwise all files in this repository are licensed
// under the Apache License Version 2.0.
// This product includes software developed at Datadog (https://www.datadoghq.com/).
// Copyright 2026-present Datadog, Inc.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::indexing_slicing)]

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, SystemTime};

use heatmap::{EngineConfig, Error, GRID_SIZE, HeatmapEngine, Matrix, RiskLevel};
use serde_json::Value;
use tempfile::TempDir;

const HEATMAP_BIN: &str = env!("CARGO_BIN_EXE_heatmap");

/// Frame 0: a 5x3 block at 30 plus a lone 90 spike (Medium).
/// Frame 1: ten contiguous cells at 50 along row 10 (High).
fn recording_lines() -> Vec<String> {
    let mut lines = Vec::with_capacity(2 * GRID_SIZE);
    for frame in 0..2 {
        for row in 0..GRID_SIZE {
            let fields: Vec<&str> = (0..GRID_SIZE)
                .map(|col| match (frame, row, col) {
                    (0, 2..=6, 3..=5) => "30",
                    (0, 20, 20) => "90",
                    (1, 10, 0..=9) => "50",
                    _ => "0",
                })
                .collect();
            lines.push(fields.join(","));
        }
    }
    lines
}

fn write_recording(dir: &TempDir, lines: &[String]) -> PathBuf {
    let path = dir.path().join("2026-01-15.csv");
    std::fs::write(&path, lines.join("\n")).unwrap();
    path
}

fn set_mtime(path: &Path, secs: u64) {
    File::options()
        .write(true)
        .open(path)
        .unwrap()
        .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
        .unwrap();
}

fn heatmap_command(dir: &TempDir) -> Command {
    // Point at a missing config so the system file is never picked up.
    let mut command = Command::new(HEATMAP_BIN);
    command
        .arg("--config")
        .arg(dir.path().join("absent.yaml"))
        .env_remove("TRACECARE_LOG_LEVEL");
    command
}

fn run_heatmap(dir: &TempDir, args: &[&str]) -> Value {
    let output = heatmap_command(dir)
        .args(["--log-level", "error"])
        .args(args)
        .output()
        .expect("Failed to execute heatmap");

    assert!(
        output.status.success(),
        "heatmap {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn test_metrics_from_real_file() {
    let dir = TempDir::new().unwrap();
    let path = write_recording(&dir, &recording_lines());
    let engine = HeatmapEngine::from_config(&EngineConfig::default());

    assert_eq!(engine.total_frames(&path).unwrap(), 2);

    let first = engine.frame_metrics(&path, 0).unwrap();
    assert_eq!(first.peak_pressure, 90.0);
    assert_eq!(first.peak_pressure_index, 30.0);
    assert_eq!(first.contact_area_percent, 1.5625);
    assert_eq!(first.risk_level, RiskLevel::Medium);

    let second = engine.frame_metrics(&path, 1).unwrap();
    assert_eq!(second.peak_pressure, 50.0);
    assert_eq!(second.peak_pressure_index, 50.0);
    assert_eq!(second.contact_area_percent, 0.9765625);
    assert_eq!(second.risk_level, RiskLevel::High);

    assert_eq!(engine.peak_history(&path, 10).unwrap(), vec![30.0, 50.0]);
}

#[test]
fn test_indices_are_clamped() {
    let dir = TempDir::new().unwrap();
    let path = write_recording(&dir, &recording_lines());
    let engine = HeatmapEngine::from_config(&EngineConfig::default());

    let first: Matrix = engine.load_frame(&path, -5).unwrap();
    assert_eq!(first.get(20, 20), Some(90.0));
    let last = engine.load_frame(&path, 2 + 100).unwrap();
    assert_eq!(last.get(10, 9), Some(50.0));
    assert_eq!(last.get(10, 10), Some(0.0));
}

#[test]
fn test_max_risk() {
    let dir = TempDir::new().unwrap();
    let path = write_recording(&dir, &recording_lines());
    let engine = HeatmapEngine::from_config(&EngineConfig::default());

    let max = engine.max_risk_up_to_frame(&path, 0).unwrap();
    assert_eq!((max.risk_level, max.frame_index), (RiskLevel::Medium, 0));

    let max = engine.max_risk_up_to_frame(&path, 1).unwrap();
    assert_eq!((max.risk_level, max.frame_index), (RiskLevel::High, 1));
    assert_eq!(max.metrics.peak_pressure_index, 50.0);
}

#[test]
fn test_cache_follows_modification_time() {
    let dir = TempDir::new().unwrap();
    let lines = recording_lines();
    let path = write_recording(&dir, &lines);
    set_mtime(&path, 1_000);
    let engine = HeatmapEngine::from_config(&EngineConfig::default());

    assert_eq!(engine.total_frames(&path).unwrap(), 2);
    assert_eq!(engine.total_frames(&path).unwrap(), 2);
    let stats = engine.cache().stats();
    assert_eq!((stats.loads, stats.hits), (1, 1));

    // Drop the second frame and bump the timestamp.
    write_recording(&dir, &lines[..GRID_SIZE]);
    set_mtime(&path, 2_000);
    assert_eq!(engine.total_frames(&path).unwrap(), 1);
    assert_eq!(engine.cache().stats().loads, 2);
    assert_eq!(engine.cache().len(), 1);
}

#[test]
fn test_truncated_recording() {
    let dir = TempDir::new().unwrap();
    let path = write_recording(&dir, &recording_lines()[..GRID_SIZE - 1]);
    let engine = HeatmapEngine::from_config(&EngineConfig::default());

    assert_eq!(engine.total_frames(&path).unwrap(), 0);
    assert!(matches!(
        engine.snapshot(&path, 0, 60),
        Err(Error::NoFrames { .. })
    ));
}

#[test]
fn test_cli_frames_and_metrics() {
    let dir = TempDir::new().unwrap();
    let path = write_recording(&dir, &recording_lines());
    let file = path.to_str().unwrap();

    assert_eq!(run_heatmap(&dir, &["frames", file]), 2);

    let metrics = run_heatmap(&dir, &["metrics", file, "--index", "-1"]);
    assert_eq!(metrics["peak_pressure_index"], 30.0);
    assert_eq!(metrics["risk_level"], "Medium");
}

#[test]
fn test_cli_frame_rows() {
    let dir = TempDir::new().unwrap();
    let path = write_recording(&dir, &recording_lines());
    let file = path.to_str().unwrap();

    let frame = run_heatmap(&dir, &["frame", file, "--index", "-1"]);
    let rows = frame.as_array().unwrap();
    assert_eq!(rows.len(), GRID_SIZE);
    assert_eq!(rows[0].as_array().unwrap().len(), GRID_SIZE);
    assert_eq!(rows[2][3], 30.0);
    assert_eq!(rows[20][20], 90.0);
    assert_eq!(rows[1][3], 0.0);
}

#[test]
fn test_cli_history_and_max_risk() {
    let dir = TempDir::new().unwrap();
    let path = write_recording(&dir, &recording_lines());
    let file = path.to_str().unwrap();

    assert_eq!(
        run_heatmap(&dir, &["history", file]),
        serde_json::json!([30.0, 50.0])
    );
    assert_eq!(
        run_heatmap(&dir, &["history", file, "--max-frames", "1"]),
        serde_json::json!([30.0])
    );

    let max = run_heatmap(&dir, &["max-risk", file, "--index", "5"]);
    assert_eq!(max["risk_level"], "High");
    assert_eq!(max["frame_index"], 1);
    assert_eq!(max["metrics"]["peak_pressure_index"], 50.0);
}

#[test]
fn test_cli_snapshot_follows_window() {
    let dir = TempDir::new().unwrap();
    let path = write_recording(&dir, &recording_lines());
    let config = dir.path().join("heatmap.yaml");
    std::fs::write(&config, "frames_per_minute: 1\n").unwrap();
    let file = path.to_str().unwrap();

    let output = Command::new(HEATMAP_BIN)
        .arg("--config")
        .arg(&config)
        .args(["--log-level", "error", "snapshot", file, "--index", "9"])
        .args(["--range-minutes", "1"])
        .output()
        .expect("Failed to execute heatmap");
    assert!(output.status.success());

    let snap: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(snap["frame_index"], 0);
    assert_eq!(snap["risk_level"], "Medium");
    assert_eq!(snap["matrix"].as_array().unwrap().len(), GRID_SIZE * GRID_SIZE);
}

#[test]
fn test_cli_unknown_log_level_warns() {
    let dir = TempDir::new().unwrap();
    let path = write_recording(&dir, &recording_lines());

    let output = heatmap_command(&dir)
        .args(["--log-level", "chatty", "frames"])
        .arg(&path)
        .output()
        .expect("Failed to execute heatmap");

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("| WARN |") && stderr.contains("Unknown log level \"chatty\""),
        "unexpected stderr: {stderr}"
    );
    let frames: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(frames, 2);
}

#[test]
fn test_cli_dashboard() {
    let dir = TempDir::new().unwrap();
    let path = write_recording(&dir, &recording_lines());
    let file = path.to_str().unwrap();

    let view = run_heatmap(&dir, &["dashboard", file, "--frame", "99"]);
    assert_eq!(view["frame_index"], 1);
    assert_eq!(view["total_frames"], 2);
    assert_eq!(view["risk_level"], "High");
    assert_eq!(view["risk_frame_index"], 1);
    assert_eq!(view["peak_history"], serde_json::json!([30.0, 50.0]));
    assert_eq!(
        view["frame_warning"],
        "Only 0.0 minutes of data are available for this date."
    );
}

#[test]
fn test_cli_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.csv");

    let output = heatmap_command(&dir)
        .arg("frames")
        .arg(&missing)
        .output()
        .expect("Failed to execute heatmap");

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}
