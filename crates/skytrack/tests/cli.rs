#![cfg(feature = "cli")]

use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use skytrack::core::{GrayImage, PixelRect};
use skytrack::{RunReport, TrackerConfig, TrackerParams};

fn write_sequence(dir: &Path) {
    fs::create_dir_all(dir).unwrap();
    for i in 0..4 {
        let mut img = GrayImage::new(320, 240);
        if i != 2 {
            img.fill_rect(PixelRect::new(40 + 5 * i, 80, 80, 80), 255);
        }
        img.view()
            .to_luma()
            .save(dir.join(format!("frame_{i:03}.png")))
            .unwrap();
    }
    fs::write(dir.join("frame_004.png"), b"garbage").unwrap();
}

#[test]
fn init_config_writes_loadable_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cfg.json");
    Command::cargo_bin("skytrack")
        .unwrap()
        .arg("init-config")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote"));
    assert_eq!(
        TrackerConfig::load_json(&path).unwrap(),
        TrackerConfig::default()
    );
}

#[test]
fn track_writes_frames_time_log_and_report() {
    let dir = tempfile::tempdir().unwrap();
    let frames = dir.path().join("frames");
    let out = dir.path().join("out");
    write_sequence(&frames);

    let cfg = TrackerConfig {
        frames_dir: "unused".to_string(),
        output_dir: None,
        time_log: Some(dir.path().join("time.txt").display().to_string()),
        report_path: Some(dir.path().join("report.json").display().to_string()),
        tracker: TrackerParams {
            search_radius: 60,
            ..TrackerParams::default()
        },
        ..TrackerConfig::default()
    };
    let cfg_path = dir.path().join("cfg.json");
    cfg.write_json(&cfg_path).unwrap();

    Command::cargo_bin("skytrack")
        .unwrap()
        .arg("track")
        .arg("--config")
        .arg(&cfg_path)
        .arg("--frames")
        .arg(&frames)
        .arg("--output")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("detected: 3"))
        .stdout(predicate::str::contains("skipped: 1"));

    for i in 0..4 {
        assert!(out.join(format!("frame_{i:03}_track.png")).is_file());
    }
    assert!(!out.join("frame_004_track.png").exists());

    let log = fs::read_to_string(dir.path().join("time.txt")).unwrap();
    assert_eq!(log.lines().count(), 4);
    assert!(log.starts_with("frame_000.png, "));

    let report = RunReport::load_json(dir.path().join("report.json")).unwrap();
    assert_eq!(report.detector, "contour");
    assert_eq!(report.frames.len(), 4);
    assert_eq!(report.summary.predicted, 1);
    assert!(!report.frames[2].record.outcome.is_detected());
}

#[test]
fn missing_template_fails_before_tracking() {
    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("cfg.json");
    fs::write(
        &cfg_path,
        r#"{"frames_dir": "frames", "detector": {"kind": "template", "template_path": "nope.png"}}"#,
    )
    .unwrap();

    Command::cargo_bin("skytrack")
        .unwrap()
        .arg("track")
        .arg("--config")
        .arg(&cfg_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("nope.png"));
}
