//! Integration test: drive the `fundus` binary end to end.

#![allow(clippy::unwrap_used)]

use std::path::Path;
use std::process::{Command, Output};

use fundus_io::OutputLayout;
use fundus_io::raster::save_rgb;
use fundus_pipeline::{RgbImage, StageLabel};

fn fundus(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_fundus"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn write_sample(path: &Path) {
    // Light background with one dark vertical vessel.
    let img = RgbImage::from_fn(40, 40, |x, _| {
        let v: u8 = if x == 20 { 70 } else { 190 };
        [v, v / 2, v / 4].into()
    });
    save_rgb(path, &img).unwrap();
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn process_writes_stage_tree() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_sample(&input.path().join("sample.png"));

    let out = fundus(&["process", arg(input.path()), arg(output.path())]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let layout = OutputLayout::new(output.path());
    for stage in StageLabel::ALL {
        assert!(layout.stage_path(stage, "sample").is_file(), "missing {stage}");
    }
    assert!(layout.composite_path("sample").is_file());
}

#[test]
fn process_fails_when_a_file_fails() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_sample(&input.path().join("good.png"));
    std::fs::write(input.path().join("bad.jpg"), b"garbage").unwrap();

    let out = fundus(&["process", arg(input.path()), arg(output.path())]);
    assert!(!out.status.success());
    assert!(OutputLayout::new(output.path()).composite_path("good").is_file());

    let stderr = String::from_utf8_lossy(&out.stderr);
    assert_eq!(
        stderr.matches("cannot decode image").count(),
        1,
        "failure should be reported once:\n{stderr}"
    );
    assert!(stderr.contains("1 of 2 image(s) processed"), "{stderr}");
}

#[test]
fn invalid_parameters_fail_before_processing() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_sample(&input.path().join("sample.png"));

    let out = fundus(&[
        "process",
        arg(input.path()),
        arg(output.path()),
        "--smoothing-kernel",
        "4",
    ]);
    assert!(!out.status.success());
    assert!(!OutputLayout::new(output.path()).composite_dir().exists());
}

#[test]
fn inspect_prints_json_and_writes_composite() {
    let dir = tempfile::tempdir().unwrap();
    let image = dir.path().join("sample.png");
    let sheet = dir.path().join("sheet.png");
    write_sample(&image);

    let out = fundus(&["inspect", arg(&image), "--json", "--composite", arg(&sheet)]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let report: serde_json::Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(report["summary"]["image_width"], 40);
    assert!(sheet.is_file());
}

#[test]
fn datasets_skips_missing_layouts() {
    let root = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let stare = root.path().join("stare-dataset");
    std::fs::create_dir(&stare).unwrap();
    write_sample(&stare.join("im0001.png"));

    let out = fundus(&["datasets", arg(root.path()), arg(output.path())]);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let stare_out = OutputLayout::new(output.path().join("STARE"));
    assert!(stare_out.composite_path("im0001").is_file());
    assert!(!output.path().join("DRIVE").exists());
    assert!(!output.path().join("HRF").exists());
}
