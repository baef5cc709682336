//! Integration test: process a small directory of synthetic fundus images
//! end to end and check the written output tree.

#![allow(clippy::unwrap_used)]

use std::path::Path;

use fundus_io::raster::{save_gray, save_rgb};
use fundus_io::{IoError, OutputLayout, process_dataset, process_dataset_with};
use fundus_pipeline::{DynamicImage, GrayImage, PipelineParameters, RgbImage, StageLabel};

/// Dark disc on black with a darker vertical vessel through the centre.
fn synthetic_fundus(size: u32) -> RgbImage {
    let c = size / 2;
    RgbImage::from_fn(size, size, |x, y| {
        let dx = x.abs_diff(c);
        let dy = y.abs_diff(c);
        if dx * dx + dy * dy > (c - 2) * (c - 2) {
            image::Rgb([0, 0, 0])
        } else if dx == 0 {
            image::Rgb([120, 40, 20])
        } else {
            image::Rgb([200, 110, 60])
        }
    })
}

fn populate(input: &Path) {
    save_rgb(&input.join("01_test.png"), &synthetic_fundus(48)).unwrap();
    save_rgb(&input.join("02_test.png"), &synthetic_fundus(40)).unwrap();
    std::fs::write(input.join("03_corrupt.tif"), b"not a tiff").unwrap();
    save_gray(&input.join("04_gray.png"), &GrayImage::new(16, 16)).unwrap();
    let rgba = DynamicImage::ImageRgb8(synthetic_fundus(32)).to_rgba8();
    DynamicImage::ImageRgba8(rgba)
        .save(input.join("05_rgba.png"))
        .unwrap();
    std::fs::write(input.join("readme.txt"), b"ignored").unwrap();
}

#[test]
fn dataset_outputs_every_stage_and_composite() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    populate(input.path());

    let summary =
        process_dataset(input.path(), output.path(), &PipelineParameters::standard()).unwrap();

    assert_eq!(summary.processed, 4);
    assert_eq!(summary.total(), 5);
    assert!(!summary.is_success());

    let layout = OutputLayout::new(output.path());
    for stem in ["01_test", "02_test", "04_gray", "05_rgba"] {
        for stage in StageLabel::ALL {
            let path = layout.stage_path(stage, stem);
            assert!(path.is_file(), "missing {}", path.display());
        }
        let sheet = image::open(layout.composite_path(stem)).unwrap();
        assert_eq!((sheet.width(), sheet.height()), (800, 460));
    }

    let reconstructed = image::open(layout.stage_path(StageLabel::Reconstructed, "01_test"))
        .unwrap()
        .to_luma8();
    assert_eq!(reconstructed.dimensions(), (48, 48));
    assert!(reconstructed.pixels().all(|p| p.0[0] == 0 || p.0[0] == 255));

    // Alpha is dropped; the colour planes come through unchanged.
    let green = image::open(layout.stage_path(StageLabel::Green, "05_rgba"))
        .unwrap()
        .to_luma8();
    assert_eq!(green.get_pixel(12, 16).0[0], 110);
    assert_eq!(green.get_pixel(16, 16).0[0], 40);
}

#[test]
fn failures_are_isolated_and_recorded_in_order() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    populate(input.path());

    let summary =
        process_dataset(input.path(), output.path(), &PipelineParameters::standard()).unwrap();

    let failed: Vec<String> = summary
        .failures
        .iter()
        .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(failed, ["03_corrupt.tif"]);
    assert!(matches!(summary.failures[0].error, IoError::Decode { .. }));

    let layout = OutputLayout::new(output.path());
    assert!(!layout.composite_path("03_corrupt").exists());
    assert!(layout.composite_path("04_gray").is_file());
}

#[test]
fn custom_runner_sees_each_file_once() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    populate(input.path());

    let mut seen = Vec::new();
    let params = PipelineParameters::high_resolution();
    let summary = process_dataset_with(input.path(), output.path(), |path, image| {
        seen.push(path.to_path_buf());
        fundus_pipeline::run(image, &params)
    })
    .unwrap();

    // The corrupt file never reaches the runner.
    assert_eq!(seen.len(), 4);
    assert_eq!(summary.processed, 4);
}

#[test]
fn missing_input_directory_aborts() {
    let output = tempfile::tempdir().unwrap();
    let missing = output.path().join("nowhere");
    let err = process_dataset(&missing, output.path(), &PipelineParameters::standard())
        .unwrap_err();
    assert!(matches!(err, IoError::ReadDir { .. }));
}

#[test]
fn empty_directory_processes_nothing() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    let summary =
        process_dataset(input.path(), output.path(), &PipelineParameters::standard()).unwrap();
    assert_eq!(summary.total(), 0);
    assert!(summary.is_success());
    assert!(OutputLayout::new(output.path()).composite_dir().is_dir());
}
