//! Sequential batch processing of a directory of fundus images.
//!
//! Each file is decoded, run through the pipeline, and its eight stages
//! plus the composite sheet are written under an [`OutputLayout`]. A
//! file that fails is logged and recorded in the [`BatchSummary`]; the
//! batch moves on to the next one.

use std::path::{Path, PathBuf};

use fundus_pipeline::{DynamicImage, PipelineError, PipelineParameters, StageResult};
use log::{info, warn};

use crate::dataset::{file_stem, list_images};
use crate::layout::OutputLayout;
use crate::raster::{load_image, save_gray, save_rgb};
use crate::IoError;

/// A file the batch could not process.
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: IoError,
}

/// Outcome of processing one directory.
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Files whose stages and composite were all written.
    pub processed: usize,
    /// Files that were skipped, in processing order.
    pub failures: Vec<FileFailure>,
}

impl BatchSummary {
    /// Number of files attempted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.processed + self.failures.len()
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Fold another directory's outcome into this one.
    pub fn merge(&mut self, other: Self) {
        self.processed += other.processed;
        self.failures.extend(other.failures);
    }
}

/// Write every stage of `stages` as `<stage dir>/<stem>.png`.
///
/// # Errors
///
/// Returns [`IoError::Encode`] for the first stage that cannot be written.
pub fn save_stages(
    layout: &OutputLayout,
    stem: &str,
    stages: &StageResult,
) -> Result<(), IoError> {
    for (stage, plane) in stages.iter() {
        save_gray(&layout.stage_path(stage, stem), plane)?;
    }
    Ok(())
}

/// Decode, process and persist one image with the standard pipeline.
///
/// Expects the layout's directories to exist (see
/// [`OutputLayout::prepare`]).
///
/// # Errors
///
/// Returns [`IoError::Decode`] if the file is unreadable,
/// [`IoError::Pipeline`] if the image is rejected, or
/// [`IoError::Encode`] if an output cannot be written.
pub fn process_file(
    path: &Path,
    layout: &OutputLayout,
    parameters: &PipelineParameters,
) -> Result<StageResult, IoError> {
    process_file_with(path, layout, |image| fundus_pipeline::run(image, parameters))
}

/// Like [`process_file`], with a caller-supplied pipeline invocation.
///
/// # Errors
///
/// See [`process_file`].
pub fn process_file_with<F>(
    path: &Path,
    layout: &OutputLayout,
    run: F,
) -> Result<StageResult, IoError>
where
    F: FnOnce(&DynamicImage) -> Result<StageResult, PipelineError>,
{
    let image = load_image(path)?;
    let stages = run(&image)?;
    let stem = file_stem(path);

    save_stages(layout, &stem, &stages)?;
    save_rgb(&layout.composite_path(&stem), &fundus_pipeline::compose(&stages))?;
    Ok(stages)
}

/// Process every supported image in `input`, writing results under
/// `output`.
///
/// # Errors
///
/// Returns [`IoError::ReadDir`] if `input` cannot be listed, or
/// [`IoError::CreateDir`] if the output tree cannot be created. Per-file
/// failures do not abort the batch; they are collected in the summary.
pub fn process_dataset(
    input: &Path,
    output: &Path,
    parameters: &PipelineParameters,
) -> Result<BatchSummary, IoError> {
    process_dataset_with(input, output, |_, image| fundus_pipeline::run(image, parameters))
}

/// Like [`process_dataset`], with a caller-supplied pipeline invocation
/// that also receives the file being processed.
///
/// # Errors
///
/// See [`process_dataset`].
pub fn process_dataset_with<F>(
    input: &Path,
    output: &Path,
    mut run: F,
) -> Result<BatchSummary, IoError>
where
    F: FnMut(&Path, &DynamicImage) -> Result<StageResult, PipelineError>,
{
    let images = list_images(input)?;
    let layout = OutputLayout::new(output);
    layout.prepare()?;

    info!(
        "processing {} image(s) from {} into {}",
        images.len(),
        input.display(),
        output.display(),
    );

    let mut summary = BatchSummary::default();
    for (i, path) in images.iter().enumerate() {
        let name = path
            .file_name()
            .map_or_else(String::new, |n| n.to_string_lossy().into_owned());
        info!("[{}/{}] {name}", i + 1, images.len());

        match process_file_with(path, &layout, |image| run(path, image)) {
            Ok(_) => summary.processed += 1,
            Err(error) => {
                warn!("skipping {name}: {error}");
                summary.failures.push(FileFailure {
                    path: path.clone(),
                    error,
                });
            }
        }
    }

    info!(
        "finished {}: {} processed, {} failed",
        input.display(),
        summary.processed,
        summary.failures.len(),
    );
    Ok(summary)
}
