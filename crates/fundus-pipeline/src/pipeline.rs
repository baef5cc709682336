//! The per-image vessel extraction chain.
//!
//! [`run`] sequences the stage functions over one decoded image and
//! returns every intermediate in a [`StageResult`]. It never branches on
//! image content and has no side effects beyond `debug` logging; saving
//! the stages is up to the caller.
//!
//! The chain is written once, in [`execute`], which also times each stage
//! and records its metrics. [`run`] drives it with [`NoClock`] and
//! discards the diagnostics;
//! [`run_with_diagnostics`](crate::diagnostics::run_with_diagnostics)
//! passes a real clock through.

use image::DynamicImage;
use log::debug;

use crate::diagnostics::{
    Clock, NoClock, PipelineDiagnostics, PipelineSummary, StageDiagnostics, StageMetrics,
};
use crate::mask::count_foreground;
use crate::types::{PipelineError, PipelineParameters, StageResult};

/// Run the full extraction pipeline on one image.
///
/// # Pipeline steps
///
/// 1. Split into red, green and blue planes
/// 2. Field-of-view mask from the green plane (diagnostic only)
/// 3. Gaussian smoothing of the green plane
/// 4. Black-hat vessel enhancement of the smoothed plane
/// 5. Otsu binarization of the black-hat response
/// 6. Erosion + dilation of the binary map
///
/// The result holds eight entries in the order Red, Green, Blue, Mask,
/// Blurred, Enhanced, Thresholded, Reconstructed. The last one is the
/// segmentation output.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidImageShape`] if `image` does not have
/// exactly three channels.
pub fn run(
    image: &DynamicImage,
    parameters: &PipelineParameters,
) -> Result<StageResult, PipelineError> {
    execute(image, parameters, &NoClock).map(|(stages, _)| stages)
}

/// Run the six steps, timing each one with `clock`.
pub(crate) fn execute<C: Clock>(
    image: &DynamicImage,
    parameters: &PipelineParameters,
    clock: &C,
) -> Result<(StageResult, PipelineDiagnostics), PipelineError> {
    let start = clock.now();

    // 1. Channel extraction.
    let t = clock.now();
    let [red, green, blue] = crate::channels::split_channels(image)?;
    let extract = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Extract {
            width: green.width(),
            height: green.height(),
            source_channels: image.color().channel_count(),
        },
    };
    debug!("split {}x{} image into channels", green.width(), green.height());

    // 2. Field-of-view mask.
    let t = clock.now();
    let mask = crate::mask::field_of_view(&green, parameters.mask_threshold());
    let mask_duration = clock.elapsed(&t);
    let field_of_view_pixel_count = count_foreground(&mask);
    let mask_diag = StageDiagnostics {
        duration: mask_duration,
        metrics: StageMetrics::Mask {
            threshold: parameters.mask_threshold(),
            foreground_pixel_count: field_of_view_pixel_count,
        },
    };
    debug!(
        "field-of-view mask: threshold={} foreground={field_of_view_pixel_count}",
        parameters.mask_threshold(),
    );

    // 3. Gaussian smoothing.
    let t = clock.now();
    let blurred = crate::blur::gaussian_smooth(
        &green,
        parameters.smoothing_kernel_size(),
        parameters.smoothing_sigma(),
    );
    let blur = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Blur {
            kernel_size: parameters.smoothing_kernel_size(),
            sigma: parameters.smoothing_sigma(),
        },
    };
    debug!(
        "smoothed green plane: kernel={} sigma={}",
        parameters.smoothing_kernel_size(),
        parameters.smoothing_sigma(),
    );

    // 4. Black-hat enhancement.
    let t = clock.now();
    let enhanced = crate::enhance::black_hat(&blurred, parameters.enhancer_kernel_size());
    let enhance_duration = clock.elapsed(&t);
    let max_response = enhanced.pixels().map(|p| p.0[0]).max().unwrap_or(0);
    let enhance = StageDiagnostics {
        duration: enhance_duration,
        metrics: StageMetrics::Enhance {
            kernel_size: parameters.enhancer_kernel_size(),
            max_response,
        },
    };
    debug!(
        "black-hat response: kernel={} max={max_response}",
        parameters.enhancer_kernel_size(),
    );

    // 5. Otsu binarization.
    let t = clock.now();
    let (thresholded, level) = crate::threshold::otsu_binarize(&enhanced);
    let threshold_duration = clock.elapsed(&t);
    let foreground_before = count_foreground(&thresholded);
    let threshold = StageDiagnostics {
        duration: threshold_duration,
        metrics: StageMetrics::Threshold {
            level,
            foreground_pixel_count: foreground_before,
        },
    };
    debug!("otsu level={level}");

    // 6. Erosion + dilation.
    let t = clock.now();
    let reconstructed = crate::refine::erode_dilate(&thresholded);
    let refine_duration = clock.elapsed(&t);
    let foreground_after = count_foreground(&reconstructed);
    let refine = StageDiagnostics {
        duration: refine_duration,
        metrics: StageMetrics::Refine {
            foreground_before,
            foreground_after,
        },
    };
    debug!("refined vessel map: foreground {foreground_before} -> {foreground_after}");

    let total_duration = clock.elapsed(&start);
    let summary = PipelineSummary {
        image_width: green.width(),
        image_height: green.height(),
        pixel_count: u64::from(green.width()) * u64::from(green.height()),
        field_of_view_pixel_count,
        vessel_pixel_count: foreground_after,
    };

    let stages = StageResult::new([
        red,
        green,
        blue,
        mask,
        blurred,
        enhanced,
        thresholded,
        reconstructed,
    ]);
    let diagnostics = PipelineDiagnostics {
        extract,
        mask: mask_diag,
        blur,
        enhance,
        threshold,
        refine,
        total_duration,
        summary,
    };
    Ok((stages, diagnostics))
}
