//! Pipeline diagnostics: timing and per-stage metrics.
//!
//! [`run_with_diagnostics`] performs the same steps as
//! [`run`](crate::run) and additionally records how long each stage took
//! and a few counts describing its output. Useful for checking that a
//! parameter preset suits a dataset (e.g. the Otsu level or how much of
//! the frame the field-of-view mask covers).
//!
//! Time is read through the [`Clock`] trait so the pipeline crate does
//! not pick a platform clock itself.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use image::DynamicImage;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::types::{PipelineError, PipelineParameters, StageResult};

/// Source of timestamps for stage timing.
pub trait Clock {
    /// Opaque timestamp type.
    type Instant;

    /// Current timestamp.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Clock that never advances; every duration reads as zero.
///
/// Used by [`run`](crate::run), which has no use for timings.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoClock;

impl Clock for NoClock {
    type Instant = ();

    fn now(&self) {}

    fn elapsed(&self, _since: &()) -> Duration {
        Duration::ZERO
    }
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Stage 1: channel extraction.
    pub extract: StageDiagnostics,
    /// Stage 2: field-of-view mask.
    pub mask: StageDiagnostics,
    /// Stage 3: Gaussian smoothing.
    pub blur: StageDiagnostics,
    /// Stage 4: black-hat enhancement.
    pub enhance: StageDiagnostics,
    /// Stage 5: Otsu binarization.
    pub threshold: StageDiagnostics,
    /// Stage 6: erosion + dilation.
    pub refine: StageDiagnostics,
    /// Total wall-clock duration of the run (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts for the run.
    pub summary: PipelineSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Channel extraction metrics.
    Extract {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
        /// Channel count of the source image.
        source_channels: u8,
    },
    /// Field-of-view mask metrics.
    Mask {
        /// Threshold applied to the green plane.
        threshold: u8,
        /// Pixels inside the field of view.
        foreground_pixel_count: u64,
    },
    /// Gaussian smoothing metrics.
    Blur {
        /// Kernel side length.
        kernel_size: u32,
        /// Configured sigma (0 = derived from the kernel size).
        sigma: f32,
    },
    /// Black-hat metrics.
    Enhance {
        /// Structuring-element diameter.
        kernel_size: u32,
        /// Strongest response in the output.
        max_response: u8,
    },
    /// Otsu binarization metrics.
    Threshold {
        /// Level chosen by Otsu's method.
        level: u8,
        /// Pixels classified as vessel.
        foreground_pixel_count: u64,
    },
    /// Erosion + dilation metrics.
    Refine {
        /// Vessel pixels before refinement.
        foreground_before: u64,
        /// Vessel pixels after refinement.
        foreground_after: u64,
    },
}

/// High-level summary for the whole run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Source image width in pixels.
    pub image_width: u32,
    /// Source image height in pixels.
    pub image_height: u32,
    /// Total pixel count.
    pub pixel_count: u64,
    /// Pixels inside the field-of-view mask.
    pub field_of_view_pixel_count: u64,
    /// Vessel pixels in the final segmentation.
    pub vessel_pixel_count: u64,
}

/// Run the pipeline, timing each stage with `clock`.
///
/// The returned [`StageResult`] is identical to what [`run`](crate::run)
/// produces for the same inputs.
///
/// # Errors
///
/// Same as [`run`](crate::run).
pub fn run_with_diagnostics<C: Clock>(
    image: &DynamicImage,
    parameters: &PipelineParameters,
    clock: &C,
) -> Result<(StageResult, PipelineDiagnostics), PipelineError> {
    let (stages, diagnostics) = crate::pipeline::execute(image, parameters, clock)?;
    debug!(
        "pipeline finished in {:.3}ms, {} vessel pixels",
        duration_ms(diagnostics.total_duration),
        diagnostics.summary.vessel_pixel_count,
    );
    Ok((stages, diagnostics))
}

impl PipelineDiagnostics {
    /// Per-stage diagnostics paired with display names, in pipeline order.
    #[must_use]
    pub fn stages(&self) -> [(&'static str, &StageDiagnostics); 6] {
        [
            ("Extract", &self.extract),
            ("Mask", &self.mask),
            ("Blur", &self.blur),
            ("Enhance", &self.enhance),
            ("Threshold", &self.threshold),
            ("Refine", &self.refine),
        ]
    }

    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{} ({} pixels)",
            self.summary.image_width, self.summary.image_height, self.summary.pixel_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<12} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(72));

        let total_ms = duration_ms(self.total_duration);
        for (name, diag) in self.stages() {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<12} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Field of view: {} px  |  Vessels: {} px ({:.1}% of field of view)",
            self.summary.field_of_view_pixel_count,
            self.summary.vessel_pixel_count,
            percent(
                self.summary.vessel_pixel_count,
                self.summary.field_of_view_pixel_count
            ),
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// `part / whole` as a percentage, 0 when `whole` is 0.
#[allow(clippy::cast_precision_loss)]
fn percent(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Extract {
            width,
            height,
            source_channels,
        } => format!("{width}x{height}, {source_channels} channels"),
        StageMetrics::Mask {
            threshold,
            foreground_pixel_count,
        } => format!("threshold={threshold} inside={foreground_pixel_count}"),
        StageMetrics::Blur { kernel_size, sigma } => {
            format!("kernel={kernel_size} sigma={sigma:.2}")
        }
        StageMetrics::Enhance {
            kernel_size,
            max_response,
        } => format!("kernel={kernel_size} max={max_response}"),
        StageMetrics::Threshold {
            level,
            foreground_pixel_count,
        } => format!("level={level} vessels={foreground_pixel_count}"),
        StageMetrics::Refine {
            foreground_before,
            foreground_after,
        } => format!("vessels {foreground_before}->{foreground_after}"),
    }
}
