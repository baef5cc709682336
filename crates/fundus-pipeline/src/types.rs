//! Shared types for the fundus vessel extraction pipeline.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Re-export `GrayImage` so downstream crates can reference
/// single-plane stage outputs without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbImage` so downstream crates can reference the
/// composite visualization without depending on `image` directly.
pub use image::RgbImage;

/// Re-export `DynamicImage`, the decoded source image accepted by
/// [`run`](crate::run).
pub use image::DynamicImage;

/// Largest supported structuring-element diameter for the vessel enhancer.
///
/// The element is stored as an offset mask whose extent must stay below
/// 512 pixels in each direction.
pub const MAX_ENHANCER_KERNEL_SIZE: u32 = 511;

/// Configuration for one processing run.
///
/// Values are validated once, at construction, and cannot be mutated
/// afterwards. Every image in a run sees the same parameters; datasets
/// that need different settings get their own instance.
///
/// Deserialization goes through [`PipelineParameters::new`], so a JSON
/// document with an even kernel size is rejected the same way a direct
/// constructor call is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawParameters", into = "RawParameters")]
pub struct PipelineParameters {
    smoothing_kernel_size: u32,
    smoothing_sigma: f32,
    enhancer_kernel_size: u32,
    mask_threshold: u8,
}

impl PipelineParameters {
    /// Gaussian kernel size for the standard (DRIVE/STARE) preset.
    pub const DEFAULT_SMOOTHING_KERNEL_SIZE: u32 = 5;
    /// Gaussian sigma for the standard preset (0 derives it from the kernel size).
    pub const DEFAULT_SMOOTHING_SIGMA: f32 = 0.0;
    /// Black-hat structuring-element diameter for the standard preset.
    pub const DEFAULT_ENHANCER_KERNEL_SIZE: u32 = 15;
    /// Field-of-view mask threshold for the standard preset.
    pub const DEFAULT_MASK_THRESHOLD: u8 = 10;

    /// Create a validated parameter set.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidParameter`] if:
    /// - `smoothing_kernel_size` is zero or even,
    /// - `smoothing_sigma` is negative or not finite,
    /// - `enhancer_kernel_size` is zero or larger than
    ///   [`MAX_ENHANCER_KERNEL_SIZE`].
    pub fn new(
        smoothing_kernel_size: u32,
        smoothing_sigma: f32,
        enhancer_kernel_size: u32,
        mask_threshold: u8,
    ) -> Result<Self, PipelineError> {
        if smoothing_kernel_size == 0 || smoothing_kernel_size % 2 == 0 {
            return Err(PipelineError::InvalidParameter(format!(
                "smoothing kernel size must be odd and at least 1, got {smoothing_kernel_size}"
            )));
        }
        if !smoothing_sigma.is_finite() || smoothing_sigma < 0.0 {
            return Err(PipelineError::InvalidParameter(format!(
                "smoothing sigma must be finite and non-negative, got {smoothing_sigma}"
            )));
        }
        if enhancer_kernel_size == 0 {
            return Err(PipelineError::InvalidParameter(
                "enhancer kernel size must be at least 1".to_string(),
            ));
        }
        if enhancer_kernel_size > MAX_ENHANCER_KERNEL_SIZE {
            return Err(PipelineError::InvalidParameter(format!(
                "enhancer kernel size must be at most {MAX_ENHANCER_KERNEL_SIZE}, got {enhancer_kernel_size}"
            )));
        }

        Ok(Self {
            smoothing_kernel_size,
            smoothing_sigma,
            enhancer_kernel_size,
            mask_threshold,
        })
    }

    /// Parameters tuned for DRIVE and STARE sized images
    /// (kernel 5, sigma 0, enhancer 15, mask threshold 10).
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            smoothing_kernel_size: Self::DEFAULT_SMOOTHING_KERNEL_SIZE,
            smoothing_sigma: Self::DEFAULT_SMOOTHING_SIGMA,
            enhancer_kernel_size: Self::DEFAULT_ENHANCER_KERNEL_SIZE,
            mask_threshold: Self::DEFAULT_MASK_THRESHOLD,
        }
    }

    /// Parameters tuned for HRF images, whose vessels are several times
    /// wider in pixels (kernel 7, sigma 1, enhancer 40, mask threshold 15).
    #[must_use]
    pub const fn high_resolution() -> Self {
        Self {
            smoothing_kernel_size: 7,
            smoothing_sigma: 1.0,
            enhancer_kernel_size: 40,
            mask_threshold: 15,
        }
    }

    /// Side length of the square Gaussian kernel (odd).
    #[must_use]
    pub const fn smoothing_kernel_size(&self) -> u32 {
        self.smoothing_kernel_size
    }

    /// Gaussian standard deviation; `0.0` means derived from the kernel size.
    #[must_use]
    pub const fn smoothing_sigma(&self) -> f32 {
        self.smoothing_sigma
    }

    /// Diameter of the elliptical black-hat structuring element.
    #[must_use]
    pub const fn enhancer_kernel_size(&self) -> u32 {
        self.enhancer_kernel_size
    }

    /// Green-channel level above which a pixel counts as inside the field of view.
    #[must_use]
    pub const fn mask_threshold(&self) -> u8 {
        self.mask_threshold
    }
}

impl Default for PipelineParameters {
    fn default() -> Self {
        Self::standard()
    }
}

/// Unvalidated serde mirror of [`PipelineParameters`].
#[derive(Serialize, Deserialize)]
struct RawParameters {
    smoothing_kernel_size: u32,
    smoothing_sigma: f32,
    enhancer_kernel_size: u32,
    mask_threshold: u8,
}

impl TryFrom<RawParameters> for PipelineParameters {
    type Error = PipelineError;

    fn try_from(raw: RawParameters) -> Result<Self, Self::Error> {
        Self::new(
            raw.smoothing_kernel_size,
            raw.smoothing_sigma,
            raw.enhancer_kernel_size,
            raw.mask_threshold,
        )
    }
}

impl From<PipelineParameters> for RawParameters {
    fn from(params: PipelineParameters) -> Self {
        Self {
            smoothing_kernel_size: params.smoothing_kernel_size,
            smoothing_sigma: params.smoothing_sigma,
            enhancer_kernel_size: params.enhancer_kernel_size,
            mask_threshold: params.mask_threshold,
        }
    }
}

/// Identifier for one intermediate output of the pipeline.
///
/// Variants are declared in execution order; [`StageLabel::ALL`] is the
/// order in which they appear in a [`StageResult`] and in the composite
/// grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StageLabel {
    /// Red plane of the source image.
    Red,
    /// Green plane of the source image (the one the rest of the chain uses).
    Green,
    /// Blue plane of the source image.
    Blue,
    /// Field-of-view mask derived from the green plane.
    Mask,
    /// Gaussian-smoothed green plane.
    Blurred,
    /// Black-hat response.
    Enhanced,
    /// Otsu-binarized black-hat response.
    Thresholded,
    /// Binary map after erosion + dilation (final segmentation).
    Reconstructed,
}

impl StageLabel {
    /// All stages in pipeline order.
    pub const ALL: [Self; 8] = [
        Self::Red,
        Self::Green,
        Self::Blue,
        Self::Mask,
        Self::Blurred,
        Self::Enhanced,
        Self::Thresholded,
        Self::Reconstructed,
    ];

    /// Caption rendered under the stage's tile in the composite.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Red => "Red",
            Self::Green => "Green",
            Self::Blue => "Blue",
            Self::Mask => "Mask",
            Self::Blurred => "Blurred",
            Self::Enhanced => "Enhanced",
            Self::Thresholded => "Thresholded",
            Self::Reconstructed => "Reconstructed",
        }
    }

    /// Directory name used when the stage is persisted on its own.
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Red => "red_channel",
            Self::Green => "green_channel",
            Self::Blue => "blue_channel",
            Self::Mask => "mask",
            Self::Blurred => "blurred",
            Self::Enhanced => "blackhat",
            Self::Thresholded => "threshold",
            Self::Reconstructed => "reconstructed",
        }
    }

    /// Position of the stage within [`StageLabel::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for StageLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// All intermediate outputs for one source image, in pipeline order.
///
/// Always holds exactly one image per [`StageLabel`]; the constructor
/// takes a fixed-size array so a partial result cannot be built.
///
/// Images are not required to share dimensions here (the composite
/// visualizer resizes every tile), but [`run`](crate::run) always
/// produces same-sized planes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageResult {
    images: [GrayImage; 8],
}

impl StageResult {
    /// Build a result from images ordered as [`StageLabel::ALL`].
    #[must_use]
    pub const fn new(images: [GrayImage; 8]) -> Self {
        Self { images }
    }

    /// The image produced by `stage`.
    #[must_use]
    pub const fn get(&self, stage: StageLabel) -> &GrayImage {
        &self.images[stage.index()]
    }

    /// The final segmentation output.
    #[must_use]
    pub const fn reconstructed(&self) -> &GrayImage {
        self.get(StageLabel::Reconstructed)
    }

    /// Number of entries (always 8).
    #[must_use]
    pub const fn len(&self) -> usize {
        self.images.len()
    }

    /// Always `false`; present for symmetry with [`len`](Self::len).
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// Iterate `(label, image)` pairs in pipeline order.
    pub fn iter(&self) -> impl Iterator<Item = (StageLabel, &GrayImage)> {
        StageLabel::ALL.into_iter().zip(self.images.iter())
    }

    /// Consume the result, returning owned `(label, image)` pairs.
    #[must_use]
    pub fn into_stages(self) -> Vec<(StageLabel, GrayImage)> {
        StageLabel::ALL.into_iter().zip(self.images).collect()
    }
}

/// Errors raised by the pipeline core.
///
/// Every stage is a pure function of its input, so these are either
/// caller mistakes (wrong image shape) or configuration mistakes caught
/// when [`PipelineParameters`] is built. Decoding failures belong to the
/// caller that reads files.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PipelineError {
    /// A stage received an image with the wrong number of channels.
    #[error("expected an image with {expected} channel(s), got {actual}")]
    InvalidImageShape {
        /// Channel count the stage requires.
        expected: u8,
        /// Channel count of the image that was supplied.
        actual: u8,
    },

    /// A configuration value is out of range.
    #[error("invalid pipeline parameter: {0}")]
    InvalidParameter(String),
}
