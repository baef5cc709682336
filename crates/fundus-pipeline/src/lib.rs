//! fundus-pipeline: Pure retinal vessel extraction pipeline (sans-IO).
//!
//! Turns a color fundus photograph into a binary vessel map through:
//! channel split -> field-of-view mask -> Gaussian smoothing ->
//! black-hat enhancement -> Otsu threshold -> erosion + dilation,
//! keeping every intermediate so it can be inspected or saved.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! images and returns structured data. Reading datasets and writing
//! stage images lives in `fundus-io`.

pub mod blur;
pub mod channels;
pub mod composite;
pub mod diagnostics;
pub mod enhance;
pub mod mask;
pub mod pipeline;
pub mod refine;
pub mod threshold;
pub mod types;

pub use composite::compose;
pub use pipeline::run;
pub use types::{
    DynamicImage, GrayImage, MAX_ENHANCER_KERNEL_SIZE, PipelineError, PipelineParameters,
    RgbImage, StageLabel, StageResult,
};
