//! Global binarization of the black-hat response with Otsu's method.
//!
//! Wraps [`imageproc::contrast::otsu_level`] and
//! [`imageproc::contrast::threshold`]. The level maximizes the
//! between-class variance of the classes `<= level` and `> level`; ties
//! go to the lowest level and splits that leave a class empty are never
//! chosen, so a constant image gets level 0 and an already binary image
//! is left as it is.

use image::GrayImage;
use imageproc::contrast::{ThresholdType, otsu_level, threshold};

/// Binarize with the Otsu level: 255 above it, 0 at or below.
///
/// Returns the binary image together with the level that was used.
#[must_use = "returns the binary vessel map"]
pub fn otsu_binarize(image: &GrayImage) -> (GrayImage, u8) {
    let level = otsu_level(image);
    (threshold(image, level, ThresholdType::Binary), level)
}
