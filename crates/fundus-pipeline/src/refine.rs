//! Clean-up of the binary vessel map: one erosion, then one dilation,
//! both with a dense 3×3 element (a morphological opening).
//!
//! Erosion deletes isolated pixels and fragments thinner than three
//! pixels; dilation restores the outline of whatever survived.
//! Neighbours outside the image are ignored.

use image::GrayImage;
use imageproc::morphology::Mask;

/// Radius of the square refinement element (1 → 3×3).
const ELEMENT_RADIUS: u8 = 1;

/// Erode then dilate `binary` with a 3×3 square element.
#[must_use = "returns the refined binary map"]
pub fn erode_dilate(binary: &GrayImage) -> GrayImage {
    let element = Mask::square(ELEMENT_RADIUS);
    let eroded = imageproc::morphology::grayscale_erode(binary, &element);
    imageproc::morphology::grayscale_dilate(&eroded, &element)
}
