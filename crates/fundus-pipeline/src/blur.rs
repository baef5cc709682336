//! Gaussian smoothing of the green plane before vessel enhancement.
//!
//! The kernel is built from an explicit size and sigma, then applied as
//! two 1-D passes with [`imageproc::filter::separable_filter_equal`]. Both
//! passes run on `f32` samples and the result is rounded to the nearest
//! grey level once, so smoothing has no downward bias and a constant
//! plane is a fixed point.
//!
//! Pixels beyond the border repeat the nearest edge pixel. This differs
//! from a reflect-101 border only within `size / 2` pixels of the frame,
//! which lies in the dark area outside the field of view.
//!
//! With `sigma == 0` the kernel is derived from its size: sizes 1, 3, 5
//! and 7 use fixed binomial weights, larger sizes use
//! `sigma = 0.3 * ((size - 1) * 0.5 - 1) + 0.8`.

use image::GrayImage;
use imageproc::map::map_subpixels;

/// Fixed weights for small kernels when sigma is derived from the size.
const SMALL_KERNELS: [&[f32]; 4] = [
    &[1.0],
    &[0.25, 0.5, 0.25],
    &[0.0625, 0.25, 0.375, 0.25, 0.0625],
    &[
        0.031_25, 0.109_375, 0.218_75, 0.281_25, 0.218_75, 0.109_375, 0.031_25,
    ],
];

/// Sigma implied by a kernel size when none is given.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn derived_sigma(size: u32) -> f32 {
    0.3f32.mul_add((size as f32 - 1.0).mul_add(0.5, -1.0), 0.8)
}

/// Build a normalised 1-D Gaussian kernel of odd length `size`.
///
/// Callers must pass an odd, non-zero `size`;
/// [`PipelineParameters`](crate::PipelineParameters) guarantees this.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn gaussian_kernel(size: u32, sigma: f32) -> Vec<f32> {
    if sigma <= 0.0 {
        let small = usize::try_from(size / 2)
            .ok()
            .and_then(|i| SMALL_KERNELS.get(i))
            .filter(|k| k.len() as u32 == size);
        if let Some(kernel) = small {
            return kernel.to_vec();
        }
    }

    let sigma = if sigma > 0.0 { sigma } else { derived_sigma(size) };
    let center = (size / 2) as f32;
    let scale = -0.5 / (sigma * sigma);

    let mut kernel: Vec<f32> = (0..size)
        .map(|i| {
            let d = i as f32 - center;
            (scale * d * d).exp()
        })
        .collect();
    let sum: f32 = kernel.iter().sum();
    for w in &mut kernel {
        *w /= sum;
    }
    kernel
}

/// Smooth a single-plane image with a `size × size` Gaussian.
///
/// Output dimensions always equal input dimensions. A kernel of size 1
/// returns the image unchanged.
#[must_use = "returns the smoothed image"]
pub fn gaussian_smooth(image: &GrayImage, size: u32, sigma: f32) -> GrayImage {
    if size <= 1 {
        return image.clone();
    }

    let kernel = gaussian_kernel(size, sigma);
    let samples = map_subpixels(image, f32::from);
    let smoothed = imageproc::filter::separable_filter_equal(&samples, kernel.as_slice());
    map_subpixels(&smoothed, round_to_u8)
}

/// Nearest grey level, saturating at 0 and 255.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn round_to_u8(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}
