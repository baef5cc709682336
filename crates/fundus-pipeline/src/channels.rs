//! Channel extraction: split a color fundus image into its R, G and B planes.
//!
//! This is the first step in the pipeline. The green plane carries the
//! best vessel contrast and feeds every later stage; red and blue are
//! kept only as diagnostic outputs.

use image::{DynamicImage, GrayImage, RgbImage};
use imageproc::map::{into_blue_channel, into_green_channel, into_red_channel};

use crate::types::PipelineError;

/// Number of planes a source image must have.
pub const SOURCE_CHANNELS: u8 = 3;

/// Split a three-channel image into `[red, green, blue]` planes.
///
/// Images with more than 8 bits per sample are converted to 8 bits
/// first. Each returned plane has the same dimensions as the source.
///
/// # Errors
///
/// Returns [`PipelineError::InvalidImageShape`] if the image does not
/// have exactly three channels (grayscale, gray+alpha and RGBA inputs are
/// all rejected).
pub fn split_channels(image: &DynamicImage) -> Result<[GrayImage; 3], PipelineError> {
    let actual = image.color().channel_count();
    if actual != SOURCE_CHANNELS {
        return Err(PipelineError::InvalidImageShape {
            expected: SOURCE_CHANNELS,
            actual,
        });
    }

    let rgb = image.to_rgb8();
    Ok(split_rgb(&rgb))
}

/// Split an 8-bit RGB buffer into `[red, green, blue]` planes.
#[must_use = "returns the extracted planes"]
pub fn split_rgb(image: &RgbImage) -> [GrayImage; 3] {
    [
        into_red_channel(image),
        into_green_channel(image),
        into_blue_channel(image),
    ]
}

/// Interleave three planes back into an RGB image.
///
/// Inverse of [`split_rgb`]. Returns `None` if the planes do not share
/// the same dimensions.
#[must_use]
pub fn merge_channels(red: &GrayImage, green: &GrayImage, blue: &GrayImage) -> Option<RgbImage> {
    let dims = red.dimensions();
    if green.dimensions() != dims || blue.dimensions() != dims {
        return None;
    }

    Some(RgbImage::from_fn(dims.0, dims.1, |x, y| {
        image::Rgb([
            red.get_pixel(x, y).0[0],
            green.get_pixel(x, y).0[0],
            blue.get_pixel(x, y).0[0],
        ])
    }))
}
