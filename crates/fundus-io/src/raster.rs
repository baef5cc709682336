//! Image decoding and PNG encoding.
//!
//! Inputs are decoded with the format sniffed from the file contents, so
//! a mislabelled extension still loads, and are always handed back as
//! 8-bit RGB. Outputs are always PNG.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use fundus_pipeline::{DynamicImage, GrayImage, RgbImage};
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageError, ImageReader};

use crate::IoError;

/// Decode the image at `path` as 8-bit RGB.
///
/// Grayscale sources have their plane replicated into all three
/// channels, alpha is dropped and deeper samples are scaled to 8 bits.
///
/// # Errors
///
/// Returns [`IoError::Decode`] if the file cannot be opened, its format
/// is not recognized, or decoding fails.
pub fn load_image(path: &Path) -> Result<DynamicImage, IoError> {
    let decode_error = |source: ImageError| IoError::Decode {
        path: path.to_path_buf(),
        source,
    };

    let decoded = ImageReader::open(path)
        .and_then(ImageReader::with_guessed_format)
        .map_err(|e| decode_error(ImageError::IoError(e)))?
        .decode()
        .map_err(decode_error)?;

    Ok(match decoded {
        DynamicImage::ImageRgb8(_) => decoded,
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    })
}

/// Write a single-channel image as an 8-bit grayscale PNG.
///
/// # Errors
///
/// Returns [`IoError::Encode`] if the file cannot be created or written.
pub fn save_gray(path: &Path, image: &GrayImage) -> Result<(), IoError> {
    write_png(
        path,
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::L8,
    )
}

/// Write a three-channel image as an 8-bit RGB PNG.
///
/// # Errors
///
/// Returns [`IoError::Encode`] if the file cannot be created or written.
pub fn save_rgb(path: &Path, image: &RgbImage) -> Result<(), IoError> {
    write_png(
        path,
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgb8,
    )
}

fn write_png(
    path: &Path,
    raw: &[u8],
    width: u32,
    height: u32,
    color: ExtendedColorType,
) -> Result<(), IoError> {
    let encode_error = |source: ImageError| IoError::Encode {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(|e| encode_error(ImageError::IoError(e)))?;
    let mut writer = BufWriter::new(file);
    PngEncoder::new(&mut writer)
        .write_image(raw, width, height, color)
        .map_err(encode_error)?;
    writer
        .flush()
        .map_err(|e| encode_error(ImageError::IoError(e)))
}
