//! Field-of-view mask.
//!
//! Fundus photographs show the retina inside a dark circular border. A
//! fixed global threshold on the green plane approximates that circle.
//!
//! The mask is a diagnostic output only: later stages do not multiply by
//! it, and their results are identical whatever the threshold.

use image::GrayImage;
use imageproc::contrast::ThresholdType;

/// Foreground value of every binary image the pipeline produces.
pub const FOREGROUND: u8 = 255;

/// Background value of every binary image the pipeline produces.
pub const BACKGROUND: u8 = 0;

/// Build the field-of-view mask: 255 where `plane > threshold`, else 0.
#[must_use = "returns the field-of-view mask"]
pub fn field_of_view(plane: &GrayImage, threshold: u8) -> GrayImage {
    imageproc::contrast::threshold(plane, threshold, ThresholdType::Binary)
}

/// Number of [`FOREGROUND`] pixels in a binary image.
#[must_use]
pub fn count_foreground(image: &GrayImage) -> u64 {
    image
        .pixels()
        .map(|p| u64::from(p.0[0] == FOREGROUND))
        .sum()
}

#[cfg(test)]
#[allow(clippy::cast_possible_truncation)]
mod tests {
    use super::*;

    /// Horizontal ramp 0..=255 repeated on every row.
    fn ramp() -> GrayImage {
        GrayImage::from_fn(256, 4, |x, _| image::Luma([x as u8]))
    }

    #[test]
    fn threshold_is_strictly_greater_than() {
        let mask = field_of_view(&ramp(), 10);
        assert_eq!(mask.get_pixel(10, 0).0[0], BACKGROUND);
        assert_eq!(mask.get_pixel(11, 0).0[0], FOREGROUND);
        assert_eq!(count_foreground(&mask), 245 * 4);
    }

    #[test]
    fn output_is_binary() {
        let mask = field_of_view(&ramp(), 100);
        assert!(
            mask.pixels()
                .all(|p| p.0[0] == FOREGROUND || p.0[0] == BACKGROUND)
        );
    }

    #[test]
    fn threshold_255_yields_empty_mask() {
        let mask = field_of_view(&ramp(), 255);
        assert_eq!(count_foreground(&mask), 0);
    }

    #[test]
    fn raising_threshold_never_adds_foreground() {
        let img = GrayImage::from_fn(32, 32, |x, y| image::Luma([((x * 13 + y * 7) % 256) as u8]));
        let mut previous = field_of_view(&img, 0);
        for t in 1..=255u8 {
            let current = field_of_view(&img, t);
            for (prev, cur) in previous.pixels().zip(current.pixels()) {
                assert!(
                    !(prev.0[0] == BACKGROUND && cur.0[0] == FOREGROUND),
                    "threshold {t} turned a background pixel into foreground",
                );
            }
            previous = current;
        }
    }

    #[test]
    fn dimensions_preserved() {
        let mask = field_of_view(&GrayImage::new(17, 9), 10);
        assert_eq!(mask.dimensions(), (17, 9));
    }
}
