//! Vessel enhancement with a black-hat transform.
//!
//! Vessels appear as thin dark lines on a brighter background. A
//! morphological closing with an element wider than the vessels fills
//! them in; subtracting the original then leaves the vessels as bright
//! ridges and flattens the background to zero.
//!
//! Wraps [`imageproc::morphology`] with an elliptical structuring element.

use image::GrayImage;
use imageproc::map::map_pixels2;
use imageproc::morphology::Mask;

/// Rasterise a filled ellipse inscribed in a `size × size` square.
///
/// Returns the element as a binary image (255 inside) together with its
/// anchor, the pixel at `(size / 2, size / 2)`. Row `i` spans
/// `anchor ± round(anchor * sqrt(1 - ((i - anchor) / anchor)^2))`,
/// clipped to the square. Even sizes therefore produce an element whose
/// last row and column are shorter than the first.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]
pub fn ellipse_element(size: u32) -> (GrayImage, u32) {
    let anchor = size / 2;
    let r = f64::from(anchor);
    let mut element = GrayImage::new(size, size);

    for row in 0..size {
        let dy = f64::from(row) - r;
        if dy.abs() > r {
            continue;
        }
        let half = if anchor == 0 {
            0
        } else {
            (r * (1.0 - (dy / r) * (dy / r)).sqrt()).round() as u32
        };
        let start = anchor.saturating_sub(half);
        let end = (anchor + half + 1).min(size);
        for col in start..end {
            element.put_pixel(col, row, image::Luma([255]));
        }
    }

    (element, anchor)
}

/// Build the imageproc mask for an elliptical element of diameter `size`.
///
/// Returns `None` if the element is too large to be represented
/// (`size` above [`MAX_ENHANCER_KERNEL_SIZE`](crate::MAX_ENHANCER_KERNEL_SIZE)).
#[must_use]
pub fn ellipse_mask(size: u32) -> Option<Mask> {
    if size == 0 || size > crate::MAX_ENHANCER_KERNEL_SIZE {
        return None;
    }
    let (element, anchor) = ellipse_element(size);
    let anchor = u8::try_from(anchor).ok()?;
    Some(Mask::from_image(&element, anchor, anchor))
}

/// Morphological closing (dilation then erosion) with the same mask.
#[must_use = "returns the closed image"]
pub fn close(image: &GrayImage, mask: &Mask) -> GrayImage {
    let dilated = imageproc::morphology::grayscale_dilate(image, mask);
    imageproc::morphology::grayscale_erode(&dilated, mask)
}

/// Black-hat transform: `closing(image) - image`, saturating at zero.
///
/// `size` is the structuring-element diameter. Out-of-range sizes are
/// rejected when [`PipelineParameters`](crate::PipelineParameters) is
/// built; if one reaches this function anyway the response is all zero.
#[must_use = "returns the black-hat response"]
pub fn black_hat(image: &GrayImage, size: u32) -> GrayImage {
    let Some(mask) = ellipse_mask(size) else {
        return GrayImage::new(image.width(), image.height());
    };

    let closed = close(image, &mask);
    map_pixels2(&closed, image, |c, o| image::Luma([c.0[0].saturating_sub(o.0[0])]))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element_rows(size: u32) -> Vec<String> {
        let (element, _) = ellipse_element(size);
        (0..size)
            .map(|y| {
                (0..size)
                    .map(|x| if element.get_pixel(x, y).0[0] > 0 { '#' } else { '.' })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn size_one_element_is_single_pixel() {
        assert_eq!(element_rows(1), vec!["#"]);
    }

    #[test]
    fn size_five_element_is_round() {
        assert_eq!(
            element_rows(5),
            vec!["..#..", "#####", "#####", "#####", "..#.."]
        );
    }

    #[test]
    fn element_is_symmetric_for_odd_sizes() {
        let (element, anchor) = ellipse_element(15);
        assert_eq!(anchor, 7);
        for y in 0..15 {
            for x in 0..15 {
                assert_eq!(element.get_pixel(x, y), element.get_pixel(14 - x, y));
                assert_eq!(element.get_pixel(x, y), element.get_pixel(x, 14 - y));
            }
        }
        // Full-width centre row.
        assert!((0..15).all(|x| element.get_pixel(x, 7).0[0] == 255));
    }

    #[test]
    fn even_size_element_fits_square() {
        let (element, anchor) = ellipse_element(40);
        assert_eq!(element.dimensions(), (40, 40));
        assert_eq!(anchor, 20);
        assert_eq!(element.get_pixel(20, 20).0[0], 255);
    }

    #[test]
    fn oversized_mask_is_unavailable() {
        assert!(ellipse_mask(0).is_none());
        assert!(ellipse_mask(crate::MAX_ENHANCER_KERNEL_SIZE + 1).is_none());
        assert!(ellipse_mask(15).is_some());
    }

    #[test]
    fn uniform_image_yields_zero_response() {
        let img = GrayImage::from_pixel(30, 30, image::Luma([173]));
        let response = black_hat(&img, 15);
        assert!(response.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn thin_dark_line_becomes_bright_ridge() {
        // Vertical dark line at x = 10 on a light background.
        let img = GrayImage::from_fn(21, 21, |x, _| {
            if x == 10 {
                image::Luma([60])
            } else {
                image::Luma([200])
            }
        });
        let response = black_hat(&img, 7);
        for y in 0..21 {
            assert_eq!(response.get_pixel(10, y).0[0], 140, "row {y}");
            assert_eq!(response.get_pixel(3, y).0[0], 0, "row {y}");
        }
    }

    #[test]
    fn bright_structures_are_suppressed() {
        // A bright spot is not a vessel: closing leaves it as is.
        let mut img = GrayImage::from_pixel(15, 15, image::Luma([100]));
        img.put_pixel(7, 7, image::Luma([250]));
        let response = black_hat(&img, 5);
        assert!(response.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn dimensions_preserved() {
        let response = black_hat(&GrayImage::new(19, 11), 15);
        assert_eq!(response.dimensions(), (19, 11));
    }
}
