//! Composite visualization: every stage of one image on a single sheet.
//!
//! Each stage becomes a 200×200 tile with a 30 px black caption strip
//! underneath. Tiles are laid out row-major on a 2×4 grid, so the
//! composite is always 800×460 whatever the source resolution.
//!
//! Captions use the 8×8 glyphs from `font8x8`; characters without a
//! glyph are left blank.

use font8x8::{BASIC_FONTS, UnicodeFonts};
use image::buffer::ConvertBuffer;
use image::imageops::FilterType;
use image::{GrayImage, RgbImage};

use crate::types::StageResult;

/// Width and height of the image part of a tile.
pub const TILE_SIZE: u32 = 200;

/// Height of the caption strip below each tile.
pub const CAPTION_HEIGHT: u32 = 30;

/// Tiles per row.
pub const GRID_COLUMNS: u32 = 4;

/// Number of rows.
pub const GRID_ROWS: u32 = 2;

/// Composite width in pixels (800).
pub const COMPOSITE_WIDTH: u32 = TILE_SIZE * GRID_COLUMNS;

/// Composite height in pixels (460).
pub const COMPOSITE_HEIGHT: u32 = (TILE_SIZE + CAPTION_HEIGHT) * GRID_ROWS;

/// Left margin of the caption text.
const CAPTION_MARGIN: u32 = 10;

/// Glyph cell size of the caption font.
const GLYPH_SIZE: u32 = 8;

const CAPTION_COLOR: image::Rgb<u8> = image::Rgb([255, 255, 255]);

/// Tile, label and lay out every stage of `stages` into one image.
#[must_use = "returns the composite image"]
pub fn compose(stages: &StageResult) -> RgbImage {
    let mut sheet = RgbImage::new(COMPOSITE_WIDTH, COMPOSITE_HEIGHT);

    for (i, (label, plane)) in (0u32..).zip(stages.iter()) {
        let tile = labeled_tile(plane, label.label());
        let x = (i % GRID_COLUMNS) * TILE_SIZE;
        let y = (i / GRID_COLUMNS) * (TILE_SIZE + CAPTION_HEIGHT);
        image::imageops::replace(&mut sheet, &tile, i64::from(x), i64::from(y));
    }

    sheet
}

/// Resize a plane to a tile and append its caption strip.
///
/// The plane is replicated across R, G and B, resized with bilinear
/// filtering, and placed above a black strip holding `caption`. Empty
/// planes produce an all-black tile.
#[must_use]
pub fn labeled_tile(plane: &GrayImage, caption: &str) -> RgbImage {
    let mut tile = RgbImage::new(TILE_SIZE, TILE_SIZE + CAPTION_HEIGHT);

    if plane.width() > 0 && plane.height() > 0 {
        let rgb = gray_to_rgb(plane);
        let resized = image::imageops::resize(&rgb, TILE_SIZE, TILE_SIZE, FilterType::Triangle);
        image::imageops::replace(&mut tile, &resized, 0, 0);
    }

    let baseline_top = TILE_SIZE + (CAPTION_HEIGHT - GLYPH_SIZE) / 2;
    draw_text(&mut tile, caption, CAPTION_MARGIN, baseline_top, CAPTION_COLOR);
    tile
}

/// Replicate a single plane into three identical channels.
#[must_use]
pub fn gray_to_rgb(plane: &GrayImage) -> RgbImage {
    plane.convert()
}

/// Draw `text` with its top-left corner at `(x, y)`.
///
/// Glyphs that fall outside the canvas are clipped.
pub fn draw_text(canvas: &mut RgbImage, text: &str, x: u32, y: u32, color: image::Rgb<u8>) {
    let mut cursor = x;
    for ch in text.chars() {
        if let Some(glyph) = BASIC_FONTS.get(ch) {
            for (dy, bits) in (0u32..).zip(glyph) {
                for dx in 0..GLYPH_SIZE {
                    if (bits >> dx) & 1 == 1 {
                        let (px, py) = (cursor.saturating_add(dx), y.saturating_add(dy));
                        if px < canvas.width() && py < canvas.height() {
                            canvas.put_pixel(px, py, color);
                        }
                    }
                }
            }
        }
        cursor = cursor.saturating_add(GLYPH_SIZE);
    }
}

#[cfg(test)]
#[allow(clippy::cast_possible_truncation)]
mod tests {
    use super::*;
    use crate::types::StageLabel;

    fn stages_of_size(w: u32, h: u32) -> StageResult {
        StageResult::new(std::array::from_fn(|i| {
            GrayImage::from_pixel(w, h, image::Luma([(i as u8 + 1) * 30]))
        }))
    }

    #[test]
    fn composite_has_fixed_dimensions() {
        for (w, h) in [(64, 64), (565, 584), (3, 700), (1, 1)] {
            let sheet = compose(&stages_of_size(w, h));
            assert_eq!(sheet.dimensions(), (800, 460), "input {w}x{h}");
        }
    }

    #[test]
    fn mixed_tile_sizes_still_compose() {
        let images: [GrayImage; 8] =
            std::array::from_fn(|i| GrayImage::new(10 + i as u32 * 7, 40 - i as u32 * 3));
        assert_eq!(compose(&StageResult::new(images)).dimensions(), (800, 460));
    }

    #[test]
    fn empty_planes_render_black() {
        let sheet = compose(&StageResult::new(std::array::from_fn(|_| GrayImage::new(0, 0))));
        assert_eq!(sheet.dimensions(), (COMPOSITE_WIDTH, COMPOSITE_HEIGHT));
        assert_eq!(*sheet.get_pixel(100, 100), image::Rgb([0, 0, 0]));
    }

    #[test]
    fn tiles_follow_row_major_order() {
        let sheet = compose(&stages_of_size(20, 20));
        for (i, stage) in StageLabel::ALL.into_iter().enumerate() {
            let i = i as u32;
            let x = (i % 4) * 200 + 100;
            let y = (i / 4) * 230 + 100;
            let expected = (i as u8 + 1) * 30;
            assert_eq!(
                *sheet.get_pixel(x, y),
                image::Rgb([expected, expected, expected]),
                "tile for {stage} misplaced",
            );
        }
    }

    #[test]
    fn caption_strip_is_black_except_text() {
        let tile = labeled_tile(&GrayImage::from_pixel(5, 5, image::Luma([255])), "Mask");
        // Right of the caption text the strip stays black.
        for y in TILE_SIZE..TILE_SIZE + CAPTION_HEIGHT {
            assert_eq!(*tile.get_pixel(190, y), image::Rgb([0, 0, 0]));
        }
        // Some caption pixels are white.
        let lit = (TILE_SIZE..TILE_SIZE + CAPTION_HEIGHT)
            .flat_map(|y| (0..TILE_SIZE).map(move |x| (x, y)))
            .filter(|&(x, y)| *tile.get_pixel(x, y) == CAPTION_COLOR)
            .count();
        assert!(lit > 0, "caption text was not drawn");
    }

    #[test]
    fn caption_starts_after_margin() {
        let tile = labeled_tile(&GrayImage::new(5, 5), "Red");
        for y in TILE_SIZE..TILE_SIZE + CAPTION_HEIGHT {
            for x in 0..CAPTION_MARGIN {
                assert_eq!(*tile.get_pixel(x, y), image::Rgb([0, 0, 0]));
            }
        }
    }

    #[test]
    fn draw_text_clips_at_canvas_edge() {
        let mut canvas = RgbImage::new(12, 6);
        draw_text(&mut canvas, "Reconstructed", 4, 2, CAPTION_COLOR);
        assert_eq!(canvas.dimensions(), (12, 6));
    }

    #[test]
    fn gray_to_rgb_replicates_plane() {
        let plane = GrayImage::from_fn(3, 2, |x, y| image::Luma([(x * 10 + y) as u8]));
        let rgb = gray_to_rgb(&plane);
        for (x, y, p) in rgb.enumerate_pixels() {
            let v = plane.get_pixel(x, y).0[0];
            assert_eq!(p.0, [v, v, v]);
        }
    }
}
