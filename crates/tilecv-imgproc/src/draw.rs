use std::cmp::{max, min};

use tilecv_image::{Image, ImageError};

use crate::filter::box_blur;
use crate::font::{self, GLYPH_ADVANCE, GLYPH_HEIGHT, GLYPH_WIDTH};

/// Helper function to set a pixel's color, handling bounds checking.
#[inline]
fn set_pixel<const C: usize>(img: &mut Image<u8, C>, x: i64, y: i64, color: [u8; C]) {
    if x >= 0 && x < img.cols() as i64 && y >= 0 && y < img.rows() as i64 {
        let start = (y as usize * img.cols() + x as usize) * C;
        img.as_slice_mut()[start..start + C].copy_from_slice(&color);
    }
}

/// Draws a filled rectangle on an image inplace.
///
/// The rectangle covers `[top_left, bottom_right)` and is clipped to the image.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `top_left` - The top-left corner coordinates (x, y).
/// * `bottom_right` - The bottom-right corner coordinates (x, y), exclusive.
/// * `color` - The fill color of the rectangle.
pub fn draw_filled_rect<const C: usize>(
    img: &mut Image<u8, C>,
    top_left: (i64, i64),
    bottom_right: (i64, i64),
    color: [u8; C],
) {
    let (x_start, y_start) = top_left;
    let (x_end, y_end) = bottom_right;

    // clamp to the image bounds, ends are exclusive
    let x_min = max(0, min(x_start, x_end));
    let y_min = max(0, min(y_start, y_end));
    let x_max = min(img.cols() as i64, max(x_start, x_end));
    let y_max = min(img.rows() as i64, max(y_start, y_end));

    for y in y_min..y_max {
        for x in x_min..x_max {
            set_pixel(img, x, y, color);
        }
    }
}

/// Style of rendered text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle<const C: usize> {
    /// Text color.
    pub color: [u8; C],
    /// Font scale; 1.0 renders glyphs 21 pixels tall.
    pub scale: f32,
    /// Stroke thickness in pixels.
    pub thickness: usize,
    /// Smooth the glyph edges by blending a blurred coverage mask.
    pub anti_aliased: bool,
}

impl<const C: usize> TextStyle<C> {
    // side of one font dot in pixels
    fn dot(&self) -> i64 {
        ((self.scale * 3.0).round() as i64).max(1)
    }

    // pixels added on each side of a dot by the stroke thickness
    fn grow(&self) -> i64 {
        self.thickness as i64 / 2
    }
}

/// Size in pixels (width, height) of `text` rendered with `style`, excluding the stroke.
pub fn text_size<const C: usize>(text: &str, style: &TextStyle<C>) -> (usize, usize) {
    let dot = style.dot() as usize;
    let chars = text.chars().count();
    let width = match chars {
        0 => 0,
        n => ((n - 1) * GLYPH_ADVANCE + GLYPH_WIDTH) * dot,
    };
    (width, GLYPH_HEIGHT * dot)
}

/// Draw text on an image inplace.
///
/// The glyphs come from a 5x7 bitmap font scaled by `style.scale`. `origin` is the
/// bottom-left corner of the text (x, y). Pixels falling outside the image are clipped.
///
/// # Arguments
///
/// * `img` - The image to draw on.
/// * `text` - The ASCII text; other characters render as `?`.
/// * `origin` - The bottom-left corner of the text.
/// * `style` - Color, scale, thickness and anti-aliasing.
///
/// # Example
///
/// ```
/// use tilecv_image::Image;
/// use tilecv_imgproc::draw::{draw_text, TextStyle};
///
/// let mut img = Image::<u8, 3>::from_size_val([120, 40].into(), 0).unwrap();
/// let style = TextStyle {
///     color: [0, 255, 255],
///     scale: 1.0,
///     thickness: 2,
///     anti_aliased: true,
/// };
///
/// draw_text(&mut img, "canny", (5, 30), &style).unwrap();
/// assert!(img.as_slice().iter().any(|&v| v > 0));
/// ```
pub fn draw_text<const C: usize>(
    img: &mut Image<u8, C>,
    text: &str,
    origin: (i64, i64),
    style: &TextStyle<C>,
) -> Result<(), ImageError> {
    let (text_w, text_h) = text_size(text, style);
    if text_w == 0 {
        return Ok(());
    }

    let dot = style.dot();
    let grow = style.grow();
    let margin = grow + 1;

    // coverage mask of the text box, plus a margin for the stroke and the blur
    let mask_w = text_w as i64 + 2 * margin;
    let mask_h = text_h as i64 + 2 * margin;
    let mut mask = Image::<f32, 1>::from_size_val([mask_w as usize, mask_h as usize].into(), 0.0)?;

    for (i, ch) in text.chars().enumerate() {
        let glyph_x = margin + (i * GLYPH_ADVANCE) as i64 * dot;
        for (row, bits) in font::glyph(ch).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (0x10 >> col) == 0 {
                    continue;
                }
                let x0 = glyph_x + col as i64 * dot - grow;
                let y0 = margin + row as i64 * dot - grow;
                let side = dot + 2 * grow;
                fill_mask(&mut mask, x0, y0, side);
            }
        }
    }

    if style.anti_aliased {
        let hard = mask.clone();
        box_blur(&hard, &mut mask, (3, 3))?;
    }

    let left = origin.0 - margin;
    let top = origin.1 - text_h as i64 - margin;
    blend_mask(img, &mask, (left, top), style.color);

    Ok(())
}

fn fill_mask(mask: &mut Image<f32, 1>, x0: i64, y0: i64, side: i64) {
    let cols = mask.cols() as i64;
    let rows = mask.rows() as i64;
    for y in max(0, y0)..min(rows, y0 + side) {
        let start = (y * cols) as usize;
        let row = &mut mask.as_slice_mut()[start..start + cols as usize];
        row[max(0, x0) as usize..min(cols, x0 + side) as usize].fill(1.0);
    }
}

// Alpha-blend `color` into `img` with the mask placed at `top_left`.
fn blend_mask<const C: usize>(
    img: &mut Image<u8, C>,
    mask: &Image<f32, 1>,
    top_left: (i64, i64),
    color: [u8; C],
) {
    let img_cols = img.cols() as i64;
    let img_rows = img.rows() as i64;
    let mask_cols = mask.cols();

    for (my, mask_row) in mask.as_slice().chunks_exact(mask_cols).enumerate() {
        let y = top_left.1 + my as i64;
        if y < 0 || y >= img_rows {
            continue;
        }
        for (mx, &alpha) in mask_row.iter().enumerate() {
            let x = top_left.0 + mx as i64;
            if alpha <= 0.0 || x < 0 || x >= img_cols {
                continue;
            }
            let alpha = alpha.min(1.0);
            let start = (y * img_cols + x) as usize * C;
            let pixel = &mut img.as_slice_mut()[start..start + C];
            for (p, &c) in pixel.iter_mut().zip(color.iter()) {
                let blended = *p as f32 * (1.0 - alpha) + c as f32 * alpha;
                *p = blended.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tilecv_image::ImageSize;

    #[test]
    fn test_draw_filled_rect() -> Result<(), ImageError> {
        let mut img = Image::<u8, 1>::from_size_val(
            ImageSize {
                width: 5,
                height: 4,
            },
            0,
        )?;

        draw_filled_rect(&mut img, (3, 2), (10, -1), [9]);

        #[rustfmt::skip]
        assert_eq!(
            img.as_slice(),
            &[
                0, 0, 0, 9, 9,
                0, 0, 0, 9, 9,
                0, 0, 0, 0, 0,
                0, 0, 0, 0, 0,
            ]
        );

        Ok(())
    }

    #[test]
    fn test_text_size() {
        let style = TextStyle {
            color: [255u8],
            scale: 1.0,
            thickness: 1,
            anti_aliased: false,
        };
        assert_eq!(text_size("", &style), (0, 21));
        assert_eq!(text_size("ab", &style), (33, 21));
    }

    #[test]
    fn test_draw_text_hard_edges() -> Result<(), ImageError> {
        let mut img = Image::<u8, 1>::from_size_val([20, 12].into(), 0)?;
        let style = TextStyle {
            color: [200u8],
            scale: 0.3,
            thickness: 1,
            anti_aliased: false,
        };

        // one pixel per dot, baseline at row 8
        draw_text(&mut img, "|", (2, 8), &style)?;

        for y in 0..12 {
            for x in 0..20 {
                let expected = if x == 4 && (1..8).contains(&y) { 200 } else { 0 };
                assert_eq!(img.get_pixel(x, y, 0)?, expected, "({x}, {y})");
            }
        }

        Ok(())
    }

    #[test]
    fn test_draw_text_anti_aliased_is_soft() -> Result<(), ImageError> {
        let mut img = Image::<u8, 3>::from_size_val([60, 40].into(), 0)?;
        let style = TextStyle {
            color: [0, 255, 100],
            scale: 1.0,
            thickness: 3,
            anti_aliased: true,
        };

        draw_text(&mut img, "8", (10, 30), &style)?;

        let greens = img
            .as_slice()
            .chunks_exact(3)
            .map(|px| px[1])
            .collect::<Vec<_>>();
        assert!(greens.contains(&255));
        assert!(greens.iter().any(|&g| g > 0 && g < 255));

        Ok(())
    }

    #[test]
    fn test_draw_text_clipped() -> Result<(), ImageError> {
        let mut img = Image::<u8, 1>::from_size_val([4, 4].into(), 0)?;
        let style = TextStyle {
            color: [255u8],
            scale: 2.0,
            thickness: 2,
            anti_aliased: true,
        };
        draw_text(&mut img, "clipped", (-50, 200), &style)?;
        assert!(img.as_slice().iter().all(|&v| v == 0));
        Ok(())
    }
}
