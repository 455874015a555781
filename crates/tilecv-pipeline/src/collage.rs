use tilecv_image::{Image, ImageSize};
use tilecv_imgproc::resize::{resize_to, InterpolationMode};

use crate::config::CollageLayout;
use crate::error::CollageError;
use crate::frame::NamedFrame;

/// Tile an ordered sequence of frames into one RGB image.
///
/// The frames are split in rows of `layout.cols`. Within a row every tile is promoted to
/// RGB and resized to the smallest height of the row, keeping its aspect ratio with the
/// width truncated, then to the smallest of the resulting widths. Short rows are padded
/// with black tiles, narrower rows are padded on the right with black, and the grid is
/// finally resized by `layout.scale` (rounded, at least one pixel per side).
///
/// # Errors
///
/// * [`CollageError::EmptyFrameSet`] if `frames` is empty.
/// * [`CollageError::InvalidColumns`] if `layout.cols` is zero.
/// * [`CollageError::InvalidScale`] if the scale is not positive and finite.
/// * [`CollageError::EmptyTile`] if a frame has zero width or height.
///
/// # Examples
///
/// ```
/// use tilecv_image::Image;
/// use tilecv_pipeline::{compose, CollageLayout, NamedFrameSet, TransformKind};
///
/// let color = Image::<u8, 3>::from_size_val([40, 20].into(), 9).unwrap();
/// let edges = Image::<u8, 1>::from_size_val([40, 20].into(), 0).unwrap();
///
/// let mut frames = NamedFrameSet::default();
/// frames.push(TransformKind::Original, color);
/// frames.push(TransformKind::Canny, edges);
///
/// let layout = CollageLayout { cols: 3, scale: 1.0 };
/// let collage = compose(frames.as_slice(), layout).unwrap();
/// assert_eq!(collage.size(), [120, 20].into());
/// ```
pub fn compose(frames: &[NamedFrame], layout: CollageLayout) -> Result<Image<u8, 3>, CollageError> {
    if frames.is_empty() {
        return Err(CollageError::EmptyFrameSet);
    }
    if layout.cols == 0 {
        return Err(CollageError::InvalidColumns);
    }
    if !layout.scale.is_finite() || layout.scale <= 0.0 {
        return Err(CollageError::InvalidScale(layout.scale));
    }
    if let Some((index, named)) = frames
        .iter()
        .enumerate()
        .find(|(_, named)| named.frame.size().is_empty())
    {
        return Err(CollageError::EmptyTile {
            index,
            name: named.name(),
        });
    }

    let rows = frames
        .chunks(layout.cols)
        .map(|group| compose_row(group, layout.cols))
        .collect::<Result<Vec<_>, _>>()?;

    let grid_size = ImageSize {
        width: rows.iter().map(|row| row.width()).max().unwrap_or(0),
        height: rows.iter().map(|row| row.height()).sum(),
    };
    let mut grid = Image::<u8, 3>::from_size_val(grid_size, 0)?;

    let mut y = 0;
    for row in &rows {
        blit(&mut grid, row, 0, y);
        y += row.height();
    }

    if layout.scale == 1.0 {
        return Ok(grid);
    }

    let scaled_size = ImageSize {
        width: scale_side(grid_size.width, layout.scale),
        height: scale_side(grid_size.height, layout.scale),
    };
    log::trace!("scaling collage {grid_size} -> {scaled_size}");

    Ok(resize_to(&grid, scaled_size, InterpolationMode::Bilinear)?)
}

/// The size of the collage of `count` tiles that all have the size `tile`.
///
/// Matches the output of [`compose`] for such frames; used to size a preview before the
/// first frame arrives.
pub fn collage_size(tile: ImageSize, count: usize, layout: CollageLayout) -> ImageSize {
    let cols = layout.cols.max(1);
    let rows = count.div_ceil(cols);
    let grid = ImageSize {
        width: tile.width * cols,
        height: tile.height * rows,
    };
    if layout.scale == 1.0 {
        return grid;
    }
    ImageSize {
        width: scale_side(grid.width, layout.scale),
        height: scale_side(grid.height, layout.scale),
    }
}

// one row of `cols` tiles of equal size, short groups padded with black tiles
fn compose_row(group: &[NamedFrame], cols: usize) -> Result<Image<u8, 3>, CollageError> {
    let tiles = group
        .iter()
        .map(|named| named.frame.to_rgb())
        .collect::<Result<Vec<_>, _>>()?;

    let h_min = tiles.iter().map(|tile| tile.height()).min().unwrap_or(1);

    // width after matching the height, truncated
    let matched_width = |tile: &Image<u8, 3>| (tile.width() * h_min / tile.height()).max(1);
    let w_min = tiles.iter().map(matched_width).min().unwrap_or(1);

    let tile_size = ImageSize {
        width: w_min,
        height: h_min,
    };

    let mut row = Image::<u8, 3>::from_size_val(
        ImageSize {
            width: w_min * cols,
            height: h_min,
        },
        0,
    )?;

    for (i, tile) in tiles.into_iter().enumerate() {
        let matched = ImageSize {
            width: matched_width(&tile),
            height: h_min,
        };
        let tile = resize_if_needed(tile, matched)?;
        let tile = resize_if_needed(tile, tile_size)?;
        blit(&mut row, &tile, i * w_min, 0);
    }

    Ok(row)
}

fn resize_if_needed(tile: Image<u8, 3>, size: ImageSize) -> Result<Image<u8, 3>, CollageError> {
    if tile.size() == size {
        return Ok(tile);
    }
    Ok(resize_to(&tile, size, InterpolationMode::Bilinear)?)
}

// copy `tile` into `canvas` with its top-left corner at (x0, y0); must fit
fn blit(canvas: &mut Image<u8, 3>, tile: &Image<u8, 3>, x0: usize, y0: usize) {
    let canvas_stride = canvas.width() * 3;
    let tile_stride = tile.width() * 3;
    let dst = canvas.as_slice_mut();

    for (y, src_row) in tile.as_slice().chunks_exact(tile_stride).enumerate() {
        let start = (y0 + y) * canvas_stride + x0 * 3;
        dst[start..start + tile_stride].copy_from_slice(src_row);
    }
}

fn scale_side(side: usize, scale: f32) -> usize {
    ((side as f64 * scale as f64).round() as usize).max(1)
}
