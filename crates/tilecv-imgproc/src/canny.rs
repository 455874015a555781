use rayon::prelude::*;
use tilecv_image::{Image, ImageError};

use crate::border::BorderMode;
use crate::filter::{sobel, GradientAxis};

// tan(22.5°) in Q15 fixed point
const TG22: i64 = 13573;

const NOT_EDGE: u8 = 0;
const CANDIDATE: u8 = 1;
const EDGE: u8 = 2;

/// Detect edges with the Canny algorithm.
///
/// The gradient is computed with a 3x3 sobel operator on every channel (replicated
/// border); each pixel keeps the channel with the largest L1 magnitude `|dx| + |dy|`.
/// Non-maximum suppression thins the response along the quantized gradient direction and
/// hysteresis keeps the pixels above `high_threshold` plus the pixels above
/// `low_threshold` 8-connected to them. The thresholds are swapped if given in the wrong
/// order.
///
/// # Arguments
///
/// * `src` - The input image with shape (H, W, C).
/// * `dst` - The output edge map with values in {0, 255}.
/// * `low_threshold` - The lower hysteresis threshold.
/// * `high_threshold` - The upper hysteresis threshold.
///
/// # Example
///
/// ```
/// use tilecv_image::Image;
/// use tilecv_imgproc::canny::canny;
///
/// let src = Image::<u8, 3>::from_size_val([16, 16].into(), 128).unwrap();
/// let mut edges = Image::<u8, 1>::from_size_val(src.size(), 0).unwrap();
///
/// canny(&src, &mut edges, 50.0, 150.0).unwrap();
/// assert!(edges.as_slice().iter().all(|&v| v == 0));
/// ```
pub fn canny<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, 1>,
    low_threshold: f32,
    high_threshold: f32,
) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let rows = src.rows();
    let cols = src.cols();
    if rows == 0 || cols == 0 {
        return Ok(());
    }

    let (low, high) = if low_threshold > high_threshold {
        (high_threshold, low_threshold)
    } else {
        (low_threshold, high_threshold)
    };
    let (low, high) = (low.floor() as i32, high.floor() as i32);

    let mut dx = Image::<i16, C>::from_size_val(src.size(), 0)?;
    sobel(src, &mut dx, GradientAxis::X, BorderMode::Replicate)?;
    let mut dy = Image::<i16, C>::from_size_val(src.size(), 0)?;
    sobel(src, &mut dy, GradientAxis::Y, BorderMode::Replicate)?;

    let (mag, gx, gy) = dominant_gradient(&dx, &dy);

    // magnitudes outside the image read as zero
    let mag_at = |y: isize, x: isize| -> i32 {
        if y < 0 || x < 0 || y >= rows as isize || x >= cols as isize {
            0
        } else {
            mag[y as usize * cols + x as usize]
        }
    };

    let mut map = vec![NOT_EDGE; rows * cols];
    map.par_chunks_exact_mut(cols)
        .enumerate()
        .for_each(|(r, row_map)| {
            let y = r as isize;
            for (c, state) in row_map.iter_mut().enumerate() {
                let idx = r * cols + c;
                let m = mag[idx];
                if m <= low {
                    continue;
                }

                let x = c as isize;
                let (sx, sy) = (gx[idx] as i64, gy[idx] as i64);
                let xs = sx.abs();
                let ys = sy.abs() << 15;
                let tg22x = xs * TG22;

                let is_max = if ys < tg22x {
                    m > mag_at(y, x - 1) && m >= mag_at(y, x + 1)
                } else if ys > tg22x + (xs << 16) {
                    m > mag_at(y - 1, x) && m >= mag_at(y + 1, x)
                } else {
                    let s: isize = if (sx ^ sy) < 0 { -1 } else { 1 };
                    m > mag_at(y - 1, x - s) && m > mag_at(y + 1, x + s)
                };

                if is_max {
                    *state = if m > high { EDGE } else { CANDIDATE };
                }
            }
        });

    hysteresis(&mut map, rows, cols);

    dst.as_slice_mut()
        .par_iter_mut()
        .zip(map.par_iter())
        .for_each(|(d, &state)| *d = if state == EDGE { 255 } else { 0 });

    Ok(())
}

// Per pixel, the gradient of the channel with the largest L1 magnitude. Ties keep the
// lowest channel.
fn dominant_gradient<const C: usize>(
    dx: &Image<i16, C>,
    dy: &Image<i16, C>,
) -> (Vec<i32>, Vec<i32>, Vec<i32>) {
    let n = dx.rows() * dx.cols();
    let mut mag = vec![0i32; n];
    let mut gx = vec![0i32; n];
    let mut gy = vec![0i32; n];

    mag.par_iter_mut()
        .zip(gx.par_iter_mut())
        .zip(gy.par_iter_mut())
        .zip(dx.as_slice().par_chunks_exact(C))
        .zip(dy.as_slice().par_chunks_exact(C))
        .for_each(|((((m, gx), gy), px), py)| {
            for ch in 0..C {
                let (vx, vy) = (px[ch] as i32, py[ch] as i32);
                let l1 = vx.abs() + vy.abs();
                if ch == 0 || l1 > *m {
                    *m = l1;
                    *gx = vx;
                    *gy = vy;
                }
            }
        });

    (mag, gx, gy)
}

// Promote candidates 8-connected to an edge until no more can be reached.
fn hysteresis(map: &mut [u8], rows: usize, cols: usize) {
    let mut stack = map
        .iter()
        .enumerate()
        .filter(|(_, state)| **state == EDGE)
        .map(|(idx, _)| idx)
        .collect::<Vec<_>>();

    while let Some(idx) = stack.pop() {
        let (r, c) = ((idx / cols) as isize, (idx % cols) as isize);
        for ny in r - 1..=r + 1 {
            for nx in c - 1..=c + 1 {
                if ny < 0 || nx < 0 || ny >= rows as isize || nx >= cols as isize {
                    continue;
                }
                let n = ny as usize * cols + nx as usize;
                if map[n] == CANDIDATE {
                    map[n] = EDGE;
                    stack.push(n);
                }
            }
        }
    }
}
