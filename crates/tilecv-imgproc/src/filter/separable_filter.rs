use rayon::prelude::*;
use tilecv_image::{Image, ImageError};

use crate::border::BorderMode;

/// Trait for floating point casting
pub trait FloatConversion {
    /// Convert the type to f32
    fn to_f32(&self) -> f32;
    /// Convert the type from f32, rounding and saturating integer types
    fn from_f32(val: f32) -> Self;
}

impl FloatConversion for f32 {
    fn to_f32(&self) -> f32 {
        *self
    }

    fn from_f32(val: f32) -> Self {
        val
    }
}

impl FloatConversion for u8 {
    fn to_f32(&self) -> f32 {
        *self as f32
    }

    fn from_f32(val: f32) -> Self {
        val.round().clamp(0.0, 255.0) as u8
    }
}

impl FloatConversion for i16 {
    fn to_f32(&self) -> f32 {
        *self as f32
    }

    fn from_f32(val: f32) -> Self {
        val.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16
    }
}

/// A separable 2D filter that applies horizontal and vertical 1D correlations sequentially.
///
/// The horizontal pass accumulates into an f32 buffer, so the intermediate result is never
/// rounded.
struct SeparableFilter<'a> {
    kernel_x: &'a [f32],
    kernel_y: &'a [f32],
    offsets_x: Vec<isize>,
    offsets_y: Vec<isize>,
    border: BorderMode,
}

impl<'a> SeparableFilter<'a> {
    fn new(kernel_x: &'a [f32], kernel_y: &'a [f32], border: BorderMode) -> Self {
        let half_x = (kernel_x.len() / 2) as isize;
        let half_y = (kernel_y.len() / 2) as isize;

        Self {
            kernel_x,
            kernel_y,
            offsets_x: (0..kernel_x.len() as isize).map(|i| i - half_x).collect(),
            offsets_y: (0..kernel_y.len() as isize).map(|i| i - half_y).collect(),
            border,
        }
    }

    fn apply<S, D, const C: usize>(&self, src: &Image<S, C>, dst: &mut Image<D, C>)
    where
        S: FloatConversion + Send + Sync,
        D: FloatConversion + Send + Sync,
    {
        let rows = src.rows();
        let cols = src.cols();
        let src_data = src.as_slice();
        let mut temp = vec![0.0f32; src_data.len()];

        // horizontal pass
        temp.par_chunks_exact_mut(cols * C)
            .zip(src_data.par_chunks_exact(cols * C))
            .for_each(|(row_temp, row_src)| {
                for c in 0..cols {
                    let mut acc = [0.0f32; C];
                    for (&k, &off) in self.kernel_x.iter().zip(self.offsets_x.iter()) {
                        let x = self.border.map(c as isize + off, cols);
                        for (ch, acc_val) in acc.iter_mut().enumerate() {
                            *acc_val += row_src[x * C + ch].to_f32() * k;
                        }
                    }
                    row_temp[c * C..(c + 1) * C].copy_from_slice(&acc);
                }
            });

        // vertical pass
        dst.as_slice_mut()
            .par_chunks_exact_mut(cols * C)
            .enumerate()
            .for_each(|(r, row_dst)| {
                let src_rows = self
                    .offsets_y
                    .iter()
                    .map(|&off| self.border.map(r as isize + off, rows))
                    .collect::<Vec<_>>();

                for (i, dst_val) in row_dst.iter_mut().enumerate() {
                    let acc = self
                        .kernel_y
                        .iter()
                        .zip(src_rows.iter())
                        .map(|(&k, &y)| temp[y * cols * C + i] * k)
                        .sum::<f32>();
                    *dst_val = D::from_f32(acc);
                }
            });
    }
}

/// Apply a separable filter to an image.
///
/// The kernels are applied as correlations, horizontal first, and the border is
/// extrapolated with `border`.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_x` - The horizontal kernel.
/// * `kernel_y` - The vertical kernel.
/// * `border` - The border extrapolation mode.
///
/// # Errors
///
/// Fails if a kernel is empty or the images differ in size.
pub fn separable_filter<S, D, const C: usize>(
    src: &Image<S, C>,
    dst: &mut Image<D, C>,
    kernel_x: &[f32],
    kernel_y: &[f32],
    border: BorderMode,
) -> Result<(), ImageError>
where
    S: FloatConversion + Send + Sync,
    D: FloatConversion + Send + Sync,
{
    if kernel_x.is_empty() || kernel_y.is_empty() {
        return Err(ImageError::InvalidKernelSize(kernel_x.len(), kernel_y.len()));
    }

    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    if src.is_empty() {
        return Ok(());
    }

    SeparableFilter::new(kernel_x, kernel_y, border).apply(src, dst);

    Ok(())
}
