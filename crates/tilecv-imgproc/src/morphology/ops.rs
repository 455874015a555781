use num_traits::Bounded;
use rayon::prelude::*;
use tilecv_image::{Image, ImageError};

use super::kernels::Kernel;

#[derive(Clone, Copy)]
enum MorphOp {
    Dilate,
    Erode,
}

impl MorphOp {
    fn identity<T: Bounded>(self) -> T {
        match self {
            MorphOp::Dilate => T::min_value(),
            MorphOp::Erode => T::max_value(),
        }
    }

    #[inline]
    fn combine<T: Ord>(self, a: T, b: T) -> T {
        match self {
            MorphOp::Dilate => a.max(b),
            MorphOp::Erode => a.min(b),
        }
    }
}

/// Dilate an image using a [`Kernel`].
///
/// Dilation expands bright regions in the image. Each pixel is replaced by the maximum
/// value in the neighborhood defined by the kernel. Neighbours outside the image are
/// ignored.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `dst` - The destination image (will be overwritten).
/// * `kernel` - The morphological structuring element ([`Kernel`]).
///
/// # Example
///
/// ```
/// use tilecv_image::Image;
/// use tilecv_imgproc::morphology::{dilate, Kernel, KernelShape};
///
/// let mut src = Image::<u8, 1>::from_size_val([5, 5].into(), 0).unwrap();
/// src.as_slice_mut()[12] = 255;
///
/// let kernel = Kernel::new(KernelShape::Box { width: 3, height: 3 }).unwrap();
/// let mut dst = Image::<u8, 1>::from_size_val(src.size(), 0).unwrap();
///
/// dilate(&src, &mut dst, &kernel).unwrap();
/// assert_eq!(dst.as_slice().iter().filter(|&&v| v == 255).count(), 9);
/// ```
pub fn dilate<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    kernel: &Kernel,
) -> Result<(), ImageError>
where
    T: Copy + Ord + Bounded + Send + Sync,
{
    morphology(src, dst, kernel, MorphOp::Dilate)
}

/// Erode an image using a [`Kernel`].
///
/// Erosion shrinks bright regions in the image. Each pixel is replaced by the minimum
/// value in the neighborhood defined by the kernel. Neighbours outside the image are
/// ignored.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `dst` - The destination image (will be overwritten).
/// * `kernel` - The morphological structuring element ([`Kernel`]).
pub fn erode<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    kernel: &Kernel,
) -> Result<(), ImageError>
where
    T: Copy + Ord + Bounded + Send + Sync,
{
    morphology(src, dst, kernel, MorphOp::Erode)
}

fn morphology<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    kernel: &Kernel,
    op: MorphOp,
) -> Result<(), ImageError>
where
    T: Copy + Ord + Bounded + Send + Sync,
{
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

    let row_len = cols * C;
    let half_widths = kernel.half_widths();
    let max_half = half_widths.iter().copied().max().unwrap_or(0);

    // runs[h] holds the extremum over the horizontal window [x - h, x + h]
    let mut runs: Vec<Vec<T>> = Vec::with_capacity(max_half + 1);
    runs.push(src.as_slice().to_vec());
    for h in 1..=max_half {
        let prev = &runs[h - 1];
        let mut next = prev.clone();
        next.par_chunks_exact_mut(row_len)
            .zip(src.as_slice().par_chunks_exact(row_len))
            .for_each(|(row_next, row_src)| {
                for x in 0..cols {
                    for ch in 0..C {
                        let idx = x * C + ch;
                        if x >= h {
                            row_next[idx] = op.combine(row_next[idx], row_src[idx - h * C]);
                        }
                        if x + h < cols {
                            row_next[idx] = op.combine(row_next[idx], row_src[idx + h * C]);
                        }
                    }
                }
            });
        runs.push(next);
    }

    let (pad_y, _) = kernel.pad();
    dst.as_slice_mut()
        .par_chunks_exact_mut(row_len)
        .enumerate()
        .for_each(|(y, row_dst)| {
            row_dst.fill(op.identity());
            for (ky, &half) in half_widths.iter().enumerate() {
                let sy = y as isize + ky as isize - pad_y as isize;
                if sy < 0 || sy >= rows as isize {
                    continue;
                }
                let start = sy as usize * row_len;
                let row_run = &runs[half][start..start + row_len];
                row_dst
                    .iter_mut()
                    .zip(row_run.iter())
                    .for_each(|(d, &s)| *d = op.combine(*d, s));
            }
        });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morphology::KernelShape;

    // dense reference: ignore out-of-image neighbours
    fn reference(src: &Image<u8, 1>, kernel: &Kernel, dilation: bool) -> Vec<u8> {
        let mask = kernel.to_mask();
        let (pad_y, pad_x) = kernel.pad();
        let mut out = vec![0u8; src.as_slice().len()];
        for y in 0..src.rows() {
            for x in 0..src.cols() {
                let mut acc = if dilation { 0u8 } else { 255u8 };
                for ky in 0..kernel.height() {
                    for kx in 0..kernel.width() {
                        if mask[ky * kernel.width() + kx] == 0 {
                            continue;
                        }
                        let sy = y as isize + ky as isize - pad_y as isize;
                        let sx = x as isize + kx as isize - pad_x as isize;
                        if sy < 0 || sx < 0 {
                            continue;
                        }
                        if let Some(&v) = src.get([sy as usize, sx as usize, 0]) {
                            acc = if dilation { acc.max(v) } else { acc.min(v) };
                        }
                    }
                }
                out[y * src.cols() + x] = acc;
            }
        }
        out
    }

    #[test]
    fn test_dilate_box() -> Result<(), ImageError> {
        let mut src = Image::<u8, 1>::from_size_val([5, 5].into(), 0)?;
        src.as_slice_mut()[12] = 255;

        let kernel = Kernel::new(KernelShape::Box {
            width: 3,
            height: 3,
        })?;
        let mut dst = Image::<u8, 1>::from_size_val(src.size(), 0)?;
        dilate(&src, &mut dst, &kernel)?;

        #[rustfmt::skip]
        assert_eq!(
            dst.as_slice(),
            &[
                0, 0, 0, 0, 0,
                0, 255, 255, 255, 0,
                0, 255, 255, 255, 0,
                0, 255, 255, 255, 0,
                0, 0, 0, 0, 0,
            ]
        );
        Ok(())
    }

    #[test]
    fn test_erode_ignores_border() -> Result<(), ImageError> {
        let src = Image::<u8, 1>::from_size_val([4, 4].into(), 200)?;
        let kernel = Kernel::new(KernelShape::Box {
            width: 7,
            height: 7,
        })?;
        let mut dst = Image::<u8, 1>::from_size_val(src.size(), 0)?;
        erode(&src, &mut dst, &kernel)?;
        assert_eq!(dst.as_slice(), src.as_slice());
        Ok(())
    }

    #[test]
    fn test_matches_reference() -> Result<(), ImageError> {
        let data = (0..12 * 9).map(|i| ((i * 97 + 13) % 251) as u8).collect();
        let src = Image::<u8, 1>::new([12, 9].into(), data)?;
        let mut dst = Image::<u8, 1>::from_size_val(src.size(), 0)?;

        let ellipse = Kernel::new(KernelShape::Ellipse {
            width: 7,
            height: 5,
        })?;
        dilate(&src, &mut dst, &ellipse)?;
        assert_eq!(dst.as_slice(), reference(&src, &ellipse, true).as_slice());

        let rect = Kernel::new(KernelShape::Box {
            width: 3,
            height: 5,
        })?;
        erode(&src, &mut dst, &rect)?;
        assert_eq!(dst.as_slice(), reference(&src, &rect, false).as_slice());

        Ok(())
    }

    #[test]
    fn test_dilate_multichannel() -> Result<(), ImageError> {
        let src = Image::<u8, 3>::new([3, 1].into(), vec![10, 0, 0, 0, 20, 0, 0, 0, 30])?;
        let kernel = Kernel::new(KernelShape::Box {
            width: 3,
            height: 1,
        })?;
        let mut dst = Image::<u8, 3>::from_size_val(src.size(), 0)?;
        dilate(&src, &mut dst, &kernel)?;
        assert_eq!(dst.as_slice(), &[10, 20, 0, 10, 20, 30, 0, 20, 30]);
        Ok(())
    }
}
