use rayon::prelude::*;
use tilecv_image::{Image, ImageError};

use super::{kernels, separable_filter, FloatConversion};
use crate::border::BorderMode;

/// Axis of a first order image derivative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientAxis {
    /// Derivative along the columns (responds to vertical edges).
    X,
    /// Derivative along the rows (responds to horizontal edges).
    Y,
}

fn check_odd_kernel(kernel_size: (usize, usize)) -> Result<(), ImageError> {
    if kernel_size.0 % 2 == 0 || kernel_size.1 % 2 == 0 {
        return Err(ImageError::InvalidKernelSize(kernel_size.0, kernel_size.1));
    }
    Ok(())
}

/// Blur an image using a box blur filter
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_size` - The size of the kernel (kernel_x, kernel_y).
///
/// PRECONDITION: `src` and `dst` must have the same shape.
pub fn box_blur<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    kernel_size: (usize, usize),
) -> Result<(), ImageError>
where
    T: FloatConversion + Send + Sync,
{
    check_odd_kernel(kernel_size)?;
    let kernel_x = kernels::box_blur_kernel_1d(kernel_size.0);
    let kernel_y = kernels::box_blur_kernel_1d(kernel_size.1);
    separable_filter(src, dst, &kernel_x, &kernel_y, BorderMode::Reflect101)
}

/// Blur an image using a gaussian blur filter
///
/// A non-positive sigma is derived from the kernel size of its axis, see
/// [`kernels::gaussian_kernel_1d_from_size`]. The border is reflected (reflect-101).
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_size` - The size of the kernel (kernel_x, kernel_y), both odd.
/// * `sigma` - The sigma of the gaussian kernel, xy-ordered.
///
/// # Example
///
/// ```
/// use tilecv_image::Image;
/// use tilecv_imgproc::filter::gaussian_blur;
///
/// let src = Image::<u8, 3>::from_size_val([60, 8].into(), 90).unwrap();
/// let mut dst = Image::<u8, 3>::from_size_val(src.size(), 0).unwrap();
///
/// gaussian_blur(&src, &mut dst, (55, 3), (0.0, 0.0)).unwrap();
/// assert!(dst.as_slice().iter().all(|&v| v == 90));
/// ```
pub fn gaussian_blur<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    kernel_size: (usize, usize),
    sigma: (f32, f32),
) -> Result<(), ImageError>
where
    T: FloatConversion + Send + Sync,
{
    check_odd_kernel(kernel_size)?;

    let kernel_1d = |size: usize, sigma: f32| {
        if sigma > 0.0 {
            kernels::gaussian_kernel_1d(size, sigma)
        } else {
            kernels::gaussian_kernel_1d_from_size(size)
        }
    };

    let kernel_x = kernel_1d(kernel_size.0, sigma.0);
    let kernel_y = kernel_1d(kernel_size.1, sigma.1);
    separable_filter(src, dst, &kernel_x, &kernel_y, BorderMode::Reflect101)
}

/// Compute the 3x3 sobel derivative of an image along one axis.
///
/// The response is signed; use a signed or float destination to keep negative gradients.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `axis` - The derivative direction.
/// * `border` - The border extrapolation mode.
pub fn sobel<S, D, const C: usize>(
    src: &Image<S, C>,
    dst: &mut Image<D, C>,
    axis: GradientAxis,
    border: BorderMode,
) -> Result<(), ImageError>
where
    S: FloatConversion + Send + Sync,
    D: FloatConversion + Send + Sync,
{
    let (derivative, smooth) = kernels::sobel_kernel_1d();
    match axis {
        GradientAxis::X => separable_filter(src, dst, &derivative, &smooth, border),
        GradientAxis::Y => separable_filter(src, dst, &smooth, &derivative, border),
    }
}

/// Compute the laplacian of an image with a 3x3 aperture.
///
/// Equivalent to correlating with the kernel
///
/// ```text
/// 2  0  2
/// 0 -8  0
/// 2  0  2
/// ```
///
/// evaluated as the sum of two separable second derivatives with reflect-101 borders.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
pub fn laplacian<S, D, const C: usize>(
    src: &Image<S, C>,
    dst: &mut Image<D, C>,
) -> Result<(), ImageError>
where
    S: FloatConversion + Send + Sync,
    D: FloatConversion + Send + Sync,
{
    let second = kernels::second_derivative_kernel_1d();
    let (_, smooth) = kernels::sobel_kernel_1d();

    let mut d2x = Image::<f32, C>::from_size_val(src.size(), 0.0)?;
    separable_filter(src, &mut d2x, &second, &smooth, BorderMode::Reflect101)?;

    let mut d2y = Image::<f32, C>::from_size_val(src.size(), 0.0)?;
    separable_filter(src, &mut d2y, &smooth, &second, BorderMode::Reflect101)?;

    if dst.size() != src.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    dst.as_slice_mut()
        .par_iter_mut()
        .zip(d2x.as_slice().par_iter())
        .zip(d2y.as_slice().par_iter())
        .for_each(|((dst, &xx), &yy)| {
            *dst = D::from_f32(xx + yy);
        });

    Ok(())
}

/// Apply a median filter with a square window.
///
/// The border is replicated. Each channel is filtered independently.
///
/// # Arguments
///
/// * `src` - The source image with shape (H, W, C).
/// * `dst` - The destination image with shape (H, W, C).
/// * `kernel_size` - The side of the window, odd.
pub fn median_blur<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    kernel_size: usize,
) -> Result<(), ImageError> {
    check_odd_kernel((kernel_size, kernel_size))?;

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
    if cols == 0 || rows == 0 {
        return Ok(());
    }

    let half = (kernel_size / 2) as isize;
    let src_data = src.as_slice();

    dst.as_slice_mut()
        .par_chunks_exact_mut(cols * C)
        .enumerate()
        .for_each(|(r, row_dst)| {
            let mut window = Vec::with_capacity(kernel_size * kernel_size);
            for c in 0..cols {
                for ch in 0..C {
                    window.clear();
                    for dy in -half..=half {
                        let y = BorderMode::Replicate.map(r as isize + dy, rows);
                        for dx in -half..=half {
                            let x = BorderMode::Replicate.map(c as isize + dx, cols);
                            window.push(src_data[(y * cols + x) * C + ch]);
                        }
                    }
                    let mid = window.len() / 2;
                    let (_, median, _) = window.select_nth_unstable(mid);
                    row_dst[c * C + ch] = *median;
                }
            }
        });

    Ok(())
}
