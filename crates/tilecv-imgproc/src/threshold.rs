use num_traits::Zero;
use tilecv_image::{Image, ImageError};

use crate::{histogram, parallel};

/// Apply a binary threshold to an image.
///
/// # Arguments
///
/// * `src` - The input image of an arbitrary number of channels and type.
/// * `dst` - The output image of an arbitrary number of channels and type.
/// * `threshold` - The threshold value. Must be the same type as the image.
/// * `max_value` - The maximum value to use when the input value is greater than the threshold.
///
/// # Examples
///
/// ```
/// use tilecv_image::{Image, ImageSize};
/// use tilecv_imgproc::threshold::threshold_binary;
///
/// let data = vec![100u8, 200, 50, 150, 200, 250];
/// let image = Image::<_, 1>::new(ImageSize { width: 2, height: 3 }, data).unwrap();
///
/// let mut thresholded = Image::<_, 1>::from_size_val(image.size(), 0).unwrap();
///
/// threshold_binary(&image, &mut thresholded, 100, 255).unwrap();
/// assert_eq!(thresholded.as_slice(), &[0, 255, 0, 255, 255, 255]);
/// ```
pub fn threshold_binary<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    threshold: T,
    max_value: T,
) -> Result<(), ImageError>
where
    T: Copy + Send + Sync + PartialOrd + Zero,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    // run the thresholding operation in parallel
    parallel::par_iter_rows_val(src, dst, |src_pixel, dst_pixel| {
        *dst_pixel = if *src_pixel > threshold {
            max_value
        } else {
            T::zero()
        };
    });

    Ok(())
}

/// Find the threshold that maximizes the between-class variance of a 256-bin histogram.
///
/// Returns 0 when the histogram holds a single intensity.
pub fn otsu_level(hist: &[usize]) -> u8 {
    let total_pixels = hist.iter().sum::<usize>() as f64;
    let sum_total = hist
        .iter()
        .enumerate()
        .map(|(i, &count)| i as f64 * count as f64)
        .sum::<f64>();

    let mut best_variance = 0.0;
    let mut best_threshold = 0u8;

    let mut weight_back = 0.0;
    let mut sum_back = 0.0;

    for (current_threshold, &hist_count) in hist.iter().enumerate().take(256) {
        weight_back += hist_count as f64;
        sum_back += current_threshold as f64 * hist_count as f64;

        // skip empty classes
        if weight_back == 0.0 || weight_back == total_pixels {
            continue;
        }

        let weight_fore = total_pixels - weight_back;
        let mean_back = sum_back / weight_back;
        let mean_fore = (sum_total - sum_back) / weight_fore;

        let variance = weight_back * weight_fore * (mean_back - mean_fore).powi(2);

        if variance > best_variance {
            best_variance = variance;
            best_threshold = current_threshold as u8;
        }
    }

    best_threshold
}

/// Apply a binary threshold whose level is chosen with Otsu's method.
///
/// # Arguments
///
/// * `src` - The input grayscale image.
/// * `dst` - The output binary image, values in {0, max_value}.
/// * `max_value` - The value assigned to pixels above the threshold.
///
/// # Returns
///
/// The selected threshold.
///
/// # Examples
///
/// ```
/// use tilecv_image::{Image, ImageSize};
/// use tilecv_imgproc::threshold::otsu_threshold;
///
/// let data = vec![100u8, 200, 50, 150, 200, 250];
/// let image = Image::<_, 1>::new(
///     ImageSize {
///         width: 2,
///         height: 3,
///     },
///     data,
/// )
/// .unwrap();
///
/// let mut thresholded = Image::<_, 1>::from_size_val(image.size(), 0).unwrap();
///
/// let level = otsu_threshold(&image, &mut thresholded, 255).unwrap();
///
/// assert_eq!(level, 100);
/// assert_eq!(thresholded.as_slice(), [0, 255, 0, 255, 255, 255]);
/// ```
pub fn otsu_threshold(
    src: &Image<u8, 1>,
    dst: &mut Image<u8, 1>,
    max_value: u8,
) -> Result<u8, ImageError> {
    let mut hist = vec![0usize; 256];
    histogram::compute_histogram(src, &mut hist, 256)?;

    let level = otsu_level(&hist);
    threshold_binary(src, dst, level, max_value)?;

    Ok(level)
}
