use rayon::prelude::*;
use tilecv_image::{Image, ImageError};

use crate::parallel;

/// Compute the pixel intensity histogram of an image.
///
/// NOTE: this is limited to 8-bit 1-channel images. Counts are added to `hist`.
///
/// # Arguments
///
/// * `src` - The input image to compute the histogram.
/// * `hist` - The output histogram.
/// * `num_bins` - The number of bins to use for the histogram.
///
/// # Errors
///
/// Returns an error if the number of bins is invalid.
///
/// # Example
///
/// ```
/// use tilecv_image::{Image, ImageSize};
/// use tilecv_imgproc::histogram::compute_histogram;
///
/// let image = Image::<u8, 1>::new(
///   ImageSize {
///     width: 3,
///     height: 3,
///   },
///   vec![0, 2, 4, 128, 130, 132, 254, 255, 255],
/// ).unwrap();
///
/// let mut histogram = vec![0; 3];
///
/// compute_histogram(&image, &mut histogram, 3).unwrap();
/// assert_eq!(histogram, vec![3, 3, 3]);
/// ```
pub fn compute_histogram(
    src: &Image<u8, 1>,
    hist: &mut [usize],
    num_bins: usize,
) -> Result<(), ImageError> {
    if num_bins == 0 || num_bins > 256 || hist.len() != num_bins {
        return Err(ImageError::InvalidHistogramBins(num_bins));
    }

    let mut bin_lut = [0usize; 256];
    for (i, bin) in bin_lut.iter_mut().enumerate() {
        *bin = (i * num_bins) >> 8;
    }

    let counts = src
        .as_slice()
        .par_chunks(4096)
        .fold(
            || vec![0usize; num_bins],
            |mut local, chunk| {
                for &px in chunk {
                    local[bin_lut[px as usize]] += 1;
                }
                local
            },
        )
        .reduce(
            || vec![0usize; num_bins],
            |mut a, b| {
                a.iter_mut().zip(b.iter()).for_each(|(a, b)| *a += b);
                a
            },
        );

    hist.iter_mut()
        .zip(counts.iter())
        .for_each(|(h, c)| *h += c);

    Ok(())
}

/// Equalize the histogram of a grayscale image.
///
/// Intensities are remapped through the normalized cumulative histogram so that the lowest
/// present intensity becomes 0 and the highest becomes 255. An image holding a single
/// intensity is copied unchanged.
///
/// # Arguments
///
/// * `src` - The input grayscale image.
/// * `dst` - The output grayscale image.
///
/// # Example
///
/// ```
/// use tilecv_image::Image;
/// use tilecv_imgproc::histogram::equalize_histogram;
///
/// let image = Image::<u8, 1>::new([4, 1].into(), vec![0, 0, 1, 2]).unwrap();
/// let mut equalized = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// equalize_histogram(&image, &mut equalized).unwrap();
/// assert_eq!(equalized.as_slice(), &[0, 0, 128, 255]);
/// ```
pub fn equalize_histogram(src: &Image<u8, 1>, dst: &mut Image<u8, 1>) -> Result<(), ImageError> {
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let total = src.as_slice().len();
    if total == 0 {
        return Ok(());
    }

    let mut hist = vec![0usize; 256];
    compute_histogram(src, &mut hist, 256)?;

    // first populated bin
    let first = hist.iter().position(|&count| count > 0).unwrap_or(0);
    if hist[first] == total {
        dst.as_slice_mut().copy_from_slice(src.as_slice());
        return Ok(());
    }

    let scale = 255.0 / (total - hist[first]) as f32;
    let mut lut = [0u8; 256];
    let mut sum = 0usize;
    for i in first + 1..256 {
        sum += hist[i];
        lut[i] = (sum as f32 * scale).round().clamp(0.0, 255.0) as u8;
    }

    parallel::par_iter_rows_val(src, dst, |src_pixel, dst_pixel| {
        *dst_pixel = lut[*src_pixel as usize];
    });

    Ok(())
}
