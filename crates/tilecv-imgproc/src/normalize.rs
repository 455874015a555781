use tilecv_image::{Image, ImageError};

use crate::filter::FloatConversion;
use crate::parallel;

/// Find the minimum and maximum values in an image.
///
/// # Arguments
///
/// * `image` - The input image of shape (height, width, channels).
///
/// # Returns
///
/// A tuple containing the minimum and maximum values over all channels.
///
/// # Errors
///
/// If the image data is not initialized, an error is returned.
///
/// # Example
///
/// ```
/// use tilecv_image::{Image, ImageSize};
/// use tilecv_imgproc::normalize::find_min_max;
///
/// let image_data = vec![0u8, 1, 0, 1, 2, 3, 0, 1, 0, 1, 2, 3];
/// let image = Image::<u8, 3>::new(
///   ImageSize {
///     width: 2,
///     height: 2,
///   },
///   image_data,
/// )
/// .unwrap();
///
/// let (min, max) = find_min_max(&image).unwrap();
/// assert_eq!(min, 0);
/// assert_eq!(max, 3);
/// ```
pub fn find_min_max<T, const C: usize>(image: &Image<T, C>) -> Result<(T, T), ImageError>
where
    T: Copy + PartialOrd,
{
    // get the first element in the image
    let first_element = match image.as_slice().iter().next() {
        Some(x) => x,
        None => return Err(ImageError::ImageDataNotInitialized),
    };

    let mut min = first_element;
    let mut max = first_element;

    for x in image.as_slice().iter() {
        if x < min {
            min = x;
        }
        if x > max {
            max = x;
        }
    }

    Ok((*min, *max))
}

/// Linearly rescale an image so that its values span `[min, max]`.
///
/// The formula is:
///
/// dst = (src - src_min) * (max - min) / (src_max - src_min) + min
///
/// The statistics are taken over all channels. A constant image maps to `min`. Integer
/// destinations are rounded and saturated.
///
/// # Arguments
///
/// * `src` - The input image of shape (height, width, channels).
/// * `dst` - The output image of shape (height, width, channels).
/// * `min` - The lower bound of the output range.
/// * `max` - The upper bound of the output range.
///
/// # Example
///
/// ```
/// use tilecv_image::Image;
/// use tilecv_imgproc::normalize::normalize_min_max;
///
/// let image = Image::<i16, 1>::new([3, 1].into(), vec![-40, 0, 40]).unwrap();
/// let mut rescaled = Image::<u8, 1>::from_size_val(image.size(), 0).unwrap();
///
/// normalize_min_max(&image, &mut rescaled, 0.0, 255.0).unwrap();
/// assert_eq!(rescaled.as_slice(), &[0, 128, 255]);
/// ```
pub fn normalize_min_max<S, D, const C: usize>(
    src: &Image<S, C>,
    dst: &mut Image<D, C>,
    min: f32,
    max: f32,
) -> Result<(), ImageError>
where
    S: FloatConversion + Copy + PartialOrd + Send + Sync,
    D: FloatConversion + Send + Sync,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.cols(),
            src.rows(),
            dst.cols(),
            dst.rows(),
        ));
    }

    let (min_val, max_val) = find_min_max(src)?;
    let (min_val, max_val) = (min_val.to_f32(), max_val.to_f32());

    let range = max_val - min_val;
    let scale = if range > f32::EPSILON {
        (max - min) / range
    } else {
        0.0
    };
    let shift = min - min_val * scale;

    parallel::par_iter_rows_val(src, dst, |src_val, dst_val| {
        *dst_val = D::from_f32(src_val.to_f32() * scale + shift);
    });

    Ok(())
}
