use fast_image_resize as fr;
use tilecv_image::{Image, ImageError};

/// Interpolation mode for the resize operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationMode {
    /// Nearest neighbour interpolation.
    Nearest,
    /// Bilinear interpolation.
    #[default]
    Bilinear,
}

fn pixel_type<const C: usize>() -> Result<fr::PixelType, ImageError> {
    match C {
        1 => Ok(fr::PixelType::U8),
        3 => Ok(fr::PixelType::U8x3),
        4 => Ok(fr::PixelType::U8x4),
        _ => Err(ImageError::ResizeError(format!(
            "unsupported number of channels: {C}"
        ))),
    }
}

/// Resize an image to the size of `dst` using the
/// [fast_image_resize](https://crates.io/crates/fast_image_resize) crate.
///
/// Supports 8-bit images with 1, 3 or 4 channels.
///
/// # Arguments
///
/// * `src` - The input image container.
/// * `dst` - The output image container, already allocated with the new size.
/// * `interpolation` - The interpolation mode to use.
///
/// # Example
///
/// ```
/// use tilecv_image::{Image, ImageSize};
/// use tilecv_imgproc::resize::{resize_fast, InterpolationMode};
///
/// let image = Image::<_, 3>::new(
///     ImageSize {
///         width: 4,
///         height: 5,
///     },
///     vec![0u8; 4 * 5 * 3],
/// )
/// .unwrap();
///
/// let new_size = ImageSize {
///     width: 2,
///     height: 3,
/// };
///
/// let mut image_resized = Image::<_, 3>::from_size_val(new_size, 0).unwrap();
///
/// resize_fast(&image, &mut image_resized, InterpolationMode::Bilinear).unwrap();
///
/// assert_eq!(image_resized.size().width, 2);
/// assert_eq!(image_resized.size().height, 3);
/// ```
///
/// # Errors
///
/// The function returns an error if either image is empty or the backend rejects the
/// buffers.
pub fn resize_fast<const C: usize>(
    src: &Image<u8, C>,
    dst: &mut Image<u8, C>,
    interpolation: InterpolationMode,
) -> Result<(), ImageError> {
    if src.is_empty() || dst.is_empty() {
        return Err(ImageError::ImageDataNotInitialized);
    }

    // same size, nothing to interpolate
    if src.size() == dst.size() {
        dst.as_slice_mut().copy_from_slice(src.as_slice());
        return Ok(());
    }

    let pixel_type = pixel_type::<C>()?;

    let src_image = fr::images::ImageRef::new(
        src.width() as u32,
        src.height() as u32,
        src.as_slice(),
        pixel_type,
    )
    .map_err(|e| ImageError::ResizeError(e.to_string()))?;

    let (dst_width, dst_height) = (dst.width() as u32, dst.height() as u32);
    let mut dst_image =
        fr::images::Image::from_slice_u8(dst_width, dst_height, dst.as_slice_mut(), pixel_type)
            .map_err(|e| ImageError::ResizeError(e.to_string()))?;

    let alg = match interpolation {
        InterpolationMode::Bilinear => fr::ResizeAlg::Convolution(fr::FilterType::Bilinear),
        InterpolationMode::Nearest => fr::ResizeAlg::Nearest,
    };
    let options = fr::ResizeOptions::new().resize_alg(alg);

    fr::Resizer::new()
        .resize(&src_image, &mut dst_image, &options)
        .map_err(|e| ImageError::ResizeError(e.to_string()))?;

    Ok(())
}

/// Allocate a new image of `size` holding the resized `src`.
pub fn resize_to<const C: usize>(
    src: &Image<u8, C>,
    size: tilecv_image::ImageSize,
    interpolation: InterpolationMode,
) -> Result<Image<u8, C>, ImageError> {
    let mut dst = Image::from_size_val(size, 0)?;
    resize_fast(src, &mut dst, interpolation)?;
    Ok(dst)
}
