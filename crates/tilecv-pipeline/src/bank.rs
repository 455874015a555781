use tilecv_image::{Image, ImageError};
use tilecv_imgproc::{
    border::BorderMode,
    canny::canny,
    color::gray_from_rgb_u8,
    filter::{gaussian_blur, laplacian, median_blur, sobel, GradientAxis},
    histogram::equalize_histogram,
    morphology::{dilate, erode, Kernel, KernelShape},
    normalize::normalize_min_max,
    threshold::otsu_threshold,
};

use crate::config::FilterParams;
use crate::error::PipelineError;
use crate::frame::{NamedFrameSet, TransformKind};

/// The fixed battery of transforms.
///
/// The structuring elements are built once; everything else is computed per frame. Every
/// output is a newly allocated frame with the size of the input.
///
/// # Examples
///
/// ```
/// use tilecv_image::Image;
/// use tilecv_pipeline::{FilterParams, TransformBank};
///
/// let bank = TransformBank::new().unwrap();
/// let frame = Image::<u8, 3>::from_size_val([32, 24].into(), 100).unwrap();
///
/// let frames = bank.apply(&frame, FilterParams::default()).unwrap();
/// assert_eq!(frames.len(), 12);
/// assert!(frames.iter().all(|named| named.frame.size() == frame.size()));
/// ```
#[derive(Debug, Clone)]
pub struct TransformBank {
    dilate_kernel: Kernel,
    erode_kernel: Kernel,
}

impl TransformBank {
    /// Creates the bank and its structuring elements.
    pub fn new() -> Result<Self, ImageError> {
        Ok(Self {
            dilate_kernel: Kernel::new(KernelShape::Ellipse {
                width: 17,
                height: 17,
            })?,
            erode_kernel: Kernel::new(KernelShape::Box {
                width: 7,
                height: 7,
            })?,
        })
    }

    /// Runs every transform on `frame`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyFrame`] if the frame has no pixels.
    pub fn apply(
        &self,
        frame: &Image<u8, 3>,
        params: FilterParams,
    ) -> Result<NamedFrameSet, PipelineError> {
        if frame.is_empty() {
            return Err(PipelineError::EmptyFrame);
        }

        let size = frame.size();

        // shared by the intensity transforms
        let mut gray = Image::<u8, 1>::from_size_val(size, 0)?;
        gray_from_rgb_u8(frame, &mut gray)?;

        let mut frames = NamedFrameSet::with_capacity(TransformKind::ALL.len());
        frames.push(TransformKind::Original, frame.clone());

        let mut blur_3x3 = Image::<u8, 3>::from_size_val(size, 0)?;
        gaussian_blur(frame, &mut blur_3x3, (3, 3), (0.0, 0.0))?;
        frames.push(TransformKind::GaussianBlur3x3, blur_3x3);

        let mut blur_55x3 = Image::<u8, 3>::from_size_val(size, 0)?;
        gaussian_blur(frame, &mut blur_55x3, (55, 3), (0.0, 0.0))?;
        frames.push(TransformKind::GaussianBlur55x3, blur_55x3);

        let mut median = Image::<u8, 3>::from_size_val(size, 0)?;
        median_blur(frame, &mut median, 3)?;
        frames.push(TransformKind::MedianBlur3x3, median);

        let mut response = Image::<i16, 1>::from_size_val(size, 0)?;

        laplacian(&gray, &mut response)?;
        frames.push(TransformKind::Laplace, rescale(&response)?);

        sobel(&gray, &mut response, GradientAxis::X, BorderMode::Reflect101)?;
        frames.push(TransformKind::SobelX, rescale(&response)?);

        sobel(&gray, &mut response, GradientAxis::Y, BorderMode::Reflect101)?;
        frames.push(TransformKind::SobelY, rescale(&response)?);

        let mut dilated = Image::<u8, 3>::from_size_val(size, 0)?;
        dilate(frame, &mut dilated, &self.dilate_kernel)?;
        frames.push(TransformKind::Dilate, dilated);

        let mut eroded = Image::<u8, 3>::from_size_val(size, 0)?;
        erode(frame, &mut eroded, &self.erode_kernel)?;
        frames.push(TransformKind::Erode, eroded);

        let mut binary = Image::<u8, 1>::from_size_val(size, 0)?;
        let level = otsu_threshold(&gray, &mut binary, 255)?;
        log::trace!("otsu level: {level}");
        frames.push(TransformKind::BinaryOtsu, binary);

        let mut equalized = Image::<u8, 1>::from_size_val(size, 0)?;
        equalize_histogram(&gray, &mut equalized)?;
        frames.push(TransformKind::EqHist, equalized);

        let mut edges = Image::<u8, 1>::from_size_val(size, 0)?;
        canny(
            frame,
            &mut edges,
            params.canny_lower() as f32,
            params.canny_upper() as f32,
        )?;
        frames.push(TransformKind::Canny, edges);

        Ok(frames)
    }
}

// min-max rescale of a signed response to the full 8-bit range
fn rescale(response: &Image<i16, 1>) -> Result<Image<u8, 1>, ImageError> {
    let mut dst = Image::<u8, 1>::from_size_val(response.size(), 0)?;
    normalize_min_max(response, &mut dst, 0.0, 255.0)?;
    Ok(dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;

    // horizontal ramp with a bright square in the middle
    fn test_frame(width: usize, height: usize) -> Result<Image<u8, 3>, ImageError> {
        let mut data = Vec::with_capacity(width * height * 3);
        for y in 0..height {
            for x in 0..width {
                let inside = (width / 4..3 * width / 4).contains(&x)
                    && (height / 4..3 * height / 4).contains(&y);
                let v = if inside { 230 } else { (x * 100 / width) as u8 };
                data.extend_from_slice(&[v, v / 2, 255 - v]);
            }
        }
        Image::new([width, height].into(), data)
    }

    fn gray(frames: &NamedFrameSet, kind: TransformKind) -> &Image<u8, 1> {
        match frames.get(kind) {
            Some(Frame::Gray(img)) => img,
            other => panic!("{kind} is not a gray frame: {other:?}"),
        }
    }

    #[test]
    fn test_bank_order_and_sizes() -> Result<(), PipelineError> {
        let bank = TransformBank::new()?;
        let frame = test_frame(40, 30)?;

        let frames = bank.apply(&frame, FilterParams::default())?;

        let kinds: Vec<TransformKind> = frames.iter().map(|named| named.kind).collect();
        assert_eq!(kinds, TransformKind::ALL);
        assert!(frames.iter().all(|named| named.frame.size() == frame.size()));
        assert_eq!(frames.get(TransformKind::Original), Some(&Frame::Color(frame)));

        Ok(())
    }

    #[test]
    fn test_bank_channel_depths() -> Result<(), PipelineError> {
        let bank = TransformBank::new()?;
        let frames = bank.apply(&test_frame(20, 20)?, FilterParams::default())?;

        let depths: Vec<usize> = frames
            .iter()
            .map(|named| named.frame.num_channels())
            .collect();
        assert_eq!(depths, vec![3, 3, 3, 3, 1, 1, 1, 3, 3, 1, 1, 1]);

        Ok(())
    }

    #[test]
    fn test_gradients_span_full_range() -> Result<(), PipelineError> {
        let bank = TransformBank::new()?;
        let frames = bank.apply(&test_frame(40, 30)?, FilterParams::default())?;

        for kind in [
            TransformKind::Laplace,
            TransformKind::SobelX,
            TransformKind::SobelY,
        ] {
            let img = gray(&frames, kind);
            let min = img.as_slice().iter().min().copied();
            let max = img.as_slice().iter().max().copied();
            assert_eq!((min, max), (Some(0), Some(255)), "{kind}");
        }

        Ok(())
    }

    #[test]
    fn test_otsu_is_binary() -> Result<(), PipelineError> {
        let bank = TransformBank::new()?;
        let frames = bank.apply(&test_frame(40, 30)?, FilterParams::default())?;

        let binary = gray(&frames, TransformKind::BinaryOtsu);
        assert!(binary.as_slice().iter().all(|&v| v == 0 || v == 255));
        assert!(binary.as_slice().contains(&255));

        Ok(())
    }

    #[test]
    fn test_canny_follows_params() -> Result<(), PipelineError> {
        let bank = TransformBank::new()?;
        let frame = test_frame(40, 30)?;

        let count = |params| -> Result<usize, PipelineError> {
            let frames = bank.apply(&frame, params)?;
            Ok(gray(&frames, TransformKind::Canny)
                .as_slice()
                .iter()
                .filter(|&&v| v == 255)
                .count())
        };

        let loose = count(FilterParams::new(50, 150))?;
        let strict = count(FilterParams::new(900, 1000))?;
        assert!(loose > 0);
        assert!(strict <= loose);

        Ok(())
    }

    #[test]
    fn test_empty_frame() -> Result<(), ImageError> {
        let bank = TransformBank::new()?;
        let frame = Image::<u8, 3>::new([0, 0].into(), vec![])?;
        assert!(matches!(
            bank.apply(&frame, FilterParams::default()),
            Err(PipelineError::EmptyFrame)
        ));
        Ok(())
    }
}
