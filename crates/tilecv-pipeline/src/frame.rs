use tilecv_image::{Image, ImageError, ImageSize};
use tilecv_imgproc::color::rgb_from_gray;

/// The transforms of the bank, in tiling order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformKind {
    /// Copy of the input frame.
    Original,
    /// Gaussian smoothing with a 3x3 kernel.
    GaussianBlur3x3,
    /// Gaussian smoothing with a 55 wide, 3 tall kernel.
    GaussianBlur55x3,
    /// Median filter with a 3x3 window.
    MedianBlur3x3,
    /// Rescaled laplacian of the grayscale frame.
    Laplace,
    /// Rescaled horizontal sobel derivative of the grayscale frame.
    SobelX,
    /// Rescaled vertical sobel derivative of the grayscale frame.
    SobelY,
    /// Dilation with a 17x17 ellipse.
    Dilate,
    /// Erosion with a 7x7 box.
    Erode,
    /// Otsu binarization of the grayscale frame.
    BinaryOtsu,
    /// Histogram equalization of the grayscale frame.
    EqHist,
    /// Canny edge map of the color frame.
    Canny,
}

impl TransformKind {
    /// Every transform, in declaration order.
    pub const ALL: [TransformKind; 12] = [
        TransformKind::Original,
        TransformKind::GaussianBlur3x3,
        TransformKind::GaussianBlur55x3,
        TransformKind::MedianBlur3x3,
        TransformKind::Laplace,
        TransformKind::SobelX,
        TransformKind::SobelY,
        TransformKind::Dilate,
        TransformKind::Erode,
        TransformKind::BinaryOtsu,
        TransformKind::EqHist,
        TransformKind::Canny,
    ];

    /// The label burned on the tile.
    pub fn name(&self) -> &'static str {
        match self {
            TransformKind::Original => "original",
            TransformKind::GaussianBlur3x3 => "gaussianblur_3x3",
            TransformKind::GaussianBlur55x3 => "gaussianblur_55x3",
            TransformKind::MedianBlur3x3 => "medianblur_3x3",
            TransformKind::Laplace => "laplace",
            TransformKind::SobelX => "sobelx",
            TransformKind::SobelY => "sobely",
            TransformKind::Dilate => "dilate",
            TransformKind::Erode => "erode",
            TransformKind::BinaryOtsu => "binaryotsu",
            TransformKind::EqHist => "eqhist",
            TransformKind::Canny => "canny",
        }
    }
}

impl std::fmt::Display for TransformKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// An 8-bit frame, either intensity or RGB.
#[derive(Debug, Clone, PartialEq)]
pub enum Frame {
    /// A single channel frame.
    Gray(Image<u8, 1>),
    /// A three channel RGB frame.
    Color(Image<u8, 3>),
}

impl Frame {
    /// The size of the frame in pixels.
    pub fn size(&self) -> ImageSize {
        match self {
            Frame::Gray(img) => img.size(),
            Frame::Color(img) => img.size(),
        }
    }

    /// The number of channels, 1 or 3.
    pub fn num_channels(&self) -> usize {
        match self {
            Frame::Gray(_) => 1,
            Frame::Color(_) => 3,
        }
    }

    /// The frame as RGB, replicating the intensity of gray frames.
    pub fn to_rgb(&self) -> Result<Image<u8, 3>, ImageError> {
        match self {
            Frame::Gray(img) => {
                let mut rgb = Image::from_size_val(img.size(), 0)?;
                rgb_from_gray(img, &mut rgb)?;
                Ok(rgb)
            }
            Frame::Color(img) => Ok(img.clone()),
        }
    }
}

impl From<Image<u8, 1>> for Frame {
    fn from(img: Image<u8, 1>) -> Self {
        Frame::Gray(img)
    }
}

impl From<Image<u8, 3>> for Frame {
    fn from(img: Image<u8, 3>) -> Self {
        Frame::Color(img)
    }
}

/// A frame tagged with the transform that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedFrame {
    /// The producing transform.
    pub kind: TransformKind,
    /// The pixels.
    pub frame: Frame,
}

impl NamedFrame {
    /// The label of the frame.
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

/// The ordered output of one bank run. Order is tiling order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NamedFrameSet {
    frames: Vec<NamedFrame>,
}

impl NamedFrameSet {
    /// Creates an empty set with room for `capacity` frames.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            frames: Vec::with_capacity(capacity),
        }
    }

    /// Appends a frame at the end.
    pub fn push(&mut self, kind: TransformKind, frame: impl Into<Frame>) {
        self.frames.push(NamedFrame {
            kind,
            frame: frame.into(),
        });
    }

    /// Number of frames.
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Returns true if the set holds no frame.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Iterates over the frames in order.
    pub fn iter(&self) -> std::slice::Iter<'_, NamedFrame> {
        self.frames.iter()
    }

    /// Iterates mutably over the frames in order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, NamedFrame> {
        self.frames.iter_mut()
    }

    /// The frame produced by `kind`, if any.
    pub fn get(&self, kind: TransformKind) -> Option<&Frame> {
        self.frames
            .iter()
            .find(|named| named.kind == kind)
            .map(|named| &named.frame)
    }

    /// The frame produced by `kind`, mutably.
    pub fn get_mut(&mut self, kind: TransformKind) -> Option<&mut Frame> {
        self.frames
            .iter_mut()
            .find(|named| named.kind == kind)
            .map(|named| &mut named.frame)
    }

    /// The frames as a slice.
    pub fn as_slice(&self) -> &[NamedFrame] {
        &self.frames
    }
}

impl<'a> IntoIterator for &'a NamedFrameSet {
    type Item = &'a NamedFrame;
    type IntoIter = std::slice::Iter<'a, NamedFrame>;

    fn into_iter(self) -> Self::IntoIter {
        self.frames.iter()
    }
}

impl FromIterator<NamedFrame> for NamedFrameSet {
    fn from_iter<I: IntoIterator<Item = NamedFrame>>(iter: I) -> Self {
        Self {
            frames: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_unique() {
        let mut names: Vec<&str> = TransformKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names[0], "original");
        assert_eq!(names[11], "canny");
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 12);
    }

    #[test]
    fn test_gray_to_rgb() -> Result<(), ImageError> {
        let gray = Frame::from(Image::<u8, 1>::new([2, 1].into(), vec![7, 9])?);
        assert_eq!(gray.num_channels(), 1);
        let rgb = gray.to_rgb()?;
        assert_eq!(rgb.as_slice(), &[7, 7, 7, 9, 9, 9]);
        Ok(())
    }

    #[test]
    fn test_frame_set_lookup() -> Result<(), ImageError> {
        let mut set = NamedFrameSet::with_capacity(2);
        set.push(
            TransformKind::Original,
            Image::<u8, 3>::from_size_val([2, 2].into(), 1)?,
        );
        set.push(
            TransformKind::Canny,
            Image::<u8, 1>::from_size_val([2, 2].into(), 0)?,
        );

        assert_eq!(set.len(), 2);
        assert!(matches!(
            set.get(TransformKind::Canny),
            Some(Frame::Gray(_))
        ));
        assert!(set.get(TransformKind::Erode).is_none());
        Ok(())
    }
}
