use tilecv_image::{Image, ImageSize};

use crate::error::StreamError;

/// A source of RGB frames, read one at a time.
pub trait FrameSource {
    /// Read the next frame.
    ///
    /// Returns `Ok(None)` at the end of the stream.
    fn read_frame(&mut self) -> Result<Option<Image<u8, 3>>, StreamError>;

    /// Release the underlying device. Calling it more than once is a no-op.
    fn close(&mut self) -> Result<(), StreamError>;
}

/// A source producing a fixed number of solid-color frames.
///
/// # Examples
///
/// ```
/// use tilecv_io::{FrameSource, SyntheticSource};
///
/// let mut source = SyntheticSource::new([4, 2].into(), 1).with_color([1, 2, 3]);
///
/// let frame = source.read_frame().unwrap().unwrap();
/// assert_eq!(&frame.as_slice()[..3], &[1, 2, 3]);
/// assert!(source.read_frame().unwrap().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    size: ImageSize,
    remaining: usize,
    color: [u8; 3],
    closed: bool,
}

impl SyntheticSource {
    /// Creates a source of `num_frames` frames of `size`.
    pub fn new(size: ImageSize, num_frames: usize) -> Self {
        Self {
            size,
            remaining: num_frames,
            color: [64, 128, 192],
            closed: false,
        }
    }

    /// Sets the color of the frames.
    pub fn with_color(mut self, color: [u8; 3]) -> Self {
        self.color = color;
        self
    }

    /// Number of frames left before the end of the stream.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// Whether [`FrameSource::close`] was called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl FrameSource for SyntheticSource {
    fn read_frame(&mut self) -> Result<Option<Image<u8, 3>>, StreamError> {
        if self.closed || self.remaining == 0 {
            return Ok(None);
        }
        self.remaining -= 1;

        let data = self
            .color
            .iter()
            .copied()
            .cycle()
            .take(self.size.width * self.size.height * 3)
            .collect();

        Ok(Some(Image::new(self.size, data)?))
    }

    fn close(&mut self) -> Result<(), StreamError> {
        if !self.closed {
            log::debug!("closing synthetic source, {} frames unread", self.remaining);
            self.closed = true;
        }
        Ok(())
    }
}
