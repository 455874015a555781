use tilecv_image::{Image, ImageSize};

use crate::error::StreamError;

/// A consumer of fixed-size RGB frames, e.g. a video encoder.
pub trait FrameSink {
    /// The only frame size the sink accepts.
    fn frame_size(&self) -> ImageSize;

    /// Append a frame.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::InvalidFrameSize`] if the frame is not [`FrameSink::frame_size`].
    fn write(&mut self, frame: &Image<u8, 3>) -> Result<(), StreamError>;

    /// Finalize the output. Calling it more than once is a no-op.
    fn close(&mut self) -> Result<(), StreamError>;
}

/// Check that `frame` has the `expected` size.
pub fn check_frame_size(expected: ImageSize, frame: &Image<u8, 3>) -> Result<(), StreamError> {
    if frame.size() != expected {
        return Err(StreamError::InvalidFrameSize {
            expected,
            actual: frame.size(),
        });
    }
    Ok(())
}

/// A sink keeping the written frames in memory.
#[derive(Debug, Clone)]
pub struct MemorySink {
    frame_size: ImageSize,
    fps: f64,
    frames: Vec<Image<u8, 3>>,
    closed: bool,
}

impl MemorySink {
    /// Creates an empty sink accepting frames of `frame_size`.
    pub fn new(frame_size: ImageSize, fps: f64) -> Self {
        Self {
            frame_size,
            fps,
            frames: Vec::new(),
            closed: false,
        }
    }

    /// The nominal frame rate of the stored stream.
    pub fn fps(&self) -> f64 {
        self.fps
    }

    /// The frames written so far.
    pub fn frames(&self) -> &[Image<u8, 3>] {
        &self.frames
    }

    /// Whether [`FrameSink::close`] was called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl FrameSink for MemorySink {
    fn frame_size(&self) -> ImageSize {
        self.frame_size
    }

    fn write(&mut self, frame: &Image<u8, 3>) -> Result<(), StreamError> {
        if self.closed {
            return Err(StreamError::SinkClosed);
        }
        check_frame_size(self.frame_size, frame)?;
        self.frames.push(frame.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<(), StreamError> {
        self.closed = true;
        Ok(())
    }
}
