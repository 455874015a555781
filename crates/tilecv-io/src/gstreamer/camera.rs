use gstreamer::prelude::*;
use tilecv_image::{Image, ImageSize};

use crate::{capture::FrameSource, error::StreamError};

/// A configuration object for capturing frames from a V4L2 camera.
#[derive(Debug, Clone)]
pub struct V4L2CameraConfig {
    /// The camera device path
    pub device: String,
    /// The image size requested from the device
    pub size: ImageSize,
    /// The desired frames per second, `None` keeps the device rate
    pub fps: Option<u32>,
    /// How long a read waits for a frame before reporting the end of the stream
    pub read_timeout_ms: u64,
}

impl V4L2CameraConfig {
    /// Creates a new V4L2CameraConfig object with default values.
    ///
    /// Note: The default device is "/dev/video0", the default image size is 840x480.
    pub fn new() -> Self {
        Self {
            device: "/dev/video0".to_string(),
            size: ImageSize {
                width: 840,
                height: 480,
            },
            fps: None,
            read_timeout_ms: 2000,
        }
    }

    /// Sets the camera device path based on the camera id.
    pub fn with_camera_id(mut self, camera_id: u32) -> Self {
        self.device = format!("/dev/video{camera_id}");
        self
    }

    /// Sets the image size.
    pub fn with_size(mut self, size: ImageSize) -> Self {
        self.size = size;
        self
    }

    /// Sets the frames per second.
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = Some(fps);
        self
    }

    /// Open the camera described by this configuration.
    pub fn build(&self) -> Result<CameraCapture, StreamError> {
        CameraCapture::new(self)
    }
}

impl Default for V4L2CameraConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Returns a GStreamer pipeline string for capturing RGB frames from a V4L2 camera.
///
/// `size` is a preference: if the device cannot deliver it, the device picks its own
/// resolution and the frames keep it.
pub fn v4l2_camera_pipeline_description(device: &str, size: ImageSize, fps: Option<u32>) -> String {
    let video_rate = match fps {
        Some(fps) => format!("videorate ! video/x-raw,framerate={fps}/1 ! "),
        None => String::new(),
    };

    format!(
        "v4l2src device={device} ! \
        capsfilter caps=\"video/x-raw,width={},height={};video/x-raw\" ! \
        {video_rate}videoconvert ! video/x-raw,format=RGB ! \
        appsink name=sink sync=false max-buffers=1 drop=true",
        size.width, size.height
    )
}

/// A camera capture reading frames synchronously from a GStreamer appsink.
pub struct CameraCapture {
    pipeline: gstreamer::Pipeline,
    appsink: gstreamer_app::AppSink,
    timeout: gstreamer::ClockTime,
    running: bool,
}

impl CameraCapture {
    /// Build the pipeline and wait until it is playing.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::CameraOpen`] if the pipeline does not reach the playing state.
    pub fn new(config: &V4L2CameraConfig) -> Result<Self, StreamError> {
        super::ensure_initialized()?;

        let description =
            v4l2_camera_pipeline_description(&config.device, config.size, config.fps);
        log::debug!("camera pipeline: {description}");

        let pipeline = gstreamer::parse::launch(&description)?
            .dynamic_cast::<gstreamer::Pipeline>()
            .map_err(StreamError::DowncastPipelineError)?;

        let appsink = pipeline
            .by_name("sink")
            .ok_or(StreamError::GetElementByNameError)?
            .dynamic_cast::<gstreamer_app::AppSink>()
            .map_err(StreamError::DowncastPipelineError)?;

        let mut capture = Self {
            pipeline,
            appsink,
            timeout: gstreamer::ClockTime::from_mseconds(config.read_timeout_ms),
            running: true,
        };

        if let Err(err) = capture.start(&config.device) {
            // release the half-opened pipeline
            let _ = capture.close();
            return Err(err);
        }

        log::info!("camera {} opened at {}", config.device, config.size);

        Ok(capture)
    }

    fn start(&mut self, device: &str) -> Result<(), StreamError> {
        self.pipeline
            .set_state(gstreamer::State::Playing)
            .map_err(|_| StreamError::CameraOpen(format!("{device}: failed to start")))?;

        let (res, state, _) = self.pipeline.state(gstreamer::ClockTime::from_seconds(5));
        if res.is_err() || state != gstreamer::State::Playing {
            return Err(StreamError::CameraOpen(format!(
                "{device}: pipeline is {state:?}, expected Playing"
            )));
        }

        Ok(())
    }

    fn frame_from_sample(sample: &gstreamer::Sample) -> Result<Image<u8, 3>, StreamError> {
        let caps = sample
            .caps()
            .ok_or_else(|| StreamError::GetCapsError("no caps".to_string()))?;

        let structure = caps
            .structure(0)
            .ok_or_else(|| StreamError::GetCapsError("no structure".to_string()))?;

        let width = structure
            .get::<i32>("width")
            .map_err(|e| StreamError::GetCapsError(e.to_string()))? as usize;

        let height = structure
            .get::<i32>("height")
            .map_err(|e| StreamError::GetCapsError(e.to_string()))? as usize;

        let buffer = sample
            .buffer()
            .ok_or(StreamError::GetBufferError)?
            .map_readable()?;

        // rows of raw RGB video are padded to 4 bytes
        let row_len = width * 3;
        let stride = row_len.div_ceil(4) * 4;
        let data = if buffer.len() == stride * height && stride != row_len {
            buffer
                .as_slice()
                .chunks_exact(stride)
                .flat_map(|row| &row[..row_len])
                .copied()
                .collect()
        } else {
            buffer.as_slice().to_vec()
        };

        Ok(Image::new(ImageSize { width, height }, data)?)
    }
}

impl FrameSource for CameraCapture {
    fn read_frame(&mut self) -> Result<Option<Image<u8, 3>>, StreamError> {
        if !self.running {
            return Ok(None);
        }

        match self.appsink.try_pull_sample(self.timeout) {
            Some(sample) => Self::frame_from_sample(&sample).map(Some),
            None => {
                if self.appsink.is_eos() {
                    log::info!("camera reached the end of stream");
                } else {
                    log::warn!("no frame received within {}", self.timeout);
                }
                Ok(None)
            }
        }
    }

    fn close(&mut self) -> Result<(), StreamError> {
        if !self.running {
            return Ok(());
        }
        self.running = false;
        self.pipeline.set_state(gstreamer::State::Null)?;
        log::debug!("camera pipeline released");
        Ok(())
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            log::error!("failed to close the camera: {err}");
        }
    }
}
