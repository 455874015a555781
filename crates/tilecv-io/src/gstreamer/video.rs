use std::path::Path;

use gstreamer::prelude::*;
use tilecv_image::{Image, ImageSize};

use crate::{
    error::StreamError,
    sink::{check_frame_size, FrameSink},
};

/// A struct for writing RGB frames to an H.264 MP4 file.
pub struct VideoWriter {
    pipeline: gstreamer::Pipeline,
    appsrc: gstreamer_app::AppSrc,
    fps: f64,
    size: ImageSize,
    counter: u64,
    handle: Option<std::thread::JoinHandle<()>>,
    closed: bool,
}

impl VideoWriter {
    /// Create a new VideoWriter.
    ///
    /// # Arguments
    ///
    /// * `path` - The path to save the video file.
    /// * `fps` - The frames per second of the video.
    /// * `size` - The size of every written frame.
    pub fn new(path: impl AsRef<Path>, fps: f64, size: ImageSize) -> Result<Self, StreamError> {
        super::ensure_initialized()?;

        if !(fps.is_finite() && fps > 0.0) {
            return Err(StreamError::InvalidConfig(format!("invalid fps: {fps}")));
        }

        let path = path.as_ref().to_owned();

        let pipeline_str = format!(
            "appsrc name=src ! \
            videoconvert ! video/x-raw,format=I420 ! \
            x264enc ! \
            video/x-h264,profile=main ! \
            h264parse ! \
            mp4mux ! \
            filesink location=\"{}\"",
            path.to_string_lossy()
        );

        let pipeline = gstreamer::parse::launch(&pipeline_str)?
            .dynamic_cast::<gstreamer::Pipeline>()
            .map_err(StreamError::DowncastPipelineError)?;

        let appsrc = pipeline
            .by_name("src")
            .ok_or(StreamError::GetElementByNameError)?
            .dynamic_cast::<gstreamer_app::AppSrc>()
            .map_err(StreamError::DowncastPipelineError)?;

        appsrc.set_format(gstreamer::Format::Time);

        // fractional rates are expressed in thousandths
        let caps = gstreamer::Caps::builder("video/x-raw")
            .field("format", "RGB")
            .field("width", size.width as i32)
            .field("height", size.height as i32)
            .field(
                "framerate",
                gstreamer::Fraction::new((fps * 1000.0).round() as i32, 1000),
            )
            .build();

        appsrc.set_caps(Some(&caps));

        appsrc.set_is_live(true);
        appsrc.set_property("block", false);

        Ok(Self {
            pipeline,
            appsrc,
            fps,
            size,
            counter: 0,
            handle: None,
            closed: false,
        })
    }

    /// Start the video writer.
    ///
    /// Set the pipeline to playing and launch a task to handle the bus messages.
    pub fn start(&mut self) -> Result<(), StreamError> {
        self.pipeline.set_state(gstreamer::State::Playing)?;

        let bus = self.pipeline.bus().ok_or(StreamError::BusError)?;

        // exit when EOS is received
        let handle = std::thread::spawn(move || {
            for msg in bus.iter_timed(gstreamer::ClockTime::NONE) {
                match msg.view() {
                    gstreamer::MessageView::Eos(..) => {
                        log::debug!("gstreamer received EOS");
                        break;
                    }
                    gstreamer::MessageView::Error(err) => {
                        log::error!(
                            "Error from {:?}: {} ({:?})",
                            msg.src().map(|s| s.path_string()),
                            err.error(),
                            err.debug()
                        );
                        break;
                    }
                    _ => {}
                }
            }
        });

        self.handle = Some(handle);

        Ok(())
    }

    /// Number of frames written so far.
    pub fn frame_count(&self) -> u64 {
        self.counter
    }

    /// The nominal frame rate of the video.
    pub fn fps(&self) -> f64 {
        self.fps
    }
}

impl FrameSink for VideoWriter {
    fn frame_size(&self) -> ImageSize {
        self.size
    }

    fn write(&mut self, frame: &Image<u8, 3>) -> Result<(), StreamError> {
        if self.closed {
            return Err(StreamError::SinkClosed);
        }
        check_frame_size(self.size, frame)?;

        let mut buffer = gstreamer::Buffer::from_mut_slice(padded_rows(frame));

        let frame_ns = 1e9 / self.fps;
        let pts = gstreamer::ClockTime::from_nseconds((self.counter as f64 * frame_ns) as u64);
        let duration = gstreamer::ClockTime::from_nseconds(frame_ns as u64);

        let buffer_ref = buffer.get_mut().ok_or(StreamError::GetBufferError)?;
        buffer_ref.set_pts(Some(pts));
        buffer_ref.set_duration(Some(duration));

        self.counter += 1;

        self.appsrc.push_buffer(buffer)?;

        Ok(())
    }

    /// Send the end of stream, wait for the bus to drain and release the pipeline.
    fn close(&mut self) -> Result<(), StreamError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        self.appsrc.end_of_stream()?;

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                return Err(StreamError::JoinThreadError);
            }
        }

        self.pipeline.set_state(gstreamer::State::Null)?;
        log::info!("video writer closed after {} frames", self.counter);

        Ok(())
    }
}

// raw RGB rows are laid out on a 4-byte stride
fn padded_rows(frame: &Image<u8, 3>) -> Vec<u8> {
    let row_len = frame.width() * 3;
    let stride = row_len.div_ceil(4) * 4;
    if stride == row_len {
        return frame.as_slice().to_vec();
    }

    let mut data = vec![0u8; stride * frame.height()];
    for (dst, src) in data
        .chunks_exact_mut(stride)
        .zip(frame.as_slice().chunks_exact(row_len))
    {
        dst[..row_len].copy_from_slice(src);
    }
    data
}

impl Drop for VideoWriter {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(err) = self.close() {
                log::error!("failed to close the video writer: {err}");
            }
        }
    }
}
