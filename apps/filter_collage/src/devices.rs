//! Wiring of the camera, the preview window and the video encoder.

use tilecv::image::{Image, ImageSize};
use tilecv::io::gstreamer::{CameraCapture, V4L2CameraConfig, VideoWriter};
use tilecv::io::{FrameSource, StreamError, SyntheticSource};
use tilecv::pipeline::{
    collage_size, Devices, FilterParams, PipelineConfig, PipelineError, RecordingTarget,
    TransformKind,
};

use crate::preview::PreviewWindow;

const WINDOW_TITLE: &str = "main";

/// Where the frames come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// The V4L2 camera `/dev/video<id>`.
    Camera(u32),
    /// A number of solid-color frames.
    Synthetic(usize),
}

/// The camera or the synthetic source.
pub enum AppSource {
    /// A GStreamer V4L2 capture.
    Camera(CameraCapture),
    /// Generated frames.
    Synthetic(SyntheticSource),
}

impl FrameSource for AppSource {
    fn read_frame(&mut self) -> Result<Option<Image<u8, 3>>, StreamError> {
        match self {
            AppSource::Camera(camera) => camera.read_frame(),
            AppSource::Synthetic(source) => source.read_frame(),
        }
    }

    fn close(&mut self) -> Result<(), StreamError> {
        match self {
            AppSource::Camera(camera) => camera.close(),
            AppSource::Synthetic(source) => source.close(),
        }
    }
}

/// The devices of the application.
pub struct AppDevices {
    source: SourceKind,
    config: PipelineConfig,
}

impl AppDevices {
    /// Creates the wiring for `source`; the window is sized from `config`.
    pub fn new(source: SourceKind, config: PipelineConfig) -> Self {
        Self { source, config }
    }
}

impl Devices for AppDevices {
    type Source = AppSource;
    type Ui = PreviewWindow;
    type Writer = VideoWriter;

    fn open_source(&mut self, size: ImageSize) -> Result<Self::Source, PipelineError> {
        match self.source {
            SourceKind::Camera(camera_id) => {
                let camera = V4L2CameraConfig::new()
                    .with_camera_id(camera_id)
                    .with_size(size)
                    .build()?;
                log::info!("opened camera {camera_id} at {size}");
                Ok(AppSource::Camera(camera))
            }
            SourceKind::Synthetic(num_frames) => {
                log::info!("using {num_frames} synthetic frames of {size}");
                Ok(AppSource::Synthetic(SyntheticSource::new(size, num_frames)))
            }
        }
    }

    fn open_ui(&mut self, initial: FilterParams) -> Result<Self::Ui, PipelineError> {
        let size = collage_size(
            self.config.capture_size,
            TransformKind::ALL.len(),
            self.config.layout,
        );
        PreviewWindow::new(WINDOW_TITLE, size, initial)
    }

    fn open_writer(&mut self, target: &RecordingTarget) -> Result<Self::Writer, PipelineError> {
        let mut writer = VideoWriter::new(
            &target.path,
            target.encoder.fps,
            target.encoder.frame_size,
        )?;
        writer.start()?;
        Ok(writer)
    }
}
