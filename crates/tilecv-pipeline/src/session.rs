use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tilecv_image::{Image, ImageError, ImageSize};
use tilecv_imgproc::resize::{resize_to, InterpolationMode};
use tilecv_io::{FrameSink, FrameSource, MonotonicClock, TickSource};

use crate::bank::TransformBank;
use crate::collage::compose;
use crate::config::{FilterParams, PipelineConfig};
use crate::error::PipelineError;
use crate::overlay::MetricsOverlay;
use crate::recording::RecordingTarget;

/// A provider of the live filter parameters, e.g. a pair of sliders.
pub trait ParameterSource {
    /// The current parameters. Read once per frame.
    fn filter_params(&self) -> FilterParams;
}

/// A surface showing the collage and reporting key presses.
pub trait PreviewSurface {
    /// Show a new collage.
    fn show(&mut self, collage: &Image<u8, 3>) -> Result<(), PipelineError>;

    /// Wait briefly for a key press and return it, if any.
    fn poll_key(&mut self) -> Option<char>;

    /// Whether the surface is still open.
    fn is_open(&self) -> bool {
        true
    }

    /// Release the surface. Calling it more than once is a no-op.
    fn close(&mut self);
}

/// Opens the devices of the frame loop.
pub trait Devices {
    /// The frame source.
    type Source: FrameSource;
    /// The preview window with its parameter controls.
    type Ui: PreviewSurface + ParameterSource;
    /// The video encoder.
    type Writer: FrameSink;

    /// Open the frame source, requesting frames of `size`.
    fn open_source(&mut self, size: ImageSize) -> Result<Self::Source, PipelineError>;

    /// Open the preview with the initial parameters.
    fn open_ui(&mut self, initial: FilterParams) -> Result<Self::Ui, PipelineError>;

    /// Open the encoder writing to `target`.
    fn open_writer(&mut self, target: &RecordingTarget) -> Result<Self::Writer, PipelineError>;
}

/// States of the frame loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Opening the devices.
    Init,
    /// Processing frames.
    Running,
    /// Finished normally.
    Exit(ExitReason),
    /// Stopped by an error.
    Failed,
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    /// The quit key was pressed.
    QuitKey,
    /// The source ended or a read failed.
    EndOfStream,
    /// The cancel token was set.
    Cancelled,
    /// The preview was closed.
    WindowClosed,
}

/// The outcome of [`FrameLoop::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    /// Number of frames fully processed.
    pub frames: u64,
    /// Why the loop stopped.
    pub reason: ExitReason,
}

/// The key that stops the loop.
pub const QUIT_KEY: char = 'q';

/// Pulls frames, runs the bank, composes the collage, shows and optionally records it.
///
/// Everything runs on the calling thread. The devices are owned by [`FrameLoop::run`] and
/// released before it returns, whatever the outcome.
pub struct FrameLoop<S: TickSource + Clone = MonotonicClock> {
    config: PipelineConfig,
    bank: TransformBank,
    clock: S,
    cancel_token: Option<Arc<AtomicBool>>,
    state: LoopState,
}

impl FrameLoop<MonotonicClock> {
    /// Creates a loop timed by the monotonic clock.
    pub fn new(config: PipelineConfig) -> Result<Self, ImageError> {
        Self::with_tick_source(config, MonotonicClock::new())
    }
}

impl<S: TickSource + Clone> FrameLoop<S> {
    /// Creates a loop whose frame rate is measured with `clock`.
    pub fn with_tick_source(config: PipelineConfig, clock: S) -> Result<Self, ImageError> {
        Ok(Self {
            config,
            bank: TransformBank::new()?,
            clock,
            cancel_token: None,
            state: LoopState::Init,
        })
    }

    /// Stops the loop at the end of the cycle in which `token` becomes true.
    pub fn with_cancel_token(mut self, token: Arc<AtomicBool>) -> Self {
        self.cancel_token = Some(token);
        self
    }

    /// The configuration of the loop.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// The current state.
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Opens the devices and processes frames until the loop exits.
    ///
    /// When `recording` is set every shown collage is resized to the encoder frame size and
    /// written. If opening a device fails, the devices opened before it are released.
    pub fn run<D: Devices>(
        &mut self,
        devices: &mut D,
        recording: Option<&RecordingTarget>,
    ) -> Result<RunSummary, PipelineError> {
        self.state = LoopState::Init;

        let result = self.open_and_run(devices, recording);
        self.state = match &result {
            Ok(summary) => LoopState::Exit(summary.reason),
            Err(_) => LoopState::Failed,
        };

        match &result {
            Ok(summary) => log::info!(
                "exiting after {} frames: {:?}",
                summary.frames,
                summary.reason
            ),
            Err(e) => log::error!("frame loop failed: {e}"),
        }

        result
    }

    fn open_and_run<D: Devices>(
        &mut self,
        devices: &mut D,
        recording: Option<&RecordingTarget>,
    ) -> Result<RunSummary, PipelineError> {
        let mut source = devices.open_source(self.config.capture_size)?;

        let mut ui = match devices.open_ui(self.config.filter_params) {
            Ok(ui) => ui,
            Err(e) => {
                close_source(&mut source);
                return Err(e);
            }
        };

        let mut writer = match recording.map(|target| devices.open_writer(target)).transpose() {
            Ok(writer) => writer,
            Err(e) => {
                close_source(&mut source);
                ui.close();
                return Err(e);
            }
        };

        if let Some(target) = recording {
            log::info!("recording to {}", target.path.display());
        }

        self.state = LoopState::Running;
        let result = self.run_cycles(&mut source, &mut ui, writer.as_mut());

        // cleanup runs whatever the cycles returned
        close_source(&mut source);
        let writer_result = match writer.as_mut() {
            Some(writer) => writer.close(),
            None => Ok(()),
        };
        ui.close();

        let summary = result?;
        writer_result?;
        Ok(summary)
    }

    fn run_cycles<Src, Ui, W>(
        &mut self,
        source: &mut Src,
        ui: &mut Ui,
        mut writer: Option<&mut W>,
    ) -> Result<RunSummary, PipelineError>
    where
        Src: FrameSource,
        Ui: PreviewSurface + ParameterSource,
        W: FrameSink,
    {
        // the first rate is measured from here
        let mut overlay = MetricsOverlay::with_tick_source(self.clock.clone());
        let mut frames = 0u64;

        loop {
            let frame = match source.read_frame() {
                Ok(Some(frame)) if frame.is_empty() => {
                    log::warn!("the source returned an empty frame");
                    return Ok(summary(frames, ExitReason::EndOfStream));
                }
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    log::info!("end of stream");
                    return Ok(summary(frames, ExitReason::EndOfStream));
                }
                Err(e) => {
                    log::warn!("failed to read a frame: {e}");
                    return Ok(summary(frames, ExitReason::EndOfStream));
                }
            };

            let params = ui.filter_params();
            let mut named = self.bank.apply(&frame, params)?;
            let fps = overlay.annotate(&mut named)?;
            let collage = compose(named.as_slice(), self.config.layout)?;

            ui.show(&collage)?;

            if let Some(writer) = writer.as_deref_mut() {
                let frame_size = writer.frame_size();
                if collage.size() == frame_size {
                    writer.write(&collage)?;
                } else {
                    let resized = resize_to(&collage, frame_size, InterpolationMode::Bilinear)?;
                    writer.write(&resized)?;
                }
            }

            frames += 1;
            log::debug!("frame {frames}: {fps:.1} fps, {params:?}");

            if ui.poll_key() == Some(QUIT_KEY) {
                return Ok(summary(frames, ExitReason::QuitKey));
            }
            if !ui.is_open() {
                return Ok(summary(frames, ExitReason::WindowClosed));
            }
            if self.is_cancelled() {
                return Ok(summary(frames, ExitReason::Cancelled));
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_token
            .as_ref()
            .is_some_and(|token| token.load(Ordering::SeqCst))
    }
}

fn summary(frames: u64, reason: ExitReason) -> RunSummary {
    RunSummary { frames, reason }
}

fn close_source<Src: FrameSource>(source: &mut Src) {
    if let Err(e) = source.close() {
        log::warn!("failed to close the frame source: {e}");
    }
}
