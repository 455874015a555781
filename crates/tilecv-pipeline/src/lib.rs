#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// The fixed battery of transforms applied to every frame.
pub mod bank;

/// Tiling of the named frames into one collage image.
pub mod collage;

/// Runtime configuration of the frame loop.
pub mod config;

/// Error types of the pipeline.
pub mod error;

/// Frames of mixed channel depth and their names.
pub mod frame;

/// Frame rate and label annotations.
pub mod overlay;

/// Resolution of the output video path.
pub mod recording;

/// The frame loop and its device capabilities.
pub mod session;

pub use crate::bank::TransformBank;
pub use crate::collage::{collage_size, compose};
pub use crate::config::{CollageLayout, EncoderConfig, FilterParams, PipelineConfig};
pub use crate::error::{CollageError, PipelineError, RecordingError};
pub use crate::frame::{Frame, NamedFrame, NamedFrameSet, TransformKind};
pub use crate::overlay::MetricsOverlay;
pub use crate::recording::{RecordingRequest, RecordingTarget};
pub use crate::session::{
    Devices, ExitReason, FrameLoop, LoopState, ParameterSource, PreviewSurface, RunSummary,
};
