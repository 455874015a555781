#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for the frame sources and sinks.
pub mod error;

/// Frame rate counter driven by a monotonic tick source.
pub mod fps_counter;

/// Frame sources: the [`capture::FrameSource`] trait and a synthetic source.
pub mod capture;

/// Frame sinks: the [`sink::FrameSink`] trait and an in-memory sink.
pub mod sink;

/// GStreamer camera capture and video writing (feature-gated).
///
/// Requires the `gstreamer` feature flag and system GStreamer libraries.
#[cfg(feature = "gstreamer")]
pub mod gstreamer;

pub use crate::capture::{FrameSource, SyntheticSource};
pub use crate::error::StreamError;
pub use crate::fps_counter::{FpsCounter, MonotonicClock, TickSource};
pub use crate::sink::{FrameSink, MemorySink};
