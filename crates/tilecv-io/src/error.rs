use tilecv_image::{ImageError, ImageSize};

/// An error type for the frame sources and sinks.
#[derive(thiserror::Error, Debug)]
pub enum StreamError {
    /// The capture device could not be opened or started.
    #[error("Failed to open the camera: {0}")]
    CameraOpen(String),

    /// An error for an invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A frame does not have the size the sink was opened with.
    #[error("Invalid frame size: expected {expected}, got {actual}")]
    InvalidFrameSize {
        /// The size the sink expects.
        expected: ImageSize,
        /// The size of the rejected frame.
        actual: ImageSize,
    },

    /// The sink was already closed.
    #[error("The sink is closed")]
    SinkClosed,

    /// An error occurred while building a frame.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// An error occurred during GStreamer initialization.
    #[cfg(feature = "gstreamer")]
    #[error(transparent)]
    GStreamerError(#[from] gstreamer::glib::Error),

    /// An error occurred during GStreamer downcast of pipeline element.
    #[cfg(feature = "gstreamer")]
    #[error("Failed to downcast pipeline")]
    DowncastPipelineError(gstreamer::Element),

    /// An error occurred during GStreamer to get an element by name.
    #[cfg(feature = "gstreamer")]
    #[error("Failed to get an element by name")]
    GetElementByNameError,

    /// An error occurred during GStreamer to get the bus.
    #[cfg(feature = "gstreamer")]
    #[error("Failed to get the bus")]
    BusError,

    /// An error occurred during GStreamer to set the pipeline state.
    #[cfg(feature = "gstreamer")]
    #[error(transparent)]
    SetPipelineStateError(#[from] gstreamer::StateChangeError),

    /// An error occurred during GStreamer to map a buffer.
    #[cfg(feature = "gstreamer")]
    #[error(transparent)]
    MapBufferError(#[from] gstreamer::glib::BoolError),

    /// An error occurred during GStreamer to get the caps from the sample.
    #[cfg(feature = "gstreamer")]
    #[error("Failed caps: {0}")]
    GetCapsError(String),

    /// An error occurred during GStreamer to get the buffer from the sample.
    #[cfg(feature = "gstreamer")]
    #[error("Failed to get the buffer from the sample")]
    GetBufferError,

    /// An error occurred while pushing a buffer or the end of stream.
    #[cfg(feature = "gstreamer")]
    #[error(transparent)]
    GstreamerFlowError(#[from] gstreamer::FlowError),

    /// The bus watcher thread panicked.
    #[cfg(feature = "gstreamer")]
    #[error("Failed to join the bus thread")]
    JoinThreadError,
}
