/// An error type for the image and image processing crates.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ImageError {
    /// Error when the channel and shape are not valid.
    #[error("Data length ({0}) does not match the image size ({1})")]
    InvalidChannelShape(usize, usize),

    /// Error when two images that must share a size do not.
    #[error("Image size mismatch: {0}x{1} vs {2}x{3}")]
    InvalidImageSize(usize, usize, usize, usize),

    /// Error when the image holds no pixels.
    #[error("Image data is not initialized")]
    ImageDataNotInitialized,

    /// Error when a pixel value cannot be cast to the destination type.
    #[error("Failed to cast image data")]
    CastError,

    /// Error when a pixel index is out of bounds.
    #[error("Pixel index ({0}, {1}) is out of bounds ({2}, {3})")]
    PixelIndexOutOfBounds(usize, usize, usize, usize),

    /// Error when the channel index is out of bounds.
    #[error("Channel index {0} is out of bounds ({1})")]
    ChannelIndexOutOfBounds(usize, usize),

    /// Error when the number of histogram bins is not valid.
    #[error("Invalid number of histogram bins: {0}")]
    InvalidHistogramBins(usize),

    /// Error when a filter or structuring element size is not valid.
    #[error("Invalid kernel size: {0}x{1}, expected odd and non-zero")]
    InvalidKernelSize(usize, usize),

    /// Error when a resize backend rejects the buffers.
    #[error("Failed to resize the image: {0}")]
    ResizeError(String),
}
