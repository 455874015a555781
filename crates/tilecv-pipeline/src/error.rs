use std::path::PathBuf;

use tilecv_image::ImageError;
use tilecv_io::StreamError;

/// An error type for the collage compositor.
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum CollageError {
    /// No frames were given to compose.
    #[error("Cannot compose a collage from an empty frame set")]
    EmptyFrameSet,

    /// The number of columns is zero.
    #[error("The collage needs at least one column")]
    InvalidColumns,

    /// The scale is not a positive finite number.
    #[error("Invalid collage scale: {0}")]
    InvalidScale(f32),

    /// A tile has zero width or height.
    #[error("Tile {index} ({name}) has zero width or height")]
    EmptyTile {
        /// Position of the tile in the set.
        index: usize,
        /// Name of the tile.
        name: &'static str,
    },

    /// An image operator failed.
    #[error(transparent)]
    Image(#[from] ImageError),
}

/// An error type for the output video path resolution.
#[derive(thiserror::Error, Debug)]
pub enum RecordingError {
    /// The output directory could not be created.
    #[error("Failed to create the directory {path}: {source}")]
    DirectoryCreation {
        /// The requested directory.
        path: PathBuf,
        /// The underlying io error.
        source: std::io::Error,
    },

    /// The output file already exists.
    #[error("File already exists: {0}")]
    FileExists(PathBuf),

    /// The output file name does not end with `.mp4`.
    #[error("Invalid file name {0}: the file name must end with .mp4")]
    InvalidExtension(String),
}

/// An error type for the frame loop.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// The transform bank was given a frame without pixels.
    #[error("Cannot process an empty frame")]
    EmptyFrame,

    /// The preview surface failed.
    #[error("Preview error: {0}")]
    Preview(String),

    /// An image operator failed.
    #[error(transparent)]
    Image(#[from] ImageError),

    /// A frame source or sink failed.
    #[error(transparent)]
    Stream(#[from] StreamError),

    /// The collage could not be composed.
    #[error(transparent)]
    Collage(#[from] CollageError),

    /// The output video path is not usable.
    #[error(transparent)]
    Recording(#[from] RecordingError),
}
