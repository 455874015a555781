//! Building blocks of the `filter_collage` binary.

pub mod cli;
pub mod trackbar;

#[cfg(feature = "display")]
pub mod preview;

#[cfg(all(feature = "gstreamer", feature = "display"))]
pub mod devices;
