#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// border extrapolation modes shared by the neighbourhood operators.
pub mod border;

/// canny edge detection.
pub mod canny;

/// color transformations module.
pub mod color;

/// utilities to draw shapes and text on images.
pub mod draw;

/// image filtering module.
pub mod filter;

/// bitmap font used by the text renderer.
mod font;

/// compute image histogram module.
pub mod histogram;

/// morphological operators (dilate, erode).
pub mod morphology;

/// operations to normalize images.
pub mod normalize;

/// module containing parallization utilities.
pub mod parallel;

/// utility functions for resizing images.
pub mod resize;

/// operations to threshold images.
pub mod threshold;
