//! Morphological image processing operations.

/// Kernel (structuring element) utilities.
pub mod kernels;
pub use kernels::{Kernel, KernelShape};

mod ops;
pub use ops::{dilate, erode};
