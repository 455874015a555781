//! Filter operations
//!
//! This module provides the linear and rank filters used by the transform bank.

/// Filter kernels
pub mod kernels;

/// Filter operations
mod ops;
pub use ops::*;

/// Separable filter operations
mod separable_filter;
pub use separable_filter::*;
