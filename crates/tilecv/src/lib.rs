#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use tilecv_image as image;

#[doc(inline)]
pub use tilecv_imgproc as imgproc;

#[doc(inline)]
pub use tilecv_io as io;

#[doc(inline)]
pub use tilecv_pipeline as pipeline;
