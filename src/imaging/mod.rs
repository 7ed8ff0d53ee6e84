//! Image processing in pure Rust, no system libraries.
//!
//! | Operation | Where |
//! |---|---|
//! | **Decode / encode** | [`ImageCodec`] → [`RustBackend`] (`image` crate) |
//! | **Grayscale, sepia, blur** | [`filters`] |
//! | **Custom convolution** | [`filters::convolve`] + [`kernel`] |
//! | **Alpha flattening** | [`convert::FormatConverter`] |
//!
//! The module is split into:
//! - **Buffer**: the immutable [`PixelBuffer`] every operation works on
//! - **Calculations**: pure per-pixel math (unit testable)
//! - **Filters / Kernel / Convert**: buffer → buffer transforms
//! - **Backend**: [`ImageCodec`] trait + [`RustBackend`]

pub mod backend;
pub mod buffer;
pub mod calculations;
pub mod convert;
pub mod filters;
pub mod kernel;
pub mod rust_backend;

pub use backend::{CodecError, ImageCodec};
pub use buffer::PixelBuffer;
pub use convert::{ConvertError, FormatConverter, SourceFormat, TargetFormat};
pub use filters::{FilterError, FilterKind, FilterSet, blur, convolve, grayscale, sepia};
pub use kernel::{Kernel, KernelError};
pub use rust_backend::RustBackend;
