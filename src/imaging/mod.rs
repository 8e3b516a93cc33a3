//! Image resampling: pure Rust, no native codecs.
//!
//! | Stage | Module |
//! |---|---|
//! | **Kernels** | [`kernel`]: box, triangle, the (B, C) cubic family, Lanczos-3 |
//! | **Weight tables** | [`weights`]: per-axis taps and normalizers |
//! | **Separable resample** | [`resample`]: fused two-pass with a ring row cache |
//! | **Filter dispatch** | [`filters`]: named filters plus naive bilinear |
//! | **Orientation** | [`orientation`]: EXIF orientation to upright pixels |
//! | **EXIF** | custom parser (JPEG APP1 + TIFF IFD), allowlisted copy |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for dimension math (unit testable)
//! - **Parameters**: Data structures describing resize requests
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
pub mod calculations;
mod error;
pub mod exif;
pub mod filters;
pub mod kernel;
pub mod operations;
pub mod orientation;
mod params;
mod pixel;
pub mod resample;
pub mod rust_backend;
pub mod weights;

pub use backend::{BackendError, Dimensions, ImageBackend};
pub use calculations::{ResizePlan, plan_resize, target_dimensions};
pub use error::ResizeError;
pub use exif::{ExifError, ExifField};
pub use filters::{ResampleOptions, ResizeFilter, resize_with_filter, resize_with_options};
pub use kernel::Kernel;
pub use operations::{
    ResizeReport, SourceInfo, get_dimensions, inspect_source, resize_buffer, resize_file,
};
pub use orientation::Orientation;
pub use params::{OutputFormat, Quality, ResizeParams, ResizeRequest, default_output_path};
pub use pixel::{PixelBuffer, PixelLayout, pack, unpack};
pub use resample::{CancelToken, Resampler, resample};
pub use rust_backend::RustBackend;
