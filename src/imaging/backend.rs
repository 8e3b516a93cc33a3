//! Image codec backend trait and shared types.
//!
//! The [`ImageBackend`] trait is the seam between resize policy and codecs:
//! probe bounds, read orientation, decode (optionally pre-reduced), encode,
//! and copy metadata. Everything in [`operations`](super::operations) is
//! written against the trait, so tests can swap in a mock.
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend), built on the `image`
//! crate's pure-Rust codecs.

use super::exif::{ExifError, ExifField};
use super::orientation::Orientation;
use super::params::{OutputFormat, Quality};
use super::pixel::PixelBuffer;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Decode failed: {0}")]
    Decode(String),
    #[error("Encode failed: {0}")]
    Encode(String),
}

/// Result of an identify operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn as_tuple(self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Trait for image codec backends.
pub trait ImageBackend: Sync {
    /// Stored dimensions, without decoding pixels.
    fn identify(&self, path: &Path) -> Result<Dimensions, BackendError>;

    /// Stored orientation. Files without one report [`Orientation::Normal`].
    fn read_orientation(&self, path: &Path) -> Result<Orientation, BackendError>;

    /// Allowlisted EXIF tags present in the file.
    fn read_metadata(&self, path: &Path) -> Result<Vec<ExifField>, ExifError>;

    /// Decode in stored orientation, box-reduced by `subsample` (1 = full size).
    fn decode(&self, path: &Path, subsample: u32) -> Result<PixelBuffer, BackendError>;

    /// Encode a buffer into file bytes.
    fn encode(
        &self,
        buffer: &PixelBuffer,
        format: OutputFormat,
        quality: Quality,
    ) -> Result<Vec<u8>, BackendError>;

    /// Copy allowlisted metadata from `source` into already-encoded bytes.
    fn copy_metadata(&self, source: &Path, encoded: &[u8]) -> Result<Vec<u8>, ExifError>;
}
