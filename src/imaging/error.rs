//! Error taxonomy for the resize pipeline.
//!
//! Every failure is surfaced to the immediate caller; nothing is retried.
//! Resampling is deterministic, so a retry with the same inputs would fail
//! the same way.

use super::backend::BackendError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResizeError {
    /// Non-positive, out-of-range, or otherwise unusable target dimensions.
    #[error("Invalid resize request: {0}")]
    InvalidRequest(String),
    /// The source could not be interpreted as a pixel grid.
    #[error("Failed to decode source: {0}")]
    Decode(String),
    /// A filter name or code outside the known filter family.
    #[error("Unsupported filter: {0}")]
    UnsupportedFilter(String),
    /// Internal invariant violation inside the resampler.
    #[error("Resampling failed: {0}")]
    ResampleFailure(String),
    #[error("Resize cancelled")]
    Cancelled,
    #[error("Failed to encode output: {0}")]
    Encode(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ResizeError {
    /// Short name of the pipeline stage that failed, for user-facing messages.
    pub fn stage(&self) -> &'static str {
        match self {
            ResizeError::InvalidRequest(_) => "request",
            ResizeError::Decode(_) => "decode",
            ResizeError::UnsupportedFilter(_) => "filter",
            ResizeError::ResampleFailure(_) => "resample",
            ResizeError::Cancelled => "cancelled",
            ResizeError::Encode(_) => "encode",
            ResizeError::Io(_) => "io",
        }
    }
}

impl From<BackendError> for ResizeError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Io(e) => ResizeError::Io(e),
            BackendError::Decode(msg) => ResizeError::Decode(msg),
            BackendError::Encode(msg) => ResizeError::Encode(msg),
        }
    }
}
