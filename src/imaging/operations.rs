//! High-level resize operations.
//!
//! These functions combine the pure [`calculations`](super::calculations)
//! with backend execution:
//!
//! ```text
//! identify ─► read orientation ─► plan ─► decode(subsample) ─► orient upright
//!     ─► resize_with_filter ─► encode ─► copy metadata ─► atomic write
//! ```
//!
//! An identity plan (target equals the upright bounds) skips everything
//! after `plan` and copies the source bytes unchanged, provided the source
//! is already in the output format. A TIFF source is always re-encoded.

use super::backend::ImageBackend;
use super::calculations::{ResizePlan, plan_resize, target_dimensions};
use super::error::ResizeError;
use super::exif::ExifField;
use super::filters::{ResampleOptions, ResizeFilter, resize_with_options};
use super::orientation::Orientation;
use super::params::{OutputFormat, ResizeParams, ResizeRequest};
use super::pixel::PixelBuffer;
use super::resample::CancelToken;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, ResizeError>;

/// Get stored image dimensions using the backend.
pub fn get_dimensions(backend: &impl ImageBackend, path: &Path) -> Result<(u32, u32)> {
    let dims = backend.identify(path)?;
    Ok(dims.as_tuple())
}

/// What `info` shows about a source file.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceInfo {
    pub path: PathBuf,
    pub stored: (u32, u32),
    pub orientation: Orientation,
    pub oriented: (u32, u32),
    pub metadata: Vec<ExifField>,
}

/// Probe a source without decoding its pixels.
pub fn inspect_source(backend: &impl ImageBackend, path: &Path) -> Result<SourceInfo> {
    let stored = get_dimensions(backend, path)?;
    let orientation = backend.read_orientation(path)?;
    let metadata = backend.read_metadata(path).unwrap_or_else(|e| {
        debug!(path = %path.display(), error = %e, "no readable metadata");
        Vec::new()
    });
    Ok(SourceInfo {
        path: path.to_path_buf(),
        stored,
        orientation,
        oriented: orientation.oriented_dimensions(stored),
        metadata,
    })
}

/// Resize an upright, already decoded buffer.
///
/// The identity case returns `source` itself without resampling.
pub fn resize_buffer(
    source: PixelBuffer,
    request: &ResizeRequest,
    filter: ResizeFilter,
    options: &ResampleOptions,
) -> Result<PixelBuffer> {
    let (w, h) = target_dimensions(source.dimensions(), request)?;
    if source.dimensions() == (w, h) {
        return Ok(source);
    }
    resize_with_options(source, w, h, filter, options)
}

/// Outcome of a file resize.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeReport {
    pub source: PathBuf,
    pub output: PathBuf,
    pub plan: ResizePlan,
    pub filter: ResizeFilter,
    pub format: OutputFormat,
    /// Source bytes were copied unchanged.
    pub identity: bool,
    pub metadata_copied: bool,
    pub bytes_written: u64,
    pub elapsed: Duration,
}

/// Resize a file end to end and write the result atomically.
///
/// On any error, including cancellation, no output file is created.
pub fn resize_file(
    backend: &impl ImageBackend,
    params: &ResizeParams,
    cancel: &CancelToken,
) -> Result<ResizeReport> {
    let started = Instant::now();
    if params.output == params.source {
        return Err(ResizeError::InvalidRequest(format!(
            "output would overwrite the source: {}",
            params.source.display()
        )));
    }
    let format = params.format();
    if !format.matches_extension(&params.output) {
        return Err(ResizeError::InvalidRequest(format!(
            "output {} must have a {} extension (.{})",
            params.output.display(),
            format.name(),
            format.extension()
        )));
    }

    let stored = backend.identify(&params.source)?.as_tuple();
    let orientation = backend.read_orientation(&params.source)?;
    let plan = plan_resize(stored, orientation, &params.request, params.presubsample)?;
    debug!(
        source = %params.source.display(),
        stored = ?plan.stored,
        %orientation,
        oriented = ?plan.oriented,
        target = ?plan.target,
        subsample = plan.subsample,
        filter = %params.filter,
        "planned resize"
    );

    let report = |identity: bool, metadata_copied: bool, bytes_written: u64| ResizeReport {
        source: params.source.clone(),
        output: params.output.clone(),
        plan,
        filter: params.filter,
        format,
        identity,
        metadata_copied,
        bytes_written,
        elapsed: started.elapsed(),
    };

    if plan.is_identity() && params.source_matches_format() {
        let bytes = std::fs::read(&params.source)?;
        cancel.check()?;
        write_atomic(&params.output, &bytes)?;
        info!(output = %params.output.display(), "dimensions unchanged, copied source");
        return Ok(report(true, false, bytes.len() as u64));
    }

    cancel.check()?;
    let decoded = backend.decode(&params.source, plan.subsample)?;
    let upright = decoded.apply_orientation(orientation)?;
    let options = ResampleOptions {
        parallel: params.parallel,
        widen_on_downscale: params.widen_on_downscale,
        cancel: cancel.clone(),
    };
    let (target_w, target_h) = plan.target;
    let resized = resize_with_options(upright, target_w, target_h, params.filter, &options)?;

    cancel.check()?;
    let encoded = backend.encode(&resized, format, params.quality)?;
    let (bytes, metadata_copied) = if params.keep_metadata && format == OutputFormat::Jpeg {
        match backend.copy_metadata(&params.source, &encoded) {
            Ok(with_metadata) => (with_metadata, true),
            Err(e) => {
                warn!(source = %params.source.display(), error = %e, "metadata not copied");
                (encoded, false)
            }
        }
    } else {
        (encoded, false)
    };

    cancel.check()?;
    write_atomic(&params.output, &bytes)?;

    let report = report(false, metadata_copied, bytes.len() as u64);
    info!(
        output = %report.output.display(),
        width = plan.target.0,
        height = plan.target.1,
        bytes = report.bytes_written,
        elapsed_ms = report.elapsed.as_millis() as u64,
        "resized"
    );
    Ok(report)
}

/// Write to a temporary file beside `path`, then rename it into place.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.persist(path).map_err(|e| ResizeError::Io(e.error))?;
    Ok(())
}
