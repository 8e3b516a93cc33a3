//! Parameter types for resize operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the caller (CLI, tests, an embedding application) and
//! the [`operations`](super::operations) module that plans and executes the
//! resize against a [`backend`](super::backend).
//!
//! ## Types
//!
//! - [`Quality`]: lossy encoding quality (1-100, default 100). Clamped on construction.
//! - [`ResizeRequest`]: percentage, explicit pixels with aspect lock, or long edge.
//! - [`OutputFormat`]: encoding chosen from the source file extension.
//! - [`ResizeParams`]: everything needed to resize one file.

use super::filters::ResizeFilter;
use std::fmt;
use std::path::{Path, PathBuf};

/// Prefix of the default output file name.
pub const OUTPUT_PREFIX: &str = "resized_";

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(100)
    }
}

/// How the target size is expressed. Normalized to explicit dimensions by
/// [`target_dimensions`](super::calculations::target_dimensions).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeRequest {
    /// Scale both axes by `1..=100` percent.
    Percentage(u32),
    /// Explicit pixels. A missing side is derived from the upright aspect
    /// ratio.
    Pixels {
        width: Option<u32>,
        height: Option<u32>,
    },
    /// Longer side becomes this length, aspect preserved.
    LongEdge(u32),
}

impl fmt::Display for ResizeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResizeRequest::Percentage(p) => write!(f, "{p}%"),
            ResizeRequest::Pixels { width, height } => {
                let side = |v: &Option<u32>| v.map_or_else(|| "auto".to_string(), |v| v.to_string());
                write!(f, "{}x{}", side(width), side(height))
            }
            ResizeRequest::LongEdge(n) => write!(f, "long edge {n}px"),
        }
    }
}

/// Output encoding, inferred from the source file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
    /// Lossless WebP.
    WebP,
}

impl OutputFormat {
    /// `png` and `webp` keep their format; everything else becomes JPEG.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase());
        match ext.as_deref() {
            Some("png") => OutputFormat::Png,
            Some("webp") => OutputFormat::WebP,
            _ => OutputFormat::Jpeg,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpeg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
        }
    }

    /// Extension given to default output names.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
            OutputFormat::WebP => "webp",
        }
    }

    /// Whether `path` carries an extension naming this format.
    pub fn matches_extension(self, path: &Path) -> bool {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase());
        match (self, ext.as_deref()) {
            (OutputFormat::Jpeg, Some("jpg" | "jpeg" | "jpe")) => true,
            (OutputFormat::Png, Some("png")) => true,
            (OutputFormat::WebP, Some("webp")) => true,
            _ => false,
        }
    }

    /// Whether [`Quality`] affects the encoded bytes.
    pub fn is_lossy(self) -> bool {
        matches!(self, OutputFormat::Jpeg)
    }
}

/// Everything needed to resize one file.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeParams {
    pub source: PathBuf,
    pub output: PathBuf,
    pub request: ResizeRequest,
    pub filter: ResizeFilter,
    pub quality: Quality,
    /// Copy allowlisted EXIF tags into the output (JPEG output only).
    pub keep_metadata: bool,
    /// Decode at a reduced power-of-two scale when downscaling far.
    pub presubsample: bool,
    pub parallel: bool,
    /// Stretch kernels over the source footprint on downscale.
    pub widen_on_downscale: bool,
}

impl ResizeParams {
    /// Parameters with defaults and the output placed next to the source as
    /// `resized_<name>`.
    pub fn new(source: impl Into<PathBuf>, request: ResizeRequest) -> Self {
        let source = source.into();
        let output = default_output_path(&source);
        Self {
            source,
            output,
            request,
            filter: ResizeFilter::default(),
            quality: Quality::default(),
            keep_metadata: true,
            presubsample: true,
            parallel: false,
            widen_on_downscale: false,
        }
    }

    pub fn format(&self) -> OutputFormat {
        OutputFormat::from_path(&self.source)
    }

    /// Whether the source file is already encoded in the output format, so
    /// an unchanged size may copy its bytes.
    pub fn source_matches_format(&self) -> bool {
        self.format().matches_extension(&self.source)
    }
}

/// `dir/photo.jpg` → `dir/resized_photo.jpg`.
///
/// The extension is replaced when the source's does not name the output
/// format: `scan.tiff` → `resized_scan.jpg`.
pub fn default_output_path(source: &Path) -> PathBuf {
    let format = OutputFormat::from_path(source);
    let name = if format.matches_extension(source) {
        source.file_name().map(|n| n.to_string_lossy().into_owned())
    } else {
        source
            .file_stem()
            .map(|s| format!("{}.{}", s.to_string_lossy(), format.extension()))
    };
    let name = name.unwrap_or_else(|| format!("image.{}", format.extension()));
    source.with_file_name(format!("{OUTPUT_PREFIX}{name}"))
}
