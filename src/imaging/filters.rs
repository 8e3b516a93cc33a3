//! Filter selection and dispatch.
//!
//! [`ResizeFilter`] is the user-facing choice of algorithm. Seven of the eight
//! variants map onto a [`Kernel`] and run through the separable
//! [`Resampler`]; [`ResizeFilter::Naive`] is a direct bilinear lookup that
//! bypasses the weight tables entirely. It is fast but lower quality, and prone to
//! aliasing on large downscales.
//!
//! Filters parse from names (`"lanczos3"`, `"catmull-rom"`, …) and from the
//! numeric codes used by saved settings. Anything else is an
//! [`UnsupportedFilter`](ResizeError::UnsupportedFilter) error; there is no
//! silent fallback to a default.

use super::error::ResizeError;
use super::kernel::Kernel;
use super::pixel::{PixelBuffer, pack, unpack};
use super::resample::{CancelToken, Resampler};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ResizeFilter {
    /// Direct bilinear lookup without weight tables.
    Naive,
    #[default]
    Lanczos3,
    Mitchell,
    CubicBSpline,
    CatmullRom,
    Box,
    Triangle,
    PointSample,
}

impl ResizeFilter {
    /// All filters, in code order.
    pub const ALL: [ResizeFilter; 8] = [
        ResizeFilter::Naive,
        ResizeFilter::Lanczos3,
        ResizeFilter::Mitchell,
        ResizeFilter::CubicBSpline,
        ResizeFilter::CatmullRom,
        ResizeFilter::Box,
        ResizeFilter::Triangle,
        ResizeFilter::PointSample,
    ];

    /// Canonical name, accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            ResizeFilter::Naive => "naive",
            ResizeFilter::Lanczos3 => "lanczos3",
            ResizeFilter::Mitchell => "mitchell",
            ResizeFilter::CubicBSpline => "cubic-bspline",
            ResizeFilter::CatmullRom => "catmull-rom",
            ResizeFilter::Box => "box",
            ResizeFilter::Triangle => "triangle",
            ResizeFilter::PointSample => "point",
        }
    }

    /// One-line description for `filters` listings.
    pub fn description(self) -> &'static str {
        match self {
            ResizeFilter::Naive => "direct bilinear lookup, fastest, aliases on large downscales",
            ResizeFilter::Lanczos3 => "windowed sinc, 3 lobes, sharpest",
            ResizeFilter::Mitchell => "cubic B=1/3 C=1/3, balanced blur and ringing",
            ResizeFilter::CubicBSpline => "cubic B=1 C=0, smooth, no ringing",
            ResizeFilter::CatmullRom => "cubic B=0 C=1/2, sharp interpolating cubic",
            ResizeFilter::Box => "area average",
            ResizeFilter::Triangle => "tent filter, bilinear",
            ResizeFilter::PointSample => "nearest source pixel",
        }
    }

    /// Numeric code of the filter (stable, used by saved settings).
    pub fn code(self) -> u32 {
        Self::ALL.iter().position(|&f| f == self).unwrap_or(0) as u32
    }

    /// Filter for a numeric code.
    pub fn from_code(code: u32) -> Result<Self, ResizeError> {
        Self::ALL
            .get(code as usize)
            .copied()
            .ok_or_else(|| ResizeError::UnsupportedFilter(format!("filter code {code}")))
    }

    /// The separable kernel behind this filter, or `None` for [`Naive`](Self::Naive).
    pub fn kernel(self) -> Option<Kernel> {
        match self {
            ResizeFilter::Naive => None,
            ResizeFilter::Lanczos3 => Some(Kernel::Lanczos3),
            ResizeFilter::Mitchell => Some(Kernel::Mitchell),
            ResizeFilter::CubicBSpline => Some(Kernel::CubicBSpline),
            ResizeFilter::CatmullRom => Some(Kernel::CatmullRom),
            ResizeFilter::Box => Some(Kernel::Box),
            ResizeFilter::Triangle => Some(Kernel::Triangle),
            ResizeFilter::PointSample => Some(Kernel::Nearest),
        }
    }
}

impl fmt::Display for ResizeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ResizeFilter {
    type Err = ResizeError;

    /// Case-insensitive; `_` and `-` are interchangeable. Accepts the
    /// canonical names plus the `stb-*` and legacy names of saved settings.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('_', "-");
        let filter = match normalized.as_str() {
            "naive" | "bitmap-scaling" | "bilinear" => ResizeFilter::Naive,
            "lanczos3" | "lanczos" => ResizeFilter::Lanczos3,
            "mitchell" | "stb-mitchell" => ResizeFilter::Mitchell,
            "cubic-bspline" | "bspline" | "stb-cubic-bspline" => ResizeFilter::CubicBSpline,
            "catmull-rom" | "catrom" | "stb-catmull-rom" => ResizeFilter::CatmullRom,
            "box" | "stb-box" => ResizeFilter::Box,
            "triangle" | "stb-triangle" => ResizeFilter::Triangle,
            "point" | "point-sample" | "nearest" | "stb-point-sample" => ResizeFilter::PointSample,
            _ => return Err(ResizeError::UnsupportedFilter(s.to_string())),
        };
        Ok(filter)
    }
}

/// Execution options shared by every filter.
#[derive(Debug, Clone, Default)]
pub struct ResampleOptions {
    /// Spread destination rows over the rayon pool.
    pub parallel: bool,
    /// Stretch kernels over the source footprint on downscale.
    pub widen_on_downscale: bool,
    pub cancel: CancelToken,
}

/// Resize `source` with `filter`, sequentially and without cancellation.
pub fn resize_with_filter(
    source: PixelBuffer,
    target_w: u32,
    target_h: u32,
    filter: ResizeFilter,
) -> Result<PixelBuffer, ResizeError> {
    resize_with_options(
        source,
        target_w,
        target_h,
        filter,
        &ResampleOptions::default(),
    )
}

/// Resize `source` with `filter` under the given execution options.
pub fn resize_with_options(
    source: PixelBuffer,
    target_w: u32,
    target_h: u32,
    filter: ResizeFilter,
    options: &ResampleOptions,
) -> Result<PixelBuffer, ResizeError> {
    match filter.kernel() {
        Some(kernel) => Resampler::new(kernel)
            .parallel(options.parallel)
            .widen_on_downscale(options.widen_on_downscale)
            .with_cancel(options.cancel.clone())
            .resample(source, target_w, target_h),
        None => scale_naive(source, target_w, target_h, &options.cancel),
    }
}

/// Bilinear lookup: each destination pixel interpolates the four source
/// pixels around its center, with edges clamped.
pub fn scale_naive(
    source: PixelBuffer,
    target_w: u32,
    target_h: u32,
    cancel: &CancelToken,
) -> Result<PixelBuffer, ResizeError> {
    if target_w == 0 || target_h == 0 {
        return Err(ResizeError::InvalidRequest(format!(
            "target dimensions must be positive, got {target_w}x{target_h}"
        )));
    }
    if source.dimensions() == (target_w, target_h) {
        return Ok(source);
    }

    let xs = sample_positions(source.width(), target_w);
    let ys = sample_positions(source.height(), target_h);
    let alpha = source.layout().has_alpha();

    let mut out = Vec::with_capacity(target_w as usize * target_h as usize);
    for &(y0, y1, fy) in &ys {
        cancel.check()?;
        let top = source.row(y0);
        let bottom = source.row(y1);
        for &(x0, x1, fx) in &xs {
            let p00 = unpack(top[x0 as usize]);
            let p10 = unpack(top[x1 as usize]);
            let p01 = unpack(bottom[x0 as usize]);
            let p11 = unpack(bottom[x1 as usize]);
            let mut c = [0u8; 4];
            for i in 0..4 {
                let t = p00[i] as f32 + (p10[i] as f32 - p00[i] as f32) * fx;
                let b = p01[i] as f32 + (p11[i] as f32 - p01[i] as f32) * fx;
                c[i] = (t + (b - t) * fy).round().clamp(0.0, 255.0) as u8;
            }
            out.push(pack(if alpha { c[0] } else { 255 }, c[1], c[2], c[3]));
        }
    }

    PixelBuffer::new(target_w, target_h, source.layout(), out)
}

/// `(lower index, upper index, fraction)` for each destination coordinate.
fn sample_positions(source_len: u32, dest_len: u32) -> Vec<(u32, u32, f32)> {
    let ratio = source_len as f64 / dest_len as f64;
    let max = (source_len - 1) as f64;
    (0..dest_len)
        .map(|d| {
            let s = ((d as f64 + 0.5) * ratio - 0.5).clamp(0.0, max);
            let lo = s.floor();
            let hi = (lo + 1.0).min(max);
            (lo as u32, hi as u32, (s - lo) as f32)
        })
        .collect()
}
