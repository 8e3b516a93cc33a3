//! Pure calculation functions for resize dimensions.
//!
//! All functions here are pure and testable without any I/O or images.
//! Every request is checked against the *upright* source bounds: for
//! orientations that rotate by a quarter turn the stored width and height
//! are swapped first.

use super::error::ResizeError;
use super::orientation::Orientation;
use super::params::ResizeRequest;

/// Everything the orchestrator decides before touching pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizePlan {
    /// Dimensions as stored in the file.
    pub stored: (u32, u32),
    pub orientation: Orientation,
    /// Dimensions after the orientation is applied.
    pub oriented: (u32, u32),
    pub target: (u32, u32),
    /// Power-of-two decode reduction, 1 for none.
    pub subsample: u32,
}

impl ResizePlan {
    /// The request keeps the upright dimensions; no pixels need to change.
    pub fn is_identity(&self) -> bool {
        self.oriented == self.target
    }

    /// Upright dimensions of the buffer handed to the resampler.
    pub fn decoded(&self) -> (u32, u32) {
        let (w, h) = self.oriented;
        (w.div_ceil(self.subsample), h.div_ceil(self.subsample))
    }
}

/// Work out target dimensions and decode reduction for a source.
pub fn plan_resize(
    stored: (u32, u32),
    orientation: Orientation,
    request: &ResizeRequest,
    presubsample: bool,
) -> Result<ResizePlan, ResizeError> {
    let oriented = orientation.oriented_dimensions(stored);
    let target = target_dimensions(oriented, request)?;
    let subsample = if presubsample {
        presubsample_factor(oriented, target)
    } else {
        1
    };
    Ok(ResizePlan {
        stored,
        orientation,
        oriented,
        target,
        subsample,
    })
}

/// Normalize any request to explicit `(width, height)`.
pub fn target_dimensions(
    source: (u32, u32),
    request: &ResizeRequest,
) -> Result<(u32, u32), ResizeError> {
    check_source(source)?;
    match *request {
        ResizeRequest::Percentage(pct) => percentage_target(source, pct),
        ResizeRequest::Pixels { width, height } => aspect_locked_target(source, width, height),
        ResizeRequest::LongEdge(edge) => long_edge_target(source, edge),
    }
}

/// Scale both sides by `percent`, rounding, with a floor of 1 pixel.
///
/// # Examples
/// ```
/// # use photo_resize::imaging::calculations::percentage_target;
/// assert_eq!(percentage_target((1920, 1080), 50).unwrap(), (960, 540));
/// ```
pub fn percentage_target(source: (u32, u32), percent: u32) -> Result<(u32, u32), ResizeError> {
    check_source(source)?;
    if !(1..=100).contains(&percent) {
        return Err(ResizeError::InvalidRequest(format!(
            "percentage must be between 1 and 100, got {percent}"
        )));
    }
    let scale = |v: u32| scaled(v as f64 * percent as f64 / 100.0);
    Ok((scale(source.0), scale(source.1)))
}

/// Explicit pixel dimensions. When only one side is given, the other keeps
/// the source aspect ratio: `other = round(edited * original_other / original_edited)`.
pub fn aspect_locked_target(
    source: (u32, u32),
    width: Option<u32>,
    height: Option<u32>,
) -> Result<(u32, u32), ResizeError> {
    check_source(source)?;
    let (src_w, src_h) = source;
    let positive = |name: &str, v: u32| {
        if v == 0 {
            Err(ResizeError::InvalidRequest(format!(
                "{name} must be positive"
            )))
        } else {
            Ok(v)
        }
    };

    match (width, height) {
        (Some(w), Some(h)) => Ok((positive("width", w)?, positive("height", h)?)),
        (Some(w), None) => {
            let w = positive("width", w)?;
            Ok((w, scaled(w as f64 * src_h as f64 / src_w as f64)))
        }
        (None, Some(h)) => {
            let h = positive("height", h)?;
            Ok((scaled(h as f64 * src_w as f64 / src_h as f64), h))
        }
        (None, None) => Err(ResizeError::InvalidRequest(
            "pixel mode needs a width or a height".to_string(),
        )),
    }
}

/// The longer side becomes `long_edge`, the shorter keeps the aspect ratio.
/// Square sources count as landscape.
///
/// # Examples
/// ```
/// # use photo_resize::imaging::calculations::long_edge_target;
/// assert_eq!(long_edge_target((4000, 3000), 1000).unwrap(), (1000, 750));
/// assert_eq!(long_edge_target((3000, 4000), 1000).unwrap(), (750, 1000));
/// ```
pub fn long_edge_target(source: (u32, u32), long_edge: u32) -> Result<(u32, u32), ResizeError> {
    check_source(source)?;
    if long_edge == 0 {
        return Err(ResizeError::InvalidRequest(
            "long edge must be positive".to_string(),
        ));
    }
    let (src_w, src_h) = source;
    let aspect = src_w as f64 / src_h as f64;
    if src_w >= src_h {
        Ok((long_edge, scaled(long_edge as f64 / aspect)))
    } else {
        Ok((scaled(long_edge as f64 * aspect), long_edge))
    }
}

/// Largest power of two `s` such that dividing the source by `s` keeps both
/// sides at or above the target. Returns 1 for upscales and mild downscales.
pub fn presubsample_factor(source: (u32, u32), target: (u32, u32)) -> u32 {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = (target.0.max(1), target.1.max(1));
    let mut factor = 1u32;
    while let Some(next) = factor.checked_mul(2) {
        if src_w / next >= tgt_w && src_h / next >= tgt_h {
            factor = next;
        } else {
            break;
        }
    }
    factor
}

fn scaled(v: f64) -> u32 {
    (v.round() as u32).max(1)
}

fn check_source((w, h): (u32, u32)) -> Result<(), ResizeError> {
    if w == 0 || h == 0 {
        return Err(ResizeError::Decode(format!(
            "source has zero bounds: {w}x{h}"
        )));
    }
    Ok(())
}
