//! Per-axis weight tables.
//!
//! For one axis and one `(source_len, dest_len)` pair, [`AxisWeights`]
//! records, for every destination index, the first contributing source tap,
//! the weights of a fixed-width tap window, and their sum. The table depends
//! only on the axis lengths and the kernel, so it is computed once per resize
//! and shared by every row (or column) of the pass.
//!
//! Sample positions use the pixel-center convention:
//!
//! ```text
//! src_x = (d + 0.5) * (source_len / dest_len) - 0.5
//! ```
//!
//! [`AxisWeights::compute`] evaluates the kernel at its native width on both
//! upscale and downscale: `2 * ceil(radius)` taps starting at
//! `floor(src_x - radius + 1)`, each weighted `kernel(src_x - tap)`.
//! [`AxisWeights::compute_widened`] instead stretches the kernel by the
//! reduction ratio on downscale so each destination pixel integrates its
//! whole source footprint. At ratios of 1 or below both give the same table.
//!
//! Taps that fall outside `[0, source_len)` are kept in the window and read
//! the nearest edge pixel when applied (clamp edge mode).

use super::error::ResizeError;
use super::kernel::Kernel;

/// Weights for one destination index.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisEntry {
    /// Source index of tap 0. May be negative or past the end; readers clamp.
    pub first_tap: isize,
    pub weights: Vec<f32>,
    /// Sum of `weights`, never zero.
    pub weight_sum: f32,
}

impl AxisEntry {
    /// Source index of tap `t`, clamped into `[0, source_len)`.
    #[inline]
    pub fn source_index(&self, t: usize, source_len: usize) -> usize {
        (self.first_tap + t as isize).clamp(0, source_len as isize - 1) as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AxisWeights {
    source_len: usize,
    tap_count: usize,
    entries: Vec<AxisEntry>,
}

impl AxisWeights {
    /// Precompute the weight table for resampling `source_len` samples to
    /// `dest_len` samples with `kernel` at its native width.
    pub fn compute(kernel: Kernel, source_len: u32, dest_len: u32) -> Result<Self, ResizeError> {
        Self::build(kernel, source_len, dest_len, false)
    }

    /// Like [`compute`](Self::compute), but on downscale the kernel is
    /// stretched by `source_len / dest_len` (point sampling excepted).
    pub fn compute_widened(
        kernel: Kernel,
        source_len: u32,
        dest_len: u32,
    ) -> Result<Self, ResizeError> {
        Self::build(kernel, source_len, dest_len, true)
    }

    fn build(
        kernel: Kernel,
        source_len: u32,
        dest_len: u32,
        widen: bool,
    ) -> Result<Self, ResizeError> {
        if source_len == 0 || dest_len == 0 {
            return Err(ResizeError::InvalidRequest(format!(
                "cannot resample axis of length {source_len} to {dest_len}"
            )));
        }

        let ratio = source_len as f64 / dest_len as f64;
        let stretch = if widen && kernel.widens_on_downscale() {
            ratio.max(1.0)
        } else {
            1.0
        };
        let radius = kernel.support() * stretch;
        let tap_count = (2.0 * radius.ceil()) as usize;

        let mut entries = Vec::with_capacity(dest_len as usize);
        for d in 0..dest_len {
            let src_x = (d as f64 + 0.5) * ratio - 0.5;
            let first_tap = (src_x - radius + 1.0).floor() as isize;

            let weights: Vec<f32> = (0..tap_count)
                .map(|t| {
                    let offset = src_x - (first_tap + t as isize) as f64;
                    kernel.weight(offset / stretch) as f32
                })
                .collect();

            let mut weight_sum: f32 = weights.iter().sum();
            if weight_sum == 0.0 {
                weight_sum = 1.0;
            }
            if !weight_sum.is_finite() || weight_sum < 0.0 {
                return Err(ResizeError::ResampleFailure(format!(
                    "{kernel:?} produced weight sum {weight_sum} at destination {d} \
                     ({source_len} -> {dest_len})"
                )));
            }

            entries.push(AxisEntry {
                first_tap,
                weights,
                weight_sum,
            });
        }

        Ok(Self {
            source_len: source_len as usize,
            tap_count,
            entries,
        })
    }

    pub fn source_len(&self) -> usize {
        self.source_len
    }

    pub fn dest_len(&self) -> usize {
        self.entries.len()
    }

    /// Width of every entry's tap window.
    pub fn tap_count(&self) -> usize {
        self.tap_count
    }

    pub fn entries(&self) -> &[AxisEntry] {
        &self.entries
    }

    pub fn entry(&self, d: usize) -> &AxisEntry {
        &self.entries[d]
    }

    /// Inclusive range of clamped source indices touched by entry `d`.
    pub fn source_span(&self, d: usize) -> (usize, usize) {
        let e = &self.entries[d];
        (
            e.source_index(0, self.source_len),
            e.source_index(self.tap_count - 1, self.source_len),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LENGTHS: &[(u32, u32)] = &[
        (1, 1),
        (1, 7),
        (7, 1),
        (10, 3),
        (3, 10),
        (100, 100),
        (1000, 100),
        (333, 1024),
    ];

    #[test]
    fn weight_sum_matches_taps_and_is_positive() {
        for kernel in Kernel::ALL {
            for &(src, dst) in LENGTHS {
                for w in [
                    AxisWeights::compute(kernel, src, dst).unwrap(),
                    AxisWeights::compute_widened(kernel, src, dst).unwrap(),
                ] {
                    assert_eq!(w.dest_len(), dst as usize);
                    for e in w.entries() {
                        let sum: f32 = e.weights.iter().sum();
                        let expected = if sum == 0.0 { 1.0 } else { sum };
                        assert!(
                            (e.weight_sum - expected).abs() < 1e-5,
                            "{kernel:?} {src}->{dst}"
                        );
                        assert!(e.weight_sum > 0.0);
                        assert_eq!(e.weights.len(), w.tap_count());
                    }
                }
            }
        }
    }

    #[test]
    fn lanczos_upscale_has_six_taps() {
        let w = AxisWeights::compute(Kernel::Lanczos3, 10, 20).unwrap();
        assert_eq!(w.tap_count(), 6);
    }

    #[test]
    fn first_tap_follows_pixel_center_convention() {
        // 4 -> 8: d = 0 maps to src_x = 0.5 * 0.5 - 0.5 = -0.25
        // first = floor(-0.25 - 3 + 1) = -3
        let w = AxisWeights::compute(Kernel::Lanczos3, 4, 8).unwrap();
        assert_eq!(w.entry(0).first_tap, -3);
        // d = 7 maps to src_x = 7.5 * 0.5 - 0.5 = 3.25, first = floor(1.25) = 1
        assert_eq!(w.entry(7).first_tap, 1);
    }

    #[test]
    fn identity_ratio_puts_full_weight_on_center_tap() {
        let w = AxisWeights::compute(Kernel::Lanczos3, 5, 5).unwrap();
        for (d, e) in w.entries().iter().enumerate() {
            // src_x == d, so the tap at index d carries weight 1, the rest 0
            let center = (d as isize - e.first_tap) as usize;
            assert!((e.weights[center] - 1.0).abs() < 1e-6);
            for (t, &wt) in e.weights.iter().enumerate() {
                if t != center {
                    assert!(wt.abs() < 1e-6);
                }
            }
        }
    }

    #[test]
    fn nearest_selects_exactly_one_tap() {
        for &(src, dst) in LENGTHS {
            let w = AxisWeights::compute(Kernel::Nearest, src, dst).unwrap();
            assert_eq!(w.tap_count(), 2);
            for e in w.entries() {
                assert_eq!(e.weights.iter().filter(|&&x| x == 1.0).count(), 1);
            }
        }
    }

    #[test]
    fn lanczos_downscale_uses_native_kernel_width() {
        // 1000 -> 100, d = 50: src_x = 50.5 * 10 - 0.5 = 504.5
        // first = floor(504.5 - 3 + 1) = 502, weights = lanczos3(504.5 - tap)
        let w = AxisWeights::compute(Kernel::Lanczos3, 1000, 100).unwrap();
        assert_eq!(w.tap_count(), 6);
        let e = w.entry(50);
        assert_eq!(e.first_tap, 502);
        let expected = [0.0243, -0.1350, 0.6079, 0.6079, -0.1350, 0.0243];
        for (t, (&got, want)) in e.weights.iter().zip(expected).enumerate() {
            let exact = Kernel::Lanczos3.weight(504.5 - (502 + t as isize) as f64) as f32;
            assert_eq!(got, exact, "tap {t}");
            assert!((got - want).abs() < 1e-3, "tap {t}: {got}");
        }
    }

    #[test]
    fn native_downscale_keeps_tap_count_for_every_kernel() {
        for kernel in Kernel::ALL {
            let w = AxisWeights::compute(kernel, 100, 10).unwrap();
            assert_eq!(w.tap_count(), 2 * kernel.support().ceil() as usize, "{kernel:?}");
        }
    }

    #[test]
    fn widened_downscale_stretches_window() {
        let w = AxisWeights::compute_widened(Kernel::Triangle, 100, 10).unwrap();
        // radius = 1 * 10
        assert_eq!(w.tap_count(), 20);
        // Point sampling never widens.
        let w = AxisWeights::compute_widened(Kernel::Nearest, 100, 10).unwrap();
        assert_eq!(w.tap_count(), 2);
    }

    #[test]
    fn widened_and_native_agree_on_upscale() {
        for kernel in Kernel::ALL {
            assert_eq!(
                AxisWeights::compute(kernel, 7, 19).unwrap(),
                AxisWeights::compute_widened(kernel, 7, 19).unwrap(),
                "{kernel:?}"
            );
        }
    }

    #[test]
    fn source_span_is_clamped() {
        let w = AxisWeights::compute(Kernel::Lanczos3, 4, 8).unwrap();
        assert_eq!(w.source_span(0), (0, 2));
        assert_eq!(w.source_span(7), (1, 3));
    }

    #[test]
    fn zero_length_is_invalid_request() {
        let err = AxisWeights::compute(Kernel::Box, 0, 4).unwrap_err();
        assert!(matches!(err, ResizeError::InvalidRequest(_)));
        let err = AxisWeights::compute(Kernel::Box, 4, 0).unwrap_err();
        assert!(matches!(err, ResizeError::InvalidRequest(_)));
    }
}
