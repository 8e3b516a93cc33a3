//! Separable two-pass resampler.
//!
//! A 2-D resize with a separable kernel is exactly a horizontal 1-D pass
//! followed by a vertical 1-D pass. The two passes are fused row by row:
//!
//! ```text
//! source rows ──► horizontal pass ──► ring cache (tap_count + 2 rows)
//!                                          │
//!                         vertical pass ◄──┘ ──► destination row
//! ```
//!
//! Each destination row needs only the source rows inside its vertical tap
//! window. Those rows are resampled horizontally on demand into a small ring
//! of slots keyed by source row number (`row % capacity`), so the working set
//! is `O(target_width × tap_count)` instead of a full `target_width ×
//! source_height` intermediate image.
//!
//! Channels are accumulated independently (never premultiplied), divided by
//! the entry's weight sum, rounded, and clamped to `[0, 255]` after every
//! pass.
//!
//! With `parallel` enabled, destination rows are split into bands processed
//! on the rayon pool. Every band owns a private ring cache and computes each
//! pixel exactly as the sequential path does, so the output is identical.

use super::error::ResizeError;
use super::kernel::Kernel;
use super::pixel::{PixelBuffer, pack, unpack};
use super::weights::{AxisEntry, AxisWeights};
use rayon::prelude::*;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Extra ring slots beyond the tap window.
const CACHE_SLACK: usize = 2;

/// Cooperative cancellation flag, checked between destination rows.
///
/// Clones share the same flag, so one clone can be handed to the worker and
/// another kept by whoever may cancel it.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// `Err(Cancelled)` once [`cancel`](Self::cancel) has been called.
    pub fn check(&self) -> Result<(), ResizeError> {
        if self.is_cancelled() {
            Err(ResizeError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Resample `source` to `target_w × target_h` with `kernel`.
///
/// Sequential, not cancellable. Use [`Resampler`] for control over
/// parallelism and cancellation.
pub fn resample(
    source: PixelBuffer,
    kernel: Kernel,
    target_w: u32,
    target_h: u32,
) -> Result<PixelBuffer, ResizeError> {
    Resampler::new(kernel).resample(source, target_w, target_h)
}

/// Configured separable resampler.
#[derive(Debug, Clone)]
pub struct Resampler {
    kernel: Kernel,
    parallel: bool,
    widen: bool,
    cancel: CancelToken,
}

impl Resampler {
    pub fn new(kernel: Kernel) -> Self {
        Self {
            kernel,
            parallel: false,
            widen: false,
            cancel: CancelToken::new(),
        }
    }

    /// Split destination rows into bands on the rayon pool.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Stretch the kernel over each destination pixel's source footprint
    /// when downscaling. Off by default: kernels keep their native width.
    pub fn widen_on_downscale(mut self, widen: bool) -> Self {
        self.widen = widen;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    fn axis_weights(&self, source_len: u32, dest_len: u32) -> Result<AxisWeights, ResizeError> {
        if self.widen {
            AxisWeights::compute_widened(self.kernel, source_len, dest_len)
        } else {
            AxisWeights::compute(self.kernel, source_len, dest_len)
        }
    }

    /// Resample both axes. Returns `source` itself when the dimensions
    /// already match.
    pub fn resample(
        &self,
        source: PixelBuffer,
        target_w: u32,
        target_h: u32,
    ) -> Result<PixelBuffer, ResizeError> {
        check_target(target_w, target_h)?;
        if source.dimensions() == (target_w, target_h) {
            return Ok(source);
        }
        self.cancel.check()?;

        let horizontal = if source.width() == target_w {
            None
        } else {
            Some(self.axis_weights(source.width(), target_w)?)
        };
        let vertical = if source.height() == target_h {
            None
        } else {
            Some(self.axis_weights(source.height(), target_h)?)
        };

        let pass = FusedPass {
            source: &source,
            horizontal: horizontal.as_ref(),
            vertical: vertical.as_ref(),
            target_w: target_w as usize,
            alpha: source.layout().has_alpha(),
            cancel: &self.cancel,
        };

        let row_len = target_w as usize;
        let mut out = vec![0u32; row_len * target_h as usize];
        if self.parallel {
            let band_rows = band_rows(target_h as usize);
            out.par_chunks_mut(band_rows * row_len)
                .enumerate()
                .try_for_each(|(band, chunk)| pass.run_band(band * band_rows, chunk))?;
        } else {
            pass.run_band(0, &mut out)?;
        }
        self.cancel.check()?;

        PixelBuffer::new(target_w, target_h, source.layout(), out)
    }

    /// Horizontal pass only: `source.width()` → `target_w`, height unchanged.
    pub fn resample_horizontal(
        &self,
        source: &PixelBuffer,
        target_w: u32,
    ) -> Result<PixelBuffer, ResizeError> {
        check_target(target_w, source.height())?;
        let weights = self.axis_weights(source.width(), target_w)?;
        let alpha = source.layout().has_alpha();
        let row_len = target_w as usize;
        let mut out = vec![0u32; row_len * source.height() as usize];
        for (y, dst) in out.chunks_exact_mut(row_len).enumerate() {
            self.cancel.check()?;
            resample_row(source.row(y as u32), &weights, alpha, dst);
        }
        PixelBuffer::new(target_w, source.height(), source.layout(), out)
    }

    /// Vertical pass only: `source.height()` → `target_h`, width unchanged.
    pub fn resample_vertical(
        &self,
        source: &PixelBuffer,
        target_h: u32,
    ) -> Result<PixelBuffer, ResizeError> {
        check_target(source.width(), target_h)?;
        let weights = self.axis_weights(source.height(), target_h)?;
        let alpha = source.layout().has_alpha();
        let row_len = source.width() as usize;
        let mut acc = vec![[0f32; 4]; row_len];
        let mut out = vec![0u32; row_len * target_h as usize];
        for (y, dst) in out.chunks_exact_mut(row_len).enumerate() {
            self.cancel.check()?;
            blend_rows(
                weights.entry(y),
                weights.source_len(),
                |r| source.row(r as u32),
                alpha,
                &mut acc,
                dst,
            );
        }
        PixelBuffer::new(source.width(), target_h, source.layout(), out)
    }
}

fn check_target(width: u32, height: u32) -> Result<(), ResizeError> {
    if width == 0 || height == 0 {
        return Err(ResizeError::InvalidRequest(format!(
            "target dimensions must be positive, got {width}x{height}"
        )));
    }
    Ok(())
}

/// Rows per parallel band: roughly four bands per worker thread.
fn band_rows(total_rows: usize) -> usize {
    let bands = rayon::current_num_threads().max(1) * 4;
    total_rows.div_ceil(bands).max(1)
}

// =============================================================================
// Fused horizontal + vertical pass
// =============================================================================

struct FusedPass<'a> {
    source: &'a PixelBuffer,
    /// `None` when the width is unchanged.
    horizontal: Option<&'a AxisWeights>,
    /// `None` when the height is unchanged.
    vertical: Option<&'a AxisWeights>,
    target_w: usize,
    alpha: bool,
    cancel: &'a CancelToken,
}

impl FusedPass<'_> {
    /// Horizontal pass over one source row.
    fn horizontal_row(&self, y: usize, dst: &mut [u32]) {
        let src = self.source.row(y as u32);
        match self.horizontal {
            Some(weights) => resample_row(src, weights, self.alpha, dst),
            None => dst.copy_from_slice(src),
        }
    }

    /// Produce the destination rows starting at `first_row` into `out`.
    fn run_band(&self, first_row: usize, out: &mut [u32]) -> Result<(), ResizeError> {
        let Some(vertical) = self.vertical else {
            for (i, dst) in out.chunks_exact_mut(self.target_w).enumerate() {
                self.cancel.check()?;
                self.horizontal_row(first_row + i, dst);
            }
            return Ok(());
        };

        let mut cache = RowCache::new(vertical.tap_count() + CACHE_SLACK, self.target_w);
        let mut acc = vec![[0f32; 4]; self.target_w];

        for (i, dst) in out.chunks_exact_mut(self.target_w).enumerate() {
            self.cancel.check()?;
            let d = first_row + i;
            let (lo, hi) = vertical.source_span(d);
            for r in lo..=hi {
                cache.ensure(r, |slot| self.horizontal_row(r, slot));
            }
            blend_rows(
                vertical.entry(d),
                vertical.source_len(),
                |r| cache.row(r),
                self.alpha,
                &mut acc,
                dst,
            );
        }
        Ok(())
    }
}

/// Fixed-capacity ring of horizontally resampled rows.
///
/// `slots` holds `capacity` rows back to back; `resident[i]` records which
/// source row currently occupies slot `i`. A row always lands in slot
/// `row % capacity`, evicting whatever was there. Since a tap window spans at
/// most `capacity` consecutive rows, rows in the same window never collide.
struct RowCache {
    width: usize,
    slots: Vec<u32>,
    resident: Vec<Option<usize>>,
}

impl RowCache {
    fn new(capacity: usize, width: usize) -> Self {
        Self {
            width,
            slots: vec![0; capacity * width],
            resident: vec![None; capacity],
        }
    }

    fn slot(&self, row: usize) -> usize {
        row % self.resident.len()
    }

    /// Make `row` resident, filling its slot with `fill` on a miss.
    fn ensure(&mut self, row: usize, fill: impl FnOnce(&mut [u32])) {
        let slot = self.slot(row);
        if self.resident[slot] == Some(row) {
            return;
        }
        let start = slot * self.width;
        fill(&mut self.slots[start..start + self.width]);
        self.resident[slot] = Some(row);
    }

    fn row(&self, row: usize) -> &[u32] {
        let slot = self.slot(row);
        debug_assert_eq!(self.resident[slot], Some(row));
        let start = slot * self.width;
        &self.slots[start..start + self.width]
    }
}

// =============================================================================
// 1-D kernels
// =============================================================================

#[inline]
fn quantize(acc: [f32; 4], weight_sum: f32, alpha: bool) -> u32 {
    let [a, r, g, b] = acc.map(|v| (v / weight_sum).round().clamp(0.0, 255.0) as u8);
    pack(if alpha { a } else { 255 }, r, g, b)
}

/// Resample one row along its own axis.
fn resample_row(src: &[u32], weights: &AxisWeights, alpha: bool, dst: &mut [u32]) {
    let len = src.len();
    for (entry, out) in weights.entries().iter().zip(dst.iter_mut()) {
        let mut acc = [0f32; 4];
        for (t, &w) in entry.weights.iter().enumerate() {
            if w == 0.0 {
                continue;
            }
            let px = unpack(src[entry.source_index(t, len)]);
            for (a, c) in acc.iter_mut().zip(px) {
                *a += w * c as f32;
            }
        }
        *out = quantize(acc, entry.weight_sum, alpha);
    }
}

/// Combine whole rows with one vertical entry's weights.
fn blend_rows<'r>(
    entry: &AxisEntry,
    source_len: usize,
    row_at: impl Fn(usize) -> &'r [u32],
    alpha: bool,
    acc: &mut [[f32; 4]],
    dst: &mut [u32],
) {
    acc.fill([0.0; 4]);
    for (t, &w) in entry.weights.iter().enumerate() {
        if w == 0.0 {
            continue;
        }
        let row = row_at(entry.source_index(t, source_len));
        for (px_acc, &px) in acc.iter_mut().zip(row) {
            for (a, c) in px_acc.iter_mut().zip(unpack(px)) {
                *a += w * c as f32;
            }
        }
    }
    for (out, &px_acc) in dst.iter_mut().zip(acc.iter()) {
        *out = quantize(px_acc, entry.weight_sum, alpha);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::pixel::PixelLayout;

    const RED: u32 = 0xFFFF_0000;

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::from_fn(width, height, PixelLayout::Argb, |x, y| {
            pack(
                255,
                (x * 255 / (width - 1).max(1)) as u8,
                (y * 255 / (height - 1).max(1)) as u8,
                ((x * 7 + y * 13) % 256) as u8,
            )
        })
        .unwrap()
    }

    fn max_channel_diff(a: &PixelBuffer, b: &PixelBuffer) -> u8 {
        assert_eq!(a.dimensions(), b.dimensions());
        a.pixels()
            .iter()
            .zip(b.pixels())
            .flat_map(|(&p, &q)| {
                unpack(p)
                    .into_iter()
                    .zip(unpack(q))
                    .map(|(x, y)| x.abs_diff(y))
            })
            .max()
            .unwrap_or(0)
    }

    // =========================================================================
    // Identity and flat regions
    // =========================================================================

    #[test]
    fn identity_returns_source_unchanged() {
        let src = gradient(17, 9);
        let out = resample(src.clone(), Kernel::Lanczos3, 17, 9).unwrap();
        assert_eq!(out, src);
    }

    #[test]
    fn solid_red_downscale_stays_red_for_every_kernel() {
        for kernel in Kernel::ALL {
            let src = PixelBuffer::filled(1000, 1000, PixelLayout::Argb, RED).unwrap();
            let out = resample(src, kernel, 100, 100).unwrap();
            assert_eq!(out.dimensions(), (100, 100));
            assert!(
                out.pixels().iter().all(|&p| p == RED),
                "{kernel:?} changed a flat region"
            );
        }
    }

    #[test]
    fn solid_upscale_stays_solid() {
        for kernel in Kernel::ALL {
            let src = PixelBuffer::filled(3, 2, PixelLayout::Argb, 0x8040_C020).unwrap();
            let out = resample(src, kernel, 11, 7).unwrap();
            assert!(out.pixels().iter().all(|&p| p == 0x8040_C020), "{kernel:?}");
        }
    }

    #[test]
    fn zero_target_is_invalid_request() {
        let src = gradient(4, 4);
        let err = resample(src, Kernel::Box, 0, 4).unwrap_err();
        assert!(matches!(err, ResizeError::InvalidRequest(_)));
    }

    // =========================================================================
    // Channel handling
    // =========================================================================

    #[test]
    fn rgb_layout_keeps_alpha_opaque() {
        let src = PixelBuffer::from_fn(8, 8, PixelLayout::Rgb, |x, y| {
            pack(0, (x * 30) as u8, (y * 30) as u8, 90)
        })
        .unwrap();
        let out = resample(src, Kernel::Lanczos3, 5, 13).unwrap();
        assert!(out.pixels().iter().all(|&p| unpack(p)[0] == 255));
    }

    #[test]
    fn swapping_channels_swaps_output() {
        let src = gradient(23, 19);
        let swapped = PixelBuffer::from_fn(23, 19, PixelLayout::Argb, |x, y| {
            let [a, r, g, b] = unpack(src.get(x, y));
            pack(a, b, r, g)
        })
        .unwrap();

        for kernel in Kernel::ALL {
            let out = resample(src.clone(), kernel, 11, 31).unwrap();
            let out_swapped = resample(swapped.clone(), kernel, 11, 31).unwrap();
            for (&p, &q) in out.pixels().iter().zip(out_swapped.pixels()) {
                let [a, r, g, b] = unpack(p);
                assert_eq!(unpack(q), [a, b, r, g], "{kernel:?}");
            }
        }
    }

    #[test]
    fn alpha_is_resampled_independently() {
        // Alpha varies, color is constant: color must stay constant.
        let src = PixelBuffer::from_fn(16, 16, PixelLayout::Argb, |x, _| {
            pack((x * 16) as u8, 10, 20, 30)
        })
        .unwrap();
        let out = resample(src, Kernel::Mitchell, 7, 7).unwrap();
        for &p in out.pixels() {
            let [_, r, g, b] = unpack(p);
            assert_eq!((r, g, b), (10, 20, 30));
        }
    }

    // =========================================================================
    // Separability
    // =========================================================================

    #[test]
    fn pass_order_does_not_matter_for_axis_aligned_content() {
        // Red varies along x only, green along y only.
        let src = PixelBuffer::from_fn(40, 30, PixelLayout::Argb, |x, y| {
            pack(255, (x * 6) as u8, (y * 8) as u8, 77)
        })
        .unwrap();

        for kernel in [
            Kernel::Lanczos3,
            Kernel::Mitchell,
            Kernel::CubicBSpline,
            Kernel::CatmullRom,
            Kernel::Box,
            Kernel::Triangle,
        ] {
            let r = Resampler::new(kernel);
            let wh = r
                .resample_vertical(&r.resample_horizontal(&src, 17).unwrap(), 45)
                .unwrap();
            let hw = r
                .resample_horizontal(&r.resample_vertical(&src, 45).unwrap(), 17)
                .unwrap();
            assert!(max_channel_diff(&wh, &hw) <= 1, "{kernel:?}");
        }
    }

    #[test]
    fn fused_pass_matches_explicit_two_pass() {
        let src = gradient(64, 48);
        for kernel in Kernel::ALL {
            for widen in [false, true] {
                let r = Resampler::new(kernel).widen_on_downscale(widen);
                let explicit = r
                    .resample_vertical(&r.resample_horizontal(&src, 25).unwrap(), 71)
                    .unwrap();
                let fused = r.resample(src.clone(), 25, 71).unwrap();
                assert_eq!(fused, explicit, "{kernel:?} widen={widen}");
            }
        }
    }

    #[test]
    fn widening_averages_the_whole_footprint() {
        // Every fourth column is white, shrunk 8x. The native triangle only
        // sees the two columns around each center (one white, one black);
        // the widened one spans the footprint and lands near a quarter grey.
        let src = PixelBuffer::from_fn(64, 1, PixelLayout::Rgb, |x, _| {
            let v = if x % 4 == 3 { 255 } else { 0 };
            pack(255, v, v, v)
        })
        .unwrap();

        let native = Resampler::new(Kernel::Triangle).resample(src.clone(), 8, 1).unwrap();
        assert!(native.pixels().iter().all(|&p| unpack(p)[1] == 128));

        let widened = Resampler::new(Kernel::Triangle)
            .widen_on_downscale(true)
            .resample(src, 8, 1)
            .unwrap();
        // Interior pixels, away from the clamped edges.
        for x in 1..7 {
            let v = unpack(widened.get(x, 0))[1];
            assert!(v.abs_diff(64) <= 1, "x={x}: {v}");
        }
    }

    // =========================================================================
    // Parallelism and cancellation
    // =========================================================================

    #[test]
    fn parallel_output_is_identical() {
        let src = gradient(157, 203);
        for kernel in Kernel::ALL {
            let seq = Resampler::new(kernel).resample(src.clone(), 61, 89).unwrap();
            let par = Resampler::new(kernel)
                .parallel(true)
                .resample(src.clone(), 61, 89)
                .unwrap();
            assert_eq!(seq, par, "{kernel:?}");
        }
    }

    #[test]
    fn cancelled_resample_returns_no_buffer() {
        let cancel = CancelToken::new();
        cancel.cancel();
        let result = Resampler::new(Kernel::Lanczos3)
            .with_cancel(cancel)
            .resample(gradient(50, 50), 20, 20);
        assert!(matches!(result, Err(ResizeError::Cancelled)));
    }

    #[test]
    fn cancel_token_clones_share_state() {
        let a = CancelToken::new();
        let b = a.clone();
        assert!(a.check().is_ok());
        b.cancel();
        assert!(a.is_cancelled());
    }

    // =========================================================================
    // Ring cache
    // =========================================================================

    #[test]
    fn row_cache_evicts_by_row_number() {
        let mut cache = RowCache::new(3, 2);
        let mut fills = 0;
        for r in [0, 1, 2, 1, 3] {
            cache.ensure(r, |slot| {
                fills += 1;
                slot.fill(r as u32);
            });
        }
        // Row 1 was already resident the second time.
        assert_eq!(fills, 4);
        // Row 3 replaced row 0 in slot 0.
        assert_eq!(cache.row(3), &[3, 3]);
        assert_eq!(cache.row(2), &[2, 2]);
        assert_eq!(cache.resident[0], Some(3));
    }
}
