//! # photo-resize
//!
//! Photo resizing with separable kernel resampling. Give a source file and a
//! target size; get back an upright, resized image with its camera metadata
//! intact.
//!
//! # Pipeline
//!
//! ```text
//! identify ─► orientation ─► plan ─► decode (pre-reduced) ─► orient upright
//!          ─► resample ─► encode ─► copy EXIF ─► atomic write
//! ```
//!
//! Planning is pure arithmetic on dimensions, so the expensive stages only
//! run when the target differs from the upright source. An unchanged size
//! copies the source bytes.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Kernels, weight tables, the two-pass resampler, filters, orientation, EXIF and the codec backend |
//! | [`config`] | `photo-resize.toml` loading, merging over stock defaults, and validation |
//! | [`output`] | CLI output formatting: resize reports, source info, filter list |
//!
//! # Design Decisions
//!
//! ## Separable Two-Pass Resampling
//!
//! Each axis gets its own precomputed weight table. The horizontal pass fills
//! a small ring of intermediate rows; the vertical pass blends them into each
//! destination row. Memory stays proportional to the kernel height, not the
//! image height, and row bands can run on the rayon pool with results
//! identical to the sequential path.
//!
//! ## Native Kernel Width, Optional Widening
//!
//! Weights are `kernel(src_x - tap)` over `2 * ceil(radius)` taps on both
//! upscale and downscale, so Lanczos3 always reads six source pixels per
//! axis. Large reductions are mostly absorbed by pre-reduction. Setting
//! `widen_on_downscale` stretches every kernel except point sampling by the
//! reduction ratio instead, so each destination pixel averages all the
//! source pixels it covers.
//!
//! ## Power-of-Two Pre-Reduction
//!
//! Shrinking a 24 MP photo to a thumbnail first box-averages it by the
//! largest power of two that still leaves at least the target size, then
//! resamples the small remainder. The filter still decides the final look.
//!
//! ## Pure-Rust Codecs
//!
//! Decoding and encoding use the `image` crate (JPEG, PNG, TIFF, WebP);
//! EXIF reading and writing is a small in-tree parser. No system libraries.

pub mod config;
pub mod imaging;
pub mod output;
