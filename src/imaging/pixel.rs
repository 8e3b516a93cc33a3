//! Packed 32-bit pixel buffers.
//!
//! A [`PixelBuffer`] is a `width × height` grid of `0xAARRGGBB` words. It is
//! the unit of ownership handed from decode to resample to encode: each stage
//! takes the buffer by value and returns a new one, so no two stages ever
//! hold it mutably at the same time.
//!
//! Two layouts exist. [`PixelLayout::Argb`] carries four independent channels.
//! [`PixelLayout::Rgb`] pins alpha at 255; the resampler skips the alpha
//! channel entirely for it.

use super::error::ResizeError;
use image::{DynamicImage, RgbImage, RgbaImage};
use std::borrow::Cow;

/// Channel layout of a [`PixelBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    /// Alpha, red, green, blue, each resampled.
    Argb,
    /// Opaque red, green, blue. Alpha is always 255.
    Rgb,
}

impl PixelLayout {
    pub fn has_alpha(self) -> bool {
        matches!(self, PixelLayout::Argb)
    }
}

/// Pack four 8-bit channels into one `0xAARRGGBB` word.
#[inline]
pub fn pack(a: u8, r: u8, g: u8, b: u8) -> u32 {
    (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// Unpack a `0xAARRGGBB` word into `[a, r, g, b]`.
#[inline]
pub fn unpack(pixel: u32) -> [u8; 4] {
    pixel.to_be_bytes()
}

/// A rectangular grid of packed pixels, row-major.
///
/// Invariants: `width > 0`, `height > 0`, `pixels.len() == width * height`,
/// and for [`PixelLayout::Rgb`] every alpha byte is 255.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    layout: PixelLayout,
    pixels: Vec<u32>,
}

impl PixelBuffer {
    /// Wrap an existing pixel vector, checking the grid invariants.
    pub fn new(
        width: u32,
        height: u32,
        layout: PixelLayout,
        mut pixels: Vec<u32>,
    ) -> Result<Self, ResizeError> {
        if width == 0 || height == 0 {
            return Err(ResizeError::Decode(format!(
                "pixel grid must be non-empty, got {width}x{height}"
            )));
        }
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(ResizeError::Decode(format!(
                "pixel buffer holds {} pixels, {width}x{height} needs {expected}",
                pixels.len()
            )));
        }
        if layout == PixelLayout::Rgb {
            for p in &mut pixels {
                *p |= 0xFF00_0000;
            }
        }
        Ok(Self {
            width,
            height,
            layout,
            pixels,
        })
    }

    /// Build a buffer by evaluating `f(x, y)` for every pixel.
    pub fn from_fn(
        width: u32,
        height: u32,
        layout: PixelLayout,
        mut f: impl FnMut(u32, u32) -> u32,
    ) -> Result<Self, ResizeError> {
        let mut pixels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        Self::new(width, height, layout, pixels)
    }

    /// A buffer where every pixel has the same value.
    pub fn filled(
        width: u32,
        height: u32,
        layout: PixelLayout,
        pixel: u32,
    ) -> Result<Self, ResizeError> {
        Self::new(
            width,
            height,
            layout,
            vec![pixel; width as usize * height as usize],
        )
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u32> {
        self.pixels
    }

    /// One row of pixels.
    pub fn row(&self, y: u32) -> &[u32] {
        let w = self.width as usize;
        let start = y as usize * w;
        &self.pixels[start..start + w]
    }

    /// Pixel at `(x, y)`. Panics when out of bounds.
    pub fn get(&self, x: u32, y: u32) -> u32 {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    // =========================================================================
    // Conversions to and from the `image` crate
    // =========================================================================

    /// Convert a decoded image, optionally reducing it by an integer factor.
    ///
    /// With `factor > 1` each output pixel is the rounded mean of a
    /// `factor × factor` source block (edge blocks average only the pixels
    /// that exist), giving a `ceil(w / factor) × ceil(h / factor)` buffer.
    /// Only the reduced packed buffer is built. Sources that are not already
    /// 8-bit RGB or RGBA are first converted, which does allocate a
    /// full-resolution copy.
    pub fn from_dynamic(image: &DynamicImage, factor: u32) -> Result<Self, ResizeError> {
        if image.color().has_alpha() {
            let rgba: Cow<'_, RgbaImage> = match image {
                DynamicImage::ImageRgba8(buf) => Cow::Borrowed(buf),
                other => Cow::Owned(other.to_rgba8()),
            };
            Self::from_samples(
                rgba.width(),
                rgba.height(),
                PixelLayout::Argb,
                factor,
                |x, y| {
                    let [r, g, b, a] = rgba.get_pixel(x, y).0;
                    [a, r, g, b]
                },
            )
        } else {
            let rgb: Cow<'_, RgbImage> = match image {
                DynamicImage::ImageRgb8(buf) => Cow::Borrowed(buf),
                other => Cow::Owned(other.to_rgb8()),
            };
            Self::from_samples(
                rgb.width(),
                rgb.height(),
                PixelLayout::Rgb,
                factor,
                |x, y| {
                    let [r, g, b] = rgb.get_pixel(x, y).0;
                    [255, r, g, b]
                },
            )
        }
    }

    fn from_samples(
        width: u32,
        height: u32,
        layout: PixelLayout,
        factor: u32,
        sample: impl Fn(u32, u32) -> [u8; 4],
    ) -> Result<Self, ResizeError> {
        let factor = factor.max(1);
        if factor == 1 {
            return Self::from_fn(width, height, layout, |x, y| {
                let [a, r, g, b] = sample(x, y);
                pack(a, r, g, b)
            });
        }

        let out_w = width.div_ceil(factor);
        let out_h = height.div_ceil(factor);
        Self::from_fn(out_w, out_h, layout, |ox, oy| {
            let x0 = ox * factor;
            let y0 = oy * factor;
            let x1 = (x0 + factor).min(width);
            let y1 = (y0 + factor).min(height);
            // A block can hold up to factor² pixels, past what u32 sums hold.
            let mut sums = [0u64; 4];
            for y in y0..y1 {
                for x in x0..x1 {
                    for (sum, c) in sums.iter_mut().zip(sample(x, y)) {
                        *sum += c as u64;
                    }
                }
            }
            let n = (x1 - x0) as u64 * (y1 - y0) as u64;
            let [a, r, g, b] = sums.map(|s| ((s + n / 2) / n) as u8);
            pack(a, r, g, b)
        })
    }

    /// Convert to an `image` crate buffer for encoding.
    pub fn to_dynamic(&self) -> Result<DynamicImage, ResizeError> {
        let mismatch = || {
            ResizeError::ResampleFailure(format!(
                "{}x{} buffer holds {} pixels",
                self.width,
                self.height,
                self.pixels.len()
            ))
        };
        match self.layout {
            PixelLayout::Argb => {
                let raw: Vec<u8> = self
                    .pixels
                    .iter()
                    .flat_map(|&p| {
                        let [a, r, g, b] = unpack(p);
                        [r, g, b, a]
                    })
                    .collect();
                RgbaImage::from_raw(self.width, self.height, raw)
                    .map(DynamicImage::ImageRgba8)
                    .ok_or_else(mismatch)
            }
            PixelLayout::Rgb => {
                let raw: Vec<u8> = self
                    .pixels
                    .iter()
                    .flat_map(|&p| {
                        let [_, r, g, b] = unpack(p);
                        [r, g, b]
                    })
                    .collect();
                RgbImage::from_raw(self.width, self.height, raw)
                    .map(DynamicImage::ImageRgb8)
                    .ok_or_else(mismatch)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_unpack_channel_order() {
        let p = pack(0x11, 0x22, 0x33, 0x44);
        assert_eq!(p, 0x1122_3344);
        assert_eq!(unpack(p), [0x11, 0x22, 0x33, 0x44]);
    }

    #[test]
    fn new_rejects_zero_dimensions() {
        assert!(PixelBuffer::new(0, 4, PixelLayout::Argb, vec![]).is_err());
        assert!(PixelBuffer::new(4, 0, PixelLayout::Argb, vec![]).is_err());
    }

    #[test]
    fn new_rejects_length_mismatch() {
        let err = PixelBuffer::new(2, 2, PixelLayout::Argb, vec![0; 3]).unwrap_err();
        assert!(matches!(err, ResizeError::Decode(_)));
    }

    #[test]
    fn rgb_layout_forces_opaque_alpha() {
        let buf = PixelBuffer::new(1, 1, PixelLayout::Rgb, vec![0x0012_3456]).unwrap();
        assert_eq!(buf.get(0, 0), 0xFF12_3456);
    }

    #[test]
    fn row_returns_contiguous_slice() {
        let buf = PixelBuffer::from_fn(3, 2, PixelLayout::Argb, |x, y| y * 10 + x).unwrap();
        assert_eq!(buf.row(1), &[10, 11, 12]);
    }

    // =========================================================================
    // image crate conversions
    // =========================================================================

    #[test]
    fn from_dynamic_rgba_keeps_alpha() {
        let img = RgbaImage::from_fn(2, 1, |x, _| image::Rgba([10 * x as u8, 20, 30, 128]));
        let buf = PixelBuffer::from_dynamic(&DynamicImage::ImageRgba8(img), 1).unwrap();
        assert_eq!(buf.layout(), PixelLayout::Argb);
        assert_eq!(unpack(buf.get(1, 0)), [128, 10, 20, 30]);
    }

    #[test]
    fn from_dynamic_rgb_is_opaque() {
        let img = RgbImage::from_pixel(3, 3, image::Rgb([1, 2, 3]));
        let buf = PixelBuffer::from_dynamic(&DynamicImage::ImageRgb8(img), 1).unwrap();
        assert_eq!(buf.layout(), PixelLayout::Rgb);
        assert_eq!(buf.get(2, 2), 0xFF01_0203);
    }

    #[test]
    fn from_dynamic_subsampled_averages_blocks() {
        // 4x2 image: left 2x2 block is 0, right 2x2 block is 200
        let img = RgbImage::from_fn(4, 2, |x, _| {
            let v = if x < 2 { 0 } else { 200 };
            image::Rgb([v, v, v])
        });
        let buf = PixelBuffer::from_dynamic(&DynamicImage::ImageRgb8(img), 2).unwrap();
        assert_eq!(buf.dimensions(), (2, 1));
        assert_eq!(unpack(buf.get(0, 0)), [255, 0, 0, 0]);
        assert_eq!(unpack(buf.get(1, 0)), [255, 200, 200, 200]);
    }

    #[test]
    fn from_dynamic_subsampled_rounds_up_partial_blocks() {
        let img = RgbImage::from_pixel(5, 3, image::Rgb([90, 90, 90]));
        let buf = PixelBuffer::from_dynamic(&DynamicImage::ImageRgb8(img), 2).unwrap();
        assert_eq!(buf.dimensions(), (3, 2));
        assert!(buf.pixels().iter().all(|&p| p == 0xFF5A_5A5A));
    }

    #[test]
    fn subsample_block_sums_hold_huge_factors() {
        // One 8192x8192 white block: 67M samples of 255 per channel.
        let buf =
            PixelBuffer::from_samples(8192, 8192, PixelLayout::Rgb, 8192, |_, _| [255; 4])
                .unwrap();
        assert_eq!(buf.dimensions(), (1, 1));
        assert_eq!(buf.get(0, 0), 0xFFFF_FFFF);
    }

    #[test]
    fn to_dynamic_matches_layout() {
        let argb = PixelBuffer::filled(2, 2, PixelLayout::Argb, 0x80FF_0000).unwrap();
        let img = argb.to_dynamic().unwrap();
        assert_eq!(img.as_rgba8().unwrap().get_pixel(1, 1).0, [255, 0, 0, 128]);

        let rgb = PixelBuffer::filled(2, 2, PixelLayout::Rgb, 0xFF00_FF00).unwrap();
        let img = rgb.to_dynamic().unwrap();
        assert_eq!(img.as_rgb8().unwrap().get_pixel(0, 0).0, [0, 255, 0]);
    }

    #[test]
    fn to_dynamic_reports_broken_grid() {
        let mut buf = PixelBuffer::filled(2, 2, PixelLayout::Rgb, 0xFF00_0000).unwrap();
        buf.pixels.pop();
        let err = buf.to_dynamic().unwrap_err();
        assert!(matches!(err, ResizeError::ResampleFailure(_)));
    }
}
