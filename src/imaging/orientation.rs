//! Stored orientation and conversion to upright pixels.
//!
//! Cameras write pixels in sensor order and record how to display them in
//! the EXIF Orientation tag (0x0112). Resampling always works on the upright
//! image, so the buffer is transformed first and the output carries
//! Orientation 1.
//!
//! | EXIF | Variant | Upright transform |
//! |---|---|---|
//! | 1 | [`Normal`](Orientation::Normal) | none |
//! | 2 | [`FlipH`](Orientation::FlipH) | mirror left/right |
//! | 3 | [`Rotate180`](Orientation::Rotate180) | rotate 180° |
//! | 4 | [`FlipV`](Orientation::FlipV) | mirror top/bottom |
//! | 5 | [`Transpose`](Orientation::Transpose) | mirror across the main diagonal |
//! | 6 | [`Rotate90`](Orientation::Rotate90) | rotate 90° clockwise |
//! | 7 | [`Transverse`](Orientation::Transverse) | mirror across the anti-diagonal |
//! | 8 | [`Rotate270`](Orientation::Rotate270) | rotate 90° counter-clockwise |

use super::error::ResizeError;
use super::pixel::PixelBuffer;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    #[default]
    Normal,
    FlipH,
    Rotate180,
    FlipV,
    Transpose,
    Rotate90,
    Transverse,
    Rotate270,
}

impl Orientation {
    /// Map an EXIF Orientation value. Anything outside 1..=8 is treated as
    /// [`Normal`](Self::Normal).
    pub fn from_exif(value: u16) -> Self {
        match value {
            2 => Orientation::FlipH,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipV,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270,
            _ => Orientation::Normal,
        }
    }

    pub fn exif_value(self) -> u16 {
        match self {
            Orientation::Normal => 1,
            Orientation::FlipH => 2,
            Orientation::Rotate180 => 3,
            Orientation::FlipV => 4,
            Orientation::Transpose => 5,
            Orientation::Rotate90 => 6,
            Orientation::Transverse => 7,
            Orientation::Rotate270 => 8,
        }
    }

    /// True when the upright image has width and height exchanged.
    pub fn swaps_dimensions(self) -> bool {
        matches!(
            self,
            Orientation::Transpose
                | Orientation::Rotate90
                | Orientation::Transverse
                | Orientation::Rotate270
        )
    }

    /// Upright `(width, height)` for stored dimensions.
    pub fn oriented_dimensions(self, (width, height): (u32, u32)) -> (u32, u32) {
        if self.swaps_dimensions() {
            (height, width)
        } else {
            (width, height)
        }
    }

    /// Source coordinate feeding upright pixel `(x, y)`, for a stored image
    /// of `w × h`.
    fn source_coord(self, x: u32, y: u32, w: u32, h: u32) -> (u32, u32) {
        match self {
            Orientation::Normal => (x, y),
            Orientation::FlipH => (w - 1 - x, y),
            Orientation::Rotate180 => (w - 1 - x, h - 1 - y),
            Orientation::FlipV => (x, h - 1 - y),
            Orientation::Transpose => (y, x),
            Orientation::Rotate90 => (y, h - 1 - x),
            Orientation::Transverse => (w - 1 - y, h - 1 - x),
            Orientation::Rotate270 => (w - 1 - y, x),
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Orientation::Normal => "normal",
            Orientation::FlipH => "flip-horizontal",
            Orientation::Rotate180 => "rotate-180",
            Orientation::FlipV => "flip-vertical",
            Orientation::Transpose => "transpose",
            Orientation::Rotate90 => "rotate-90",
            Orientation::Transverse => "transverse",
            Orientation::Rotate270 => "rotate-270",
        };
        f.write_str(name)
    }
}

impl PixelBuffer {
    /// Transform a buffer in stored orientation into its upright form.
    pub fn apply_orientation(self, orientation: Orientation) -> Result<Self, ResizeError> {
        if orientation == Orientation::Normal {
            return Ok(self);
        }
        let (w, h) = self.dimensions();
        let (out_w, out_h) = orientation.oriented_dimensions((w, h));
        PixelBuffer::from_fn(out_w, out_h, self.layout(), |x, y| {
            let (sx, sy) = orientation.source_coord(x, y, w, h);
            self.get(sx, sy)
        })
    }
}
