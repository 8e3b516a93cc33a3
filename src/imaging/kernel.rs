//! Resampling kernels.
//!
//! The family is closed, so it is a plain enum with a `match` per
//! evaluation rather than a trait object. Every kernel is a pure, total
//! function of the offset from the sample point, zero beyond its support
//! radius.
//!
//! | Kernel | Support | Shape |
//! |---|---|---|
//! | [`Kernel::Nearest`] | 0.5 | 1 on `[-0.5, 0.5)`, one tap |
//! | [`Kernel::Box`] | 0.5 | 1 on `[-0.5, 0.5]` |
//! | [`Kernel::Triangle`] | 1 | `1 - |x|` |
//! | [`Kernel::Mitchell`] | 2 | cubic, B = C = 1/3 |
//! | [`Kernel::CubicBSpline`] | 2 | cubic, B = 1, C = 0 |
//! | [`Kernel::CatmullRom`] | 2 | cubic, B = 0, C = 1/2 |
//! | [`Kernel::Lanczos3`] | 3 | `sinc(x) · sinc(x/3)` |

use std::f64::consts::PI;

const LANCZOS_LOBES: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kernel {
    /// Point sampling: the nearest source pixel wins.
    Nearest,
    Box,
    /// Bilinear tent.
    Triangle,
    Mitchell,
    CubicBSpline,
    CatmullRom,
    Lanczos3,
}

impl Kernel {
    pub const ALL: [Kernel; 7] = [
        Kernel::Nearest,
        Kernel::Box,
        Kernel::Triangle,
        Kernel::Mitchell,
        Kernel::CubicBSpline,
        Kernel::CatmullRom,
        Kernel::Lanczos3,
    ];

    /// Distance beyond which [`weight`](Self::weight) is zero.
    pub fn support(self) -> f64 {
        match self {
            Kernel::Nearest | Kernel::Box => 0.5,
            Kernel::Triangle => 1.0,
            Kernel::Mitchell | Kernel::CubicBSpline | Kernel::CatmullRom => 2.0,
            Kernel::Lanczos3 => LANCZOS_LOBES,
        }
    }

    /// Whether widened weight tables may stretch this kernel over the source
    /// footprint when downscaling. Point sampling always picks a single pixel.
    pub fn widens_on_downscale(self) -> bool {
        !matches!(self, Kernel::Nearest)
    }

    /// Kernel value at offset `x` (in source pixels).
    pub fn weight(self, x: f64) -> f64 {
        match self {
            Kernel::Nearest => {
                if (-0.5..0.5).contains(&x) {
                    1.0
                } else {
                    0.0
                }
            }
            Kernel::Box => {
                if x.abs() <= 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            Kernel::Triangle => (1.0 - x.abs()).max(0.0),
            Kernel::Mitchell => cubic_bc(1.0 / 3.0, 1.0 / 3.0, x),
            Kernel::CubicBSpline => cubic_bc(1.0, 0.0, x),
            Kernel::CatmullRom => cubic_bc(0.0, 0.5, x),
            Kernel::Lanczos3 => lanczos(LANCZOS_LOBES, x),
        }
    }
}

fn sinc(x: f64) -> f64 {
    if x == 0.0 {
        1.0
    } else {
        let p = PI * x;
        p.sin() / p
    }
}

fn lanczos(lobes: f64, x: f64) -> f64 {
    if x.abs() < lobes {
        sinc(x) * sinc(x / lobes)
    } else {
        0.0
    }
}

/// Mitchell–Netravali two-piece cubic, parameterized by (B, C).
fn cubic_bc(b: f64, c: f64, x: f64) -> f64 {
    let a = x.abs();
    let k = if a < 1.0 {
        (12.0 - 9.0 * b - 6.0 * c) * a.powi(3)
            + (-18.0 + 12.0 * b + 6.0 * c) * a.powi(2)
            + (6.0 - 2.0 * b)
    } else if a < 2.0 {
        (-b - 6.0 * c) * a.powi(3)
            + (6.0 * b + 30.0 * c) * a.powi(2)
            + (-12.0 * b - 48.0 * c) * a
            + (8.0 * b + 24.0 * c)
    } else {
        0.0
    };
    k / 6.0
}
