//! Clockwise rotation with canvas expansion.
//!
//! Quarter turns are exact pixel permutations. Any other angle expands the
//! canvas to the rotated bounding box and samples nearest-neighbor, filling
//! uncovered pixels with a caller-supplied color.

use image::{Rgba as Px, RgbaImage, imageops};

use crate::color::Rgba;
use crate::geometry::Size;

/// Snap distance when deciding whether a float dimension is integral.
const SIZE_EPSILON: f64 = 1e-6;

/// A clockwise rotation, normalized to `[0, 360)` degrees.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rotation {
    degrees: f64,
}

impl Rotation {
    /// No rotation.
    pub const IDENTITY: Self = Self { degrees: 0.0 };

    /// Clockwise rotation by `degrees`. Non-finite input becomes identity.
    pub fn clockwise(degrees: f64) -> Self {
        if !degrees.is_finite() {
            return Self::IDENTITY;
        }
        Self {
            degrees: degrees.rem_euclid(360.0),
        }
    }

    pub fn degrees(self) -> f64 {
        self.degrees
    }

    pub fn is_identity(self) -> bool {
        self.degrees == 0.0
    }

    /// Number of clockwise quarter turns (0-3) when the angle is an exact
    /// multiple of 90 degrees.
    pub fn quarter_turns(self) -> Option<u8> {
        let turns = self.degrees / 90.0;
        if turns.fract() == 0.0 {
            Some(turns as u8 % 4)
        } else {
            None
        }
    }

    /// Whether this rotation swaps width and height.
    pub fn swaps_axes(self) -> bool {
        matches!(self.quarter_turns(), Some(1 | 3))
    }

    /// Dimensions of the expanded canvas that holds the rotated image.
    pub fn expanded_size(self, source: Size) -> Size {
        if let Some(turns) = self.quarter_turns() {
            return if turns % 2 == 1 {
                Size::new(source.height, source.width)
            } else {
                source
            };
        }
        let (sin, cos) = self.degrees.to_radians().sin_cos();
        let (w, h) = (source.width as f64, source.height as f64);
        let bw = w * cos.abs() + h * sin.abs();
        let bh = w * sin.abs() + h * cos.abs();
        Size::new(ceil_snapped(bw), ceil_snapped(bh))
    }

    /// Rotate `img`, expanding the canvas and painting new area with `fill`.
    pub fn apply(self, img: &RgbaImage, fill: Rgba) -> RgbaImage {
        match self.quarter_turns() {
            Some(0) => img.clone(),
            Some(1) => imageops::rotate90(img),
            Some(2) => imageops::rotate180(img),
            Some(3) => imageops::rotate270(img),
            _ => self.rotate_expand(img, fill),
        }
    }

    fn rotate_expand(self, img: &RgbaImage, fill: Rgba) -> RgbaImage {
        let source = Size::new(img.width(), img.height());
        let out_size = self.expanded_size(source);
        let fill = Px(fill.to_array());
        if source.is_empty() {
            return RgbaImage::from_pixel(out_size.width, out_size.height, fill);
        }

        let (sin, cos) = self.degrees.to_radians().sin_cos();
        let (scx, scy) = (source.width as f64 / 2.0, source.height as f64 / 2.0);
        let (ocx, ocy) = (out_size.width as f64 / 2.0, out_size.height as f64 / 2.0);

        RgbaImage::from_fn(out_size.width, out_size.height, |ox, oy| {
            // Inverse map: rotate the output pixel center counter-clockwise.
            let dx = ox as f64 + 0.5 - ocx;
            let dy = oy as f64 + 0.5 - ocy;
            let sx = (cos * dx + sin * dy + scx).floor();
            let sy = (-sin * dx + cos * dy + scy).floor();
            if sx >= 0.0 && sy >= 0.0 && sx < source.width as f64 && sy < source.height as f64 {
                *img.get_pixel(sx as u32, sy as u32)
            } else {
                fill
            }
        })
    }
}

/// Ceiling that tolerates float noise just above an integer.
fn ceil_snapped(v: f64) -> u32 {
    let rounded = v.round();
    if (v - rounded).abs() < SIZE_EPSILON {
        rounded as u32
    } else {
        v.ceil() as u32
    }
}
