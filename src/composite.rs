//! Source-over compositing of a matted foreground onto a solid backdrop.

use image::{Rgb, RgbImage, RgbaImage};

use crate::color::Rgba;

/// Blend `fg` over an opaque `backdrop`, returning a new opaque RGB image.
///
/// Per channel, in normalized space: `out = fg * a + bg * (1 - a)`, then
/// quantized with rounding. The backdrop's own alpha is ignored; the output
/// is always fully opaque.
pub fn composite_over(fg: &RgbaImage, backdrop: Rgba) -> RgbImage {
    let bg = backdrop.rgb().map(|c| c as f32 / 255.0);
    RgbImage::from_fn(fg.width(), fg.height(), |x, y| {
        let [r, g, b, a] = fg.get_pixel(x, y).0;
        match a {
            255 => Rgb([r, g, b]),
            0 => Rgb(backdrop.rgb()),
            _ => {
                let alpha = a as f32 / 255.0;
                let blend = |c: u8, bg: f32| {
                    let v = (c as f32 / 255.0) * alpha + bg * (1.0 - alpha);
                    (v * 255.0).round().clamp(0.0, 255.0) as u8
                };
                Rgb([blend(r, bg[0]), blend(g, bg[1]), blend(b, bg[2])])
            }
        }
    })
}

/// Treat every pixel as foreground. Used when no matte is available.
pub fn opaque_matte(img: &RgbaImage) -> RgbaImage {
    let mut out = img.clone();
    for px in out.pixels_mut() {
        px.0[3] = 255;
    }
    out
}
