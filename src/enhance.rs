//! Brightness and contrast adjustment.
//!
//! Brightness runs first, then contrast. Each is a linear map per channel:
//! brightness scales toward black, contrast scales around mid-gray. A factor
//! of exactly 1.0 leaves the image untouched.

use image::RgbImage;

/// Contrast pivot (mid-gray).
pub const CONTRAST_PIVOT: f32 = 128.0;

/// Brightness then contrast. Order is fixed; swapping changes the output
/// for non-identity factors.
pub fn enhance(img: RgbImage, brightness: f32, contrast: f32) -> RgbImage {
    let img = adjust_brightness(img, brightness);
    adjust_contrast(img, contrast)
}

/// `v * factor`, rounded and clamped.
pub fn adjust_brightness(img: RgbImage, factor: f32) -> RgbImage {
    if factor == 1.0 {
        return img;
    }
    map_channels(img, |v| v * factor)
}

/// `pivot + (v - pivot) * factor`, rounded and clamped.
pub fn adjust_contrast(img: RgbImage, factor: f32) -> RgbImage {
    if factor == 1.0 {
        return img;
    }
    map_channels(img, |v| CONTRAST_PIVOT + (v - CONTRAST_PIVOT) * factor)
}

fn map_channels(mut img: RgbImage, f: impl Fn(f32) -> f32) -> RgbImage {
    // 256-entry lookup; every channel value maps independently.
    let lut: [u8; 256] =
        core::array::from_fn(|v| f(v as f32).round().clamp(0.0, 255.0) as u8);
    for c in img.iter_mut() {
        *c = lut[*c as usize];
    }
    img
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn sample() -> RgbImage {
        RgbImage::from_fn(16, 16, |x, y| Rgb([(x * 16) as u8, (y * 16) as u8, 77]))
    }

    #[test]
    fn identity_factors_are_pixel_identical() {
        let img = sample();
        assert_eq!(enhance(img.clone(), 1.0, 1.0), img);
    }

    #[test]
    fn brightness_scales() {
        let img = RgbImage::from_pixel(1, 1, Rgb([100, 200, 0]));
        assert_eq!(adjust_brightness(img, 1.5).get_pixel(0, 0).0, [150, 255, 0]);
    }

    #[test]
    fn brightness_zero_is_black() {
        let out = adjust_brightness(sample(), 0.0);
        assert!(out.pixels().all(|p| p.0 == [0, 0, 0]));
    }

    #[test]
    fn contrast_pivots_on_mid_gray() {
        let img = RgbImage::from_pixel(1, 1, Rgb([128, 138, 118]));
        assert_eq!(adjust_contrast(img, 2.0).get_pixel(0, 0).0, [128, 148, 108]);
    }

    #[test]
    fn contrast_zero_is_flat_gray() {
        let out = adjust_contrast(sample(), 0.0);
        assert!(out.pixels().all(|p| p.0 == [128, 128, 128]));
    }

    #[test]
    fn order_matters() {
        let img = RgbImage::from_pixel(1, 1, Rgb([200, 50, 128]));
        let forward = enhance(img.clone(), 1.2, 1.5);
        let swapped = adjust_brightness(adjust_contrast(img, 1.5), 1.2);
        assert_ne!(forward, swapped);
    }
}
