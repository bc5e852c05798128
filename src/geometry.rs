//! Crop geometry for face-relative and manual crops.
//!
//! Pure geometry, no pixel operations. The pipeline resolves a
//! [`CropRequest`] against source dimensions into a [`CropRegion`] and then
//! extracts pixels itself.
//!
//! # Example
//!
//! ```
//! use passport_photo::geometry::{face_crop, BoundingBox, Size};
//!
//! let region = face_crop(BoundingBox::new(400, 300, 200, 200), 2.2, Size::new(1200, 1000))
//!     .unwrap();
//!
//! // 200 × 2.2 = 440, centered on (500, 400)
//! assert_eq!(region.width(), 440);
//! assert_eq!(region.height(), 440);
//! assert_eq!((region.left, region.top), (280, 180));
//! ```

use crate::error::GeometryError;

/// Default face scale: crop side = longest face side × 2.2.
pub const DEFAULT_FACE_SCALE: f64 = 2.2;

/// Largest side a manual crop may request. Twice the largest accepted
/// input, which covers any rotation of it.
pub const MAX_MANUAL_SIDE: u32 = 8000;

/// Largest distance a manual crop origin may sit from the image origin,
/// on either axis.
pub const MAX_MANUAL_OFFSET: i64 = 1_000_000;

/// Width × height dimensions in pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Create a new size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether either dimension is zero.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// Create a new rect.
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Whether this rect covers the full source (no actual crop).
    pub fn is_full(&self, source_w: u32, source_h: u32) -> bool {
        self.x == 0 && self.y == 0 && self.width == source_w && self.height == source_h
    }
}

/// Detected region of interest (usually a face), in source pixels.
///
/// The origin may sit slightly outside the image; crop computation clamps.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BoundingBox {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Center point in source coordinates.
    pub fn center(&self) -> (f64, f64) {
        (
            self.x as f64 + self.width as f64 / 2.0,
            self.y as f64 + self.height as f64 / 2.0,
        )
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Crop region as edges: `0 <= left < right <= source_w`, same for rows.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct CropRegion {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl CropRegion {
    pub fn width(&self) -> u32 {
        self.right - self.left
    }

    pub fn height(&self) -> u32 {
        self.bottom - self.top
    }

    pub fn is_square(&self) -> bool {
        self.width() == self.height()
    }

    /// Same region as an origin + size rect.
    pub fn to_rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.width(), self.height())
    }

    /// Whether the region lies inside a source of the given size.
    pub fn fits_within(&self, source: Size) -> bool {
        self.left < self.right
            && self.top < self.bottom
            && self.right <= source.width
            && self.bottom <= source.height
    }
}

/// Caller-supplied crop rectangle, applied after rotation.
///
/// The rectangle is literal: it may extend past the (rotated) image, in
/// which case the uncovered area is painted with the backdrop color.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ManualCrop {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
    /// Clockwise rotation applied to the whole image before cropping.
    pub rotation_degrees: f64,
}

impl ManualCrop {
    pub fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation_degrees: 0.0,
        }
    }

    /// Set the clockwise rotation in degrees.
    pub fn rotation(mut self, degrees: f64) -> Self {
        self.rotation_degrees = degrees;
        self
    }

    pub fn has_rotation(&self) -> bool {
        self.rotation_degrees.is_finite() && self.rotation_degrees.rem_euclid(360.0) != 0.0
    }

    /// Reject zero-area rectangles, sides above [`MAX_MANUAL_SIDE`] and
    /// origins beyond [`MAX_MANUAL_OFFSET`].
    pub fn validate(&self) -> Result<(), GeometryError> {
        let side_ok = |v: u32| v > 0 && v <= MAX_MANUAL_SIDE;
        if !(side_ok(self.width) && side_ok(self.height)) {
            return Err(GeometryError::InvalidManualCrop {
                width: self.width,
                height: self.height,
                max: MAX_MANUAL_SIDE,
            });
        }
        let offset_ok = |v: i64| (-MAX_MANUAL_OFFSET..=MAX_MANUAL_OFFSET).contains(&v);
        if !(offset_ok(self.x) && offset_ok(self.y)) {
            return Err(GeometryError::ManualCropOffset {
                x: self.x,
                y: self.y,
                max: MAX_MANUAL_OFFSET,
            });
        }
        Ok(())
    }
}

/// How the pipeline chooses its crop.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum CropRequest {
    /// Center on the detected face; side = longest face side × `scale`.
    Auto { scale: f64 },
    /// Rotate, then cut a literal rectangle. No face-based centering.
    Manual(ManualCrop),
}

impl CropRequest {
    pub fn is_manual(&self) -> bool {
        matches!(self, Self::Manual(_))
    }
}

impl Default for CropRequest {
    fn default() -> Self {
        Self::Auto {
            scale: DEFAULT_FACE_SCALE,
        }
    }
}

/// Square crop centered on a face box, clamped to the source.
///
/// The region is square whenever the crop side fits inside both source
/// dimensions. When it does not, the overflowing axis degrades to the full
/// source extent and the region loses squareness.
pub fn face_crop(bbox: BoundingBox, scale: f64, source: Size) -> Result<CropRegion, GeometryError> {
    if source.is_empty() {
        return Err(GeometryError::ZeroSourceDimension);
    }
    if !(scale.is_finite() && scale > 0.0) {
        return Err(GeometryError::InvalidScale(scale));
    }

    let (cx, cy) = bbox.center();
    let longest = bbox.width.max(bbox.height) as f64;
    let crop_size = ((longest * scale).round() as u32).max(1);

    let (left, right) = clamp_axis(cx, crop_size, source.width);
    let (top, bottom) = clamp_axis(cy, crop_size, source.height);
    Ok(CropRegion {
        left,
        top,
        right,
        bottom,
    })
}

/// Largest centered square. Used when no face box is available.
pub fn centered_square(source: Size) -> Result<CropRegion, GeometryError> {
    if source.is_empty() {
        return Err(GeometryError::ZeroSourceDimension);
    }
    let side = source.width.min(source.height);
    let left = (source.width - side) / 2;
    let top = (source.height - side) / 2;
    Ok(CropRegion {
        left,
        top,
        right: left + side,
        bottom: top + side,
    })
}

/// Place a span of `size` centered on `center`, then shift it back inside
/// `[0, extent]`. Requires `extent > 0`.
fn clamp_axis(center: f64, size: u32, extent: u32) -> (u32, u32) {
    let candidate = (center - size as f64 / 2.0).max(0.0).floor();
    // Saturate far-out centers; the shift below pulls them back.
    let mut start = if candidate >= extent as f64 {
        extent
    } else {
        candidate as u32
    };
    let mut end = start as u64 + size as u64;
    if end > extent as u64 {
        start = extent.saturating_sub(size);
        end = (start as u64 + size as u64).min(extent as u64);
    }
    (start, end as u32)
}
