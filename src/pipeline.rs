//! Photo pipeline: validate, crop, matte, composite, enhance, canonicalize.
//!
//! Every stage returns a `Result`; the public entry points fold any fault
//! into a two-tier emergency fallback (resize the untouched original, else
//! a blank white photo). Only input validation is reported to the caller.
//!
//! # Example
//!
//! ```
//! use image::{DynamicImage, Rgb, RgbImage};
//! use passport_photo::{Capabilities, ProcessOptions, Processor};
//!
//! let img = RgbImage::from_fn(400, 300, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 90]));
//! let caps = Capabilities::none();
//! let photo = Processor::new(&caps)
//!     .process(&DynamicImage::ImageRgb8(img), &ProcessOptions::new().background("blue"))
//!     .unwrap();
//! assert_eq!(photo.image().dimensions(), (600, 600));
//! ```

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage, RgbaImage};
use rayon::prelude::*;
use tracing::{debug, error, info, warn};

use crate::capability::Capabilities;
use crate::color::{ColorToken, Rgba};
use crate::composite::{composite_over, opaque_matte};
use crate::enhance::enhance;
use crate::error::{GeometryError, PipelineError, ValidationError};
use crate::geometry::{
    CropRegion, CropRequest, DEFAULT_FACE_SCALE, ManualCrop, Size, centered_square, face_crop,
};
use crate::orientation::Rotation;

/// Side of the canonical passport photo, in pixels (51 mm at 300 DPI).
pub const PASSPORT_SIZE: u32 = 600;
/// Smallest accepted input side.
pub const MIN_DIMENSION: u32 = 200;
/// Largest accepted input side.
pub const MAX_DIMENSION: u32 = 4000;
/// Inputs whose pixel standard deviation falls below this look blank.
pub const MIN_STD_DEV: f64 = 10.0;

/// Canonical 600×600 opaque RGB photo.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PassportPhoto(RgbImage);

impl PassportPhoto {
    /// Resize to 600×600 with Lanczos3 unless already that size.
    ///
    /// Empty input becomes a blank white photo.
    pub fn conform(img: RgbImage) -> Self {
        if img.dimensions() == (PASSPORT_SIZE, PASSPORT_SIZE) {
            return Self(img);
        }
        if img.width() == 0 || img.height() == 0 {
            return Self::blank();
        }
        Self(imageops::resize(
            &img,
            PASSPORT_SIZE,
            PASSPORT_SIZE,
            FilterType::Lanczos3,
        ))
    }

    /// Conform any decoded image. Alpha is dropped, not composited.
    pub fn from_image(img: &DynamicImage) -> Self {
        Self::conform(img.to_rgb8())
    }

    /// Opaque white 600×600.
    pub fn blank() -> Self {
        Self(RgbImage::from_pixel(
            PASSPORT_SIZE,
            PASSPORT_SIZE,
            Rgb([255, 255, 255]),
        ))
    }

    pub fn image(&self) -> &RgbImage {
        &self.0
    }

    pub fn into_image(self) -> RgbImage {
        self.0
    }

    /// Encode as PNG bytes.
    pub fn encode_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut buf = std::io::Cursor::new(Vec::new());
        self.0.write_to(&mut buf, ImageFormat::Png)?;
        Ok(buf.into_inner())
    }
}

/// Options for one pipeline run.
///
/// ```
/// use passport_photo::{ManualCrop, ProcessOptions};
///
/// let opts = ProcessOptions::new()
///     .background("#FF5733")
///     .brightness(1.1)
///     .manual_crop(ManualCrop::new(10, 20, 300, 300).rotation(5.0));
/// assert!(opts.crop_request().is_manual());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessOptions {
    pub background: ColorToken,
    pub face_scale: f64,
    pub brightness: f32,
    pub contrast: f32,
    pub enhance_quality: bool,
    pub manual_crop: Option<ManualCrop>,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            background: ColorToken::default(),
            face_scale: DEFAULT_FACE_SCALE,
            brightness: 1.0,
            contrast: 1.0,
            enhance_quality: true,
            manual_crop: None,
        }
    }
}

impl ProcessOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backdrop color: palette name, `#RRGGBB`, or any [`ColorToken`].
    pub fn background(mut self, color: impl Into<ColorToken>) -> Self {
        self.background = color.into();
        self
    }

    /// Crop side as a multiple of the longest face side.
    pub fn face_scale(mut self, scale: f64) -> Self {
        self.face_scale = scale;
        self
    }

    pub fn brightness(mut self, factor: f32) -> Self {
        self.brightness = factor;
        self
    }

    pub fn contrast(mut self, factor: f32) -> Self {
        self.contrast = factor;
        self
    }

    pub fn enhance_quality(mut self, enable: bool) -> Self {
        self.enhance_quality = enable;
        self
    }

    /// Use a literal rectangle instead of face detection.
    pub fn manual_crop(mut self, crop: ManualCrop) -> Self {
        self.manual_crop = Some(crop);
        self
    }

    /// The crop strategy these options select.
    pub fn crop_request(&self) -> CropRequest {
        match self.manual_crop {
            Some(m) => CropRequest::Manual(m),
            None => CropRequest::Auto {
                scale: self.face_scale,
            },
        }
    }
}

/// Decode PNG or JPEG bytes.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, PipelineError> {
    Ok(image::load_from_memory(bytes)?)
}

/// Reject inputs outside `[200, 4000]` px on either side, or near-blank.
pub fn validate(img: &DynamicImage) -> Result<(), ValidationError> {
    let (width, height) = (img.width(), img.height());
    if width < MIN_DIMENSION || height < MIN_DIMENSION {
        return Err(ValidationError::TooSmall {
            width,
            height,
            min: MIN_DIMENSION,
        });
    }
    if width > MAX_DIMENSION || height > MAX_DIMENSION {
        return Err(ValidationError::TooLarge {
            width,
            height,
            max: MAX_DIMENSION,
        });
    }
    let std_dev = sample_std_dev(&img.to_rgb8());
    if std_dev < MIN_STD_DEV {
        return Err(ValidationError::LowContrast { std_dev });
    }
    Ok(())
}

/// Population standard deviation over every channel sample.
fn sample_std_dev(img: &RgbImage) -> f64 {
    let samples: &[u8] = img.as_raw();
    if samples.is_empty() {
        return 0.0;
    }
    let n = samples.len() as f64;
    let (sum, sum_sq) = samples.iter().fold((0u64, 0u64), |(s, sq), &v| {
        let v = v as u64;
        (s + v, sq + v * v)
    });
    let mean = sum as f64 / n;
    (sum_sq as f64 / n - mean * mean).max(0.0).sqrt()
}

/// Runs the pipeline against an injected capability handle.
#[derive(Clone, Copy, Debug)]
pub struct Processor<'a> {
    caps: &'a Capabilities,
}

impl<'a> Processor<'a> {
    pub fn new(caps: &'a Capabilities) -> Self {
        Self { caps }
    }

    /// Validate, then process. Returns `Err` only for rejected input; any
    /// later fault yields a fallback photo.
    pub fn process(
        &self,
        image: &DynamicImage,
        options: &ProcessOptions,
    ) -> Result<PassportPhoto, ValidationError> {
        validate(image)?;
        Ok(self.process_unchecked(image, options))
    }

    /// Process without validation. Never fails.
    pub fn process_unchecked(&self, image: &DynamicImage, options: &ProcessOptions) -> PassportPhoto {
        info!(width = image.width(), height = image.height(), "processing photo");
        self.run(image, options)
            .or_else(|e| {
                error!(error = %e, "photo processing failed, resizing original");
                emergency_resize(image).ok_or(e)
            })
            .unwrap_or_else(|e| {
                error!(error = %e, "emergency resize failed, returning blank photo");
                PassportPhoto::blank()
            })
    }

    /// Process many images in parallel. Inputs that fail validation are
    /// logged and dropped; survivors keep their input order.
    pub fn process_batch(&self, images: &[DynamicImage], options: &ProcessOptions) -> Vec<PassportPhoto> {
        images
            .par_iter()
            .enumerate()
            .filter_map(|(i, img)| match self.process(img, options) {
                Ok(photo) => Some(photo),
                Err(e) => {
                    warn!(index = i, error = %e, "skipping batch image");
                    None
                }
            })
            .collect()
    }

    fn run(&self, image: &DynamicImage, options: &ProcessOptions) -> Result<PassportPhoto, PipelineError> {
        let backdrop = options.background.resolve();
        let rgba = image.to_rgba8();

        let cropped = match options.crop_request() {
            CropRequest::Manual(m) => manual_crop(&rgba, m, backdrop)?,
            CropRequest::Auto { scale } => self.auto_crop(&rgba, scale)?,
        };

        let foreground = self.caps.matte(&cropped).unwrap_or_else(|e| {
            warn!(error = %e, "background removal unavailable, keeping original background");
            opaque_matte(&cropped)
        });

        let composed = composite_over(&foreground, backdrop);
        let finished = if options.enhance_quality {
            enhance(composed, options.brightness, options.contrast)
        } else {
            composed
        };

        debug!(
            width = finished.width(),
            height = finished.height(),
            "resizing to passport size"
        );
        Ok(PassportPhoto::conform(finished))
    }

    fn auto_crop(&self, rgba: &RgbaImage, scale: f64) -> Result<RgbaImage, GeometryError> {
        let source = Size::new(rgba.width(), rgba.height());
        let gray = imageops::grayscale(rgba);
        let region = match self.caps.detect_face_box(&gray) {
            Some(face) => {
                debug!(?face, "face detected");
                face_crop(face, scale, source)?
            }
            None => {
                warn!("no face detected, using center crop");
                centered_square(source)?
            }
        };
        Ok(extract(rgba, region))
    }
}

/// Process one photo. See [`Processor::process`].
pub fn process_passport_photo(
    image: &DynamicImage,
    options: &ProcessOptions,
    caps: &Capabilities,
) -> Result<PassportPhoto, ValidationError> {
    Processor::new(caps).process(image, options)
}

/// First fallback tier: the untouched original, resized.
fn emergency_resize(image: &DynamicImage) -> Option<PassportPhoto> {
    if image.width() == 0 || image.height() == 0 {
        return None;
    }
    Some(PassportPhoto::from_image(image))
}

fn extract(rgba: &RgbaImage, region: CropRegion) -> RgbaImage {
    let r = region.to_rect();
    if r.is_full(rgba.width(), rgba.height()) {
        return rgba.clone();
    }
    imageops::crop_imm(rgba, r.x, r.y, r.width, r.height).to_image()
}

/// Rotate, then cut the literal rectangle. Area outside the rotated image
/// takes the opaque backdrop color.
fn manual_crop(rgba: &RgbaImage, crop: ManualCrop, backdrop: Rgba) -> Result<RgbaImage, GeometryError> {
    crop.validate()?;
    let fill = Rgba { a: 255, ..backdrop };

    let rotation = Rotation::clockwise(crop.rotation_degrees);
    let rotated;
    let source = if rotation.is_identity() {
        rgba
    } else {
        rotated = rotation.apply(rgba, fill);
        &rotated
    };

    let mut out = RgbaImage::from_pixel(crop.width, crop.height, image::Rgba(fill.to_array()));
    imageops::replace(&mut out, source, -crop.x, -crop.y);
    Ok(out)
}
