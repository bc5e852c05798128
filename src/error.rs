//! Error taxonomy.
//!
//! Only [`ValidationError`] crosses the processing boundary, and nothing
//! crosses the sheet-building boundary. The other errors are returned by
//! lower-level helpers and are recovered inside the pipeline or the
//! document emitter, surfacing only in logs.

use thiserror::Error;

/// Input rejected before processing.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Width or height below the minimum.
    #[error("image too small: {width}x{height}, minimum {min}x{min} pixels required")]
    TooSmall { width: u32, height: u32, min: u32 },
    /// Width or height above the maximum.
    #[error("image too large: {width}x{height}, maximum {max}x{max} pixels allowed")]
    TooLarge { width: u32, height: u32, max: u32 },
    /// Pixel standard deviation below the near-blank threshold.
    #[error("image appears to be blank or has very low contrast (std dev {std_dev:.2})")]
    LowContrast { std_dev: f64 },
}

/// Crop geometry that cannot be computed.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum GeometryError {
    /// Source image has zero width or height.
    #[error("source image has a zero dimension")]
    ZeroSourceDimension,
    /// Face scale is zero, negative, or not finite.
    #[error("face scale must be a positive finite number, got {0}")]
    InvalidScale(f64),
    /// Manual crop rectangle is empty or larger than any accepted image.
    #[error("manual crop {width}x{height} is empty or exceeds {max} pixels per side")]
    InvalidManualCrop { width: u32, height: u32, max: u32 },
    /// Manual crop origin too far from the image to address.
    #[error("manual crop origin ({x}, {y}) is outside ±{max}")]
    ManualCropOffset { x: i64, y: i64, max: i64 },
}

/// Failure reported by (or about) an external capability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapabilityError {
    /// The capability was never initialized or has been released.
    #[error("{0} capability unavailable")]
    Unavailable(&'static str),
    /// The capability ran and failed.
    #[error("capability failed: {0}")]
    Failed(String),
    /// The matte does not match the dimensions of the image it was computed for.
    #[error("matte is {got_w}x{got_h}, expected {want_w}x{want_h}")]
    MatteMismatch {
        want_w: u32,
        want_h: u32,
        got_w: u32,
        got_h: u32,
    },
}

/// A fault inside the processing pipeline. Always absorbed by the
/// emergency fallback chain.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Capability(#[from] CapabilityError),
    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),
}

/// A fault while emitting the print document. Always absorbed by the
/// fallback error page.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("pdf error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("sheet raster is empty")]
    EmptyRaster,
    #[error("sheet canvas {width}x{height} exceeds {max} pixels per side")]
    CanvasTooLarge { width: u32, height: u32, max: u32 },
}
