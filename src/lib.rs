//! Passport photo normalization and print sheet layout.
//!
//! An arbitrary photograph goes in; a canonical 600×600 opaque RGB photo
//! comes out, cropped around the face, composited onto a solid backdrop and
//! optionally enhanced. Canonical photos are then packed onto A4 sheets and
//! emitted as single-page PDFs.
//!
//! Face detection and background matting are external capabilities. The
//! host implements [`FaceDetector`] and [`BackgroundMatter`], bundles them in
//! a [`Capabilities`] handle and passes it to every call. Either may be
//! missing; the pipeline degrades to a center crop and no background removal.
//!
//! Nothing past input validation fails outward. Processing faults fall back
//! to a resized original and then to a blank photo; document faults fall
//! back to an error page. Fallbacks are logged through `tracing`.
//!
//! # Modules
//!
//! - [`geometry`] - Face-relative crop computation, manual crop rectangles
//! - [`color`] - Backdrop color tokens and resolution
//! - [`orientation`] - Clockwise rotation with canvas expansion
//! - [`composite`] - Source-over compositing onto a backdrop
//! - [`enhance`] - Brightness and contrast
//! - [`capability`] - Injected face detection and matting
//! - [`pipeline`] - Validation, options, the orchestrator and its fallbacks
//! - [`sheet`] - Grid layout and sheet rasterization
//! - [`document`] - PDF emission
//! - `params` - Request parameter parsing (feature `params`)
//! - `svg` - Layout preview (feature `svg`)
//!
//! # Example
//!
//! ```
//! use image::{DynamicImage, Rgb, RgbImage};
//! use passport_photo::{Capabilities, LayoutOptions, ProcessOptions, Processor, build_sheet};
//!
//! let img = RgbImage::from_fn(800, 600, |x, y| Rgb([(x / 4) as u8, (y / 3) as u8, 128]));
//! let caps = Capabilities::none();
//! let photo = Processor::new(&caps)
//!     .process(&DynamicImage::ImageRgb8(img), &ProcessOptions::new().background("light_blue"))
//!     .unwrap();
//!
//! let doc = build_sheet(&photo, 12, &LayoutOptions::default());
//! assert_eq!(doc.placed, 12);
//! assert!(!doc.fallback);
//! ```

#![forbid(unsafe_code)]

pub mod capability;
pub mod color;
pub mod composite;
pub mod document;
pub mod enhance;
pub mod error;
pub mod geometry;
pub mod orientation;
pub mod pipeline;
pub mod sheet;

#[cfg(feature = "params")]
pub mod params;

#[cfg(feature = "svg")]
pub mod svg;

pub use capability::{BackgroundMatter, Capabilities, FaceDetector};
pub use color::{ColorToken, NamedColor, Rgba};
pub use document::{SheetDocument, build_sheet, build_sheet_mixed, emit_pdf};
pub use error::{CapabilityError, DocumentError, GeometryError, PipelineError, ValidationError};
pub use geometry::{BoundingBox, CropRegion, CropRequest, ManualCrop, Size, face_crop};
pub use pipeline::{
    PASSPORT_SIZE, PassportPhoto, ProcessOptions, Processor, decode_image, process_passport_photo,
    validate,
};
pub use sheet::{LayoutOptions, Paper, Sheet, SheetLayout, compose_sheet, compose_sheet_mixed};
