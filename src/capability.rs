//! External capabilities: face detection and background matting.
//!
//! Both are implemented outside this crate (ONNX sessions, cascades, remote
//! services). The host creates them once, bundles them into a
//! [`Capabilities`] handle, passes that handle to every processing call, and
//! calls [`Capabilities::shutdown`] when done. Nothing is looked up from
//! global state.
//!
//! A capability that panics is treated like one that returned
//! [`CapabilityError::Failed`]. This relies on unwinding; under
//! `panic = "abort"` a panicking capability still takes the process down.

use std::panic::{self, AssertUnwindSafe};

use image::{GrayImage, RgbaImage};
use tracing::{debug, warn};

use crate::error::CapabilityError;
use crate::geometry::BoundingBox;

/// Pluggable face detector.
pub trait FaceDetector: Send + Sync {
    /// Detect candidate face boxes in a grayscale image.
    fn detect_faces(&self, gray: &GrayImage) -> Result<Vec<BoundingBox>, CapabilityError>;

    /// The largest detected face, or `None` when detection finds nothing or
    /// fails. Failures are logged and absorbed.
    fn detect_face_box(&self, gray: &GrayImage) -> Option<BoundingBox> {
        match self.detect_faces(gray) {
            Ok(faces) => largest(&faces),
            Err(e) => {
                warn!(error = %e, "face detection failed");
                None
            }
        }
    }

    /// Release model resources. Called once from [`Capabilities::shutdown`].
    fn release(&mut self) {}
}

/// Pluggable background matting.
pub trait BackgroundMatter: Send + Sync {
    /// Return `rgba` with its alpha channel replaced by a foreground matte.
    fn matte(&self, rgba: &RgbaImage) -> Result<RgbaImage, CapabilityError>;

    /// Release model resources. Called once from [`Capabilities::shutdown`].
    fn release(&mut self) {}
}

/// Largest box by area; first wins on ties.
pub fn largest(faces: &[BoundingBox]) -> Option<BoundingBox> {
    faces
        .iter()
        .copied()
        .reduce(|best, f| if f.area() > best.area() { f } else { best })
}

/// Capability handle injected into the pipeline.
///
/// Either capability may be absent; the pipeline then takes its fallback
/// path (center crop, no background removal).
#[derive(Default)]
pub struct Capabilities {
    detector: Option<Box<dyn FaceDetector>>,
    matter: Option<Box<dyn BackgroundMatter>>,
}

impl core::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Capabilities")
            .field("detector", &self.detector.is_some())
            .field("matter", &self.matter.is_some())
            .finish()
    }
}

impl Capabilities {
    /// Handle with no capabilities. Every call takes the fallback path.
    pub fn none() -> Self {
        Self::default()
    }

    /// Bundle already-initialized capabilities.
    pub fn init(
        detector: Option<Box<dyn FaceDetector>>,
        matter: Option<Box<dyn BackgroundMatter>>,
    ) -> Self {
        debug!(
            detector = detector.is_some(),
            matter = matter.is_some(),
            "capabilities initialized"
        );
        Self { detector, matter }
    }

    pub fn with_detector(mut self, detector: Box<dyn FaceDetector>) -> Self {
        self.detector = Some(detector);
        self
    }

    pub fn with_matter(mut self, matter: Box<dyn BackgroundMatter>) -> Self {
        self.matter = Some(matter);
        self
    }

    pub fn has_detector(&self) -> bool {
        self.detector.is_some()
    }

    pub fn has_matter(&self) -> bool {
        self.matter.is_some()
    }

    /// Largest face, or `None` when no detector is installed or nothing was found.
    pub fn detect_face_box(&self, gray: &GrayImage) -> Option<BoundingBox> {
        let detector = self.detector.as_ref()?;
        guarded("face detection", || Ok(detector.detect_face_box(gray))).unwrap_or_else(|e| {
            warn!(error = %e, "face detection failed");
            None
        })
    }

    /// Matte `rgba`, checking that the result matches the input size.
    pub fn matte(&self, rgba: &RgbaImage) -> Result<RgbaImage, CapabilityError> {
        let matter = self
            .matter
            .as_ref()
            .ok_or(CapabilityError::Unavailable("background matting"))?;
        let matted = guarded("background matting", || matter.matte(rgba))?;
        if matted.dimensions() != rgba.dimensions() {
            return Err(CapabilityError::MatteMismatch {
                want_w: rgba.width(),
                want_h: rgba.height(),
                got_w: matted.width(),
                got_h: matted.height(),
            });
        }
        Ok(matted)
    }

    /// Release both capabilities.
    pub fn shutdown(mut self) {
        if let Some(d) = self.detector.as_mut() {
            d.release();
        }
        if let Some(m) = self.matter.as_mut() {
            m.release();
        }
        debug!("capabilities released");
    }
}

/// Run a capability call, turning a panic into [`CapabilityError::Failed`].
fn guarded<T>(
    what: &'static str,
    call: impl FnOnce() -> Result<T, CapabilityError>,
) -> Result<T, CapabilityError> {
    panic::catch_unwind(AssertUnwindSafe(call))
        .unwrap_or_else(|_| Err(CapabilityError::Failed(format!("{what} panicked"))))
}
