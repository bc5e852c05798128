//! Parsed request parameters and their conversion to typed options.

use crate::geometry::ManualCrop;
use crate::pipeline::ProcessOptions;
use crate::sheet::{DEFAULT_COPIES, LayoutOptions};

/// Parameters from a processing request. `None` means "not supplied".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Request {
    /// Backdrop color text (`bg_color`).
    pub bg_color: Option<String>,
    pub face_scale: Option<f64>,
    pub brightness: Option<f32>,
    pub contrast: Option<f32>,
    pub enhance_quality: Option<bool>,
    pub crop_x: Option<i64>,
    pub crop_y: Option<i64>,
    pub crop_width: Option<u32>,
    pub crop_height: Option<u32>,
    /// Clockwise degrees (`crop_rotation`).
    pub crop_rotation: Option<f64>,
    /// Also produce a print sheet.
    pub make_a4: Option<bool>,
    pub copies: Option<usize>,
    pub margin: Option<u32>,
    pub spacing: Option<u32>,
    pub cut_lines: Option<bool>,
}

/// What to print when a sheet was requested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetRequest {
    pub copies: usize,
    pub layout: LayoutOptions,
}

impl Request {
    /// Pipeline options, defaults filled in for anything not supplied.
    pub fn to_options(&self) -> ProcessOptions {
        let mut opts = ProcessOptions::new();
        if let Some(color) = &self.bg_color {
            opts = opts.background(color.as_str());
        }
        if let Some(scale) = self.face_scale {
            opts = opts.face_scale(scale);
        }
        if let Some(b) = self.brightness {
            opts = opts.brightness(b);
        }
        if let Some(c) = self.contrast {
            opts = opts.contrast(c);
        }
        if let Some(enable) = self.enhance_quality {
            opts = opts.enhance_quality(enable);
        }
        if let Some(crop) = self.manual_crop() {
            opts = opts.manual_crop(crop);
        }
        opts
    }

    /// A manual crop, only when all four of x, y, width and height are present.
    pub fn manual_crop(&self) -> Option<ManualCrop> {
        let (Some(x), Some(y), Some(w), Some(h)) =
            (self.crop_x, self.crop_y, self.crop_width, self.crop_height)
        else {
            return None;
        };
        Some(ManualCrop::new(x, y, w, h).rotation(self.crop_rotation.unwrap_or(0.0)))
    }

    pub fn layout_options(&self) -> LayoutOptions {
        let mut layout = LayoutOptions::default();
        if let Some(m) = self.margin {
            layout = layout.margin(m);
        }
        if let Some(s) = self.spacing {
            layout = layout.spacing(s);
        }
        if let Some(c) = self.cut_lines {
            layout = layout.cut_lines(c);
        }
        layout
    }

    /// The sheet to build, if `make_a4` was set.
    pub fn sheet(&self) -> Option<SheetRequest> {
        if !self.make_a4.unwrap_or(false) {
            return None;
        }
        Some(SheetRequest {
            copies: self.copies.unwrap_or(DEFAULT_COPIES),
            layout: self.layout_options(),
        })
    }
}
