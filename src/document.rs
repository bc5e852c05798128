//! Print document emission.
//!
//! A composed [`Sheet`] becomes a single full-bleed PDF page sized to the
//! paper in points, with the 300 DPI raster stretched to fill it. Emission
//! never fails outward: any fault yields a one-page error document, and if
//! even that cannot be written, a bare PDF header.

use std::io::Write;

use flate2::Compression;
use flate2::write::ZlibEncoder;
use image::RgbImage;
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, Stream, dictionary};
use tracing::{error, info};

use crate::error::DocumentError;
use crate::pipeline::PassportPhoto;
use crate::sheet::{
    LayoutOptions, MAX_SHEET_SIDE, Paper, Sheet, canvas_fits, compose_sheet, compose_sheet_mixed,
};

/// Text drawn on the fallback page.
pub const ERROR_MESSAGE: &str = "Error: Could not generate passport photo sheet";

/// Last-resort output when no document can be serialized.
const MINIMAL_PDF: &[u8] = b"%PDF-1.4\n%%EOF\n";

const PDF_VERSION: &str = "1.5";

/// Emitted document bytes plus what went into them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetDocument {
    pub bytes: Vec<u8>,
    /// Photos on the page. Zero for the fallback page.
    pub placed: usize,
    /// Whether the error page was emitted instead of the sheet.
    pub fallback: bool,
}

/// `copies` of one photo on a sheet, as PDF.
pub fn build_sheet(photo: &PassportPhoto, copies: usize, opts: &LayoutOptions) -> SheetDocument {
    emit_pdf(&compose_sheet(photo.image(), copies, opts))
}

/// Photos in order, one per cell, as PDF.
pub fn build_sheet_mixed(photos: &[PassportPhoto], opts: &LayoutOptions) -> SheetDocument {
    emit_pdf(&compose_sheet_mixed(photos.iter().map(PassportPhoto::image), opts))
}

/// Emit a composed sheet, falling back to the error page.
pub fn emit_pdf(sheet: &Sheet) -> SheetDocument {
    match sheet_pdf(sheet) {
        Ok(bytes) => {
            info!(bytes = bytes.len(), placed = sheet.placed, "sheet document emitted");
            SheetDocument {
                bytes,
                placed: sheet.placed,
                fallback: false,
            }
        }
        Err(e) => {
            error!(error = %e, "sheet document failed, emitting error page");
            let bytes = error_page(sheet.paper, &e.to_string()).unwrap_or_else(|e| {
                error!(error = %e, "error page failed");
                MINIMAL_PDF.to_vec()
            });
            SheetDocument {
                bytes,
                placed: 0,
                fallback: true,
            }
        }
    }
}

fn sheet_pdf(sheet: &Sheet) -> Result<Vec<u8>, DocumentError> {
    let canvas = sheet.layout.canvas;
    if !canvas_fits(canvas) {
        return Err(DocumentError::CanvasTooLarge {
            width: canvas.width,
            height: canvas.height,
            max: MAX_SHEET_SIDE,
        });
    }
    render_pdf(&sheet.canvas, sheet.paper)
}

/// One page, `paper` sized, with `raster` drawn edge to edge.
pub fn render_pdf(raster: &RgbImage, paper: Paper) -> Result<Vec<u8>, DocumentError> {
    let (w, h) = raster.dimensions();
    if w == 0 || h == 0 {
        return Err(DocumentError::EmptyRaster);
    }

    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(raster.as_raw())?;
    let pixels = encoder.finish()?;

    let mut doc = Document::with_version(PDF_VERSION);
    let image_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => w as i64,
            "Height" => h as i64,
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        },
        pixels,
    ));

    let (pw, ph) = paper.to_points();
    let (pw, ph) = (pw as f32, ph as f32);
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![pw.into(), 0.into(), 0.into(), ph.into(), 0.into(), 0.into()],
            ),
            Operation::new("Do", vec!["Im0".into()]),
            Operation::new("Q", vec![]),
        ],
    };
    let resources = dictionary! {
        "XObject" => dictionary! { "Im0" => image_id },
    };
    single_page(doc, paper, content, resources)
}

/// The fallback page: a fixed message plus the failure reason.
pub fn error_page(paper: Paper, reason: &str) -> Result<Vec<u8>, DocumentError> {
    let mut doc = Document::with_version(PDF_VERSION);
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let (_, ph) = paper.to_points();
    let top = (ph as f32 - 92.0).max(0.0);
    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![100.into(), top.into()]),
            Operation::new("Tj", vec![Object::string_literal(ERROR_MESSAGE)]),
            Operation::new("Tf", vec!["F1".into(), 9.into()]),
            Operation::new("Td", vec![0.into(), (-18).into()]),
            Operation::new("Tj", vec![Object::string_literal(reason)]),
            Operation::new("ET", vec![]),
        ],
    };
    let resources = dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    };
    single_page(doc, paper, content, resources)
}

fn single_page(
    mut doc: Document,
    paper: Paper,
    content: Content,
    resources: Dictionary,
) -> Result<Vec<u8>, DocumentError> {
    let (pw, ph) = paper.to_points();
    let pages_id = doc.new_object_id();
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
    let resources_id = doc.add_object(resources);
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), (pw as f32).into(), (ph as f32).into()],
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    fn page_dict(doc: &Document) -> &Dictionary {
        let pages = doc.get_pages();
        let id = *pages.get(&1).unwrap();
        doc.get_object(id).unwrap().as_dict().unwrap()
    }

    #[test]
    fn raster_page_is_full_bleed() {
        let raster = RgbImage::from_pixel(40, 60, Rgb([1, 2, 3]));
        let bytes = render_pdf(&raster, Paper::A4).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
        let media = page_dict(&doc).get(b"MediaBox").unwrap().as_array().unwrap();
        let w = media[2].as_float().unwrap();
        let h = media[3].as_float().unwrap();
        assert!((w - 595.28).abs() < 0.01);
        assert!((h - 841.89).abs() < 0.01);
        assert!(contains(&bytes, b"/Im0 Do"));
    }

    #[test]
    fn empty_raster_rejected() {
        assert!(matches!(
            render_pdf(&RgbImage::new(0, 5), Paper::A4),
            Err(DocumentError::EmptyRaster)
        ));
    }

    #[test]
    fn error_page_has_message() {
        let bytes = error_page(Paper::A4, "sheet raster is empty").unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
        assert!(contains(&bytes, ERROR_MESSAGE.as_bytes()));
        assert!(contains(&bytes, b"sheet raster is empty"));
    }

    #[test]
    fn zero_size_paper_falls_back() {
        let opts = LayoutOptions::default().paper(Paper::new(0.0, 0.0));
        let doc = build_sheet(&PassportPhoto::blank(), 4, &opts);
        assert!(doc.fallback);
        assert_eq!(doc.placed, 0);
        assert!(!doc.bytes.is_empty());
        assert!(contains(&doc.bytes, ERROR_MESSAGE.as_bytes()));
    }

    #[test]
    fn oversized_paper_falls_back() {
        for paper in [Paper::new(5000.0, 297.0), Paper::new(f64::INFINITY, f64::INFINITY)] {
            let opts = LayoutOptions::default().paper(paper);
            let doc = build_sheet(&PassportPhoto::blank(), 4, &opts);
            assert!(doc.fallback);
            assert_eq!(doc.placed, 0);
            assert!(doc.bytes.starts_with(b"%PDF-"));
        }
    }

    #[test]
    fn single_and_mixed_sheets() {
        let photo = PassportPhoto::blank();
        let single = build_sheet(&photo, 12, &LayoutOptions::default());
        assert!(!single.fallback);
        assert_eq!(single.placed, 12);

        let mixed = build_sheet_mixed(&[photo.clone(), photo], &LayoutOptions::default());
        assert_eq!(mixed.placed, 2);
        assert_eq!(Document::load_mem(&mixed.bytes).unwrap().get_pages().len(), 1);
    }
}
