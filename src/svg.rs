//! SVG preview of a sheet layout.
//!
//! Draws the page scaled to a fixed panel, with the margin box, every grid
//! cell (filled if a photo lands there, outlined if it stays empty, hatched
//! red if it falls off the page), and the cut guides.
//!
//! # Example
//!
//! ```
//! use passport_photo::sheet::LayoutOptions;
//! use passport_photo::svg::render_sheet_svg;
//!
//! let layout = LayoutOptions::default().layout();
//! let svg = render_sheet_svg(&layout, 12);
//! assert!(svg.starts_with("<svg"));
//! assert_eq!(svg.matches(r#"class="cell placed""#).count(), 12);
//! ```

use crate::sheet::{CUT_LINE_OVERHANG, SheetLayout};

/// Maximum width of the page panel.
const MAX_PANEL_W: f64 = 400.0;
/// Maximum height of the page panel.
const MAX_PANEL_H: f64 = 566.0;
/// Space around the panel.
const MARGIN: f64 = 30.0;
/// Height of the label area above the panel.
const LABEL_H: f64 = 40.0;

/// Render `layout` with the first `placed` fitting cells marked as filled.
pub fn render_sheet_svg(layout: &SheetLayout, placed: usize) -> String {
    let canvas = layout.canvas;
    let (pw, ph, scale) = scale_to_fit(canvas.width, canvas.height);
    let total_w = pw + 2.0 * MARGIN;
    let total_h = ph + 2.0 * MARGIN + LABEL_H;
    let (ox, oy) = (MARGIN, MARGIN + LABEL_H);
    let sx = |x: i64| ox + x as f64 * scale;
    let sy = |y: i64| oy + y as f64 * scale;

    let mut svg = String::with_capacity(8192);
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {} {}">"#,
        total_w as u32, total_h as u32, total_w, total_h
    ));
    svg.push('\n');
    svg.push_str(
        r##"<style>
  text { font-family: "Consolas", "DejaVu Sans Mono", "Courier New", monospace; }
  .label { font-size: 13px; font-weight: bold; fill: #333; }
  .annotation { font-size: 11px; fill: #666; }
  .page { fill: #fff; stroke: #999; stroke-width: 1; }
  .margin { fill: none; stroke: #bbb; stroke-width: 0.75; stroke-dasharray: 4,2; }
  .cell { stroke-width: 1; }
  .placed { fill: #6ba3d6; stroke: #2c6faa; }
  .empty { fill: none; stroke: #6ba3d6; stroke-dasharray: 3,2; }
  .offpage { fill: #f2b8b8; stroke: #c44; stroke-dasharray: 2,2; }
  .guide { stroke: #c8c8c8; stroke-width: 1; }
  @media (prefers-color-scheme: dark) {
    .label { fill: #e0e0e0; }
    .annotation { fill: #aaa; }
    .page { fill: #2d2d2d; stroke: #555; }
    .placed { fill: #3a72a4; stroke: #5a9fd4; }
    .guide { stroke: #666; }
  }
</style>
"##,
    );

    let (cols, rows) = (layout.cols, layout.rows);
    svg.push_str(&format!(
        r#"<text x="{:.1}" y="{:.1}" class="label">{}</text>"#,
        ox,
        MARGIN + 14.0,
        escape_xml(&format!(
            "Sheet  {}×{}  grid {cols}×{rows}  placed {placed}",
            canvas.width, canvas.height
        ))
    ));
    svg.push('\n');
    svg.push_str(&format!(
        r#"<text x="{:.1}" y="{:.1}" class="annotation">{}</text>"#,
        ox,
        MARGIN + 30.0,
        escape_xml(&format!(
            "cell {}  spacing {}  margin {}  offset ({}, {})",
            layout.cell_size, layout.spacing, layout.margin, layout.x_offset, layout.y_offset
        ))
    ));
    svg.push('\n');

    rect(&mut svg, ox, oy, pw, ph, "page");
    let m = layout.margin as i64;
    let inner_w = (canvas.width as i64 - 2 * m).max(0);
    let inner_h = (canvas.height as i64 - 2 * m).max(0);
    rect(&mut svg, sx(m), sy(m), inner_w as f64 * scale, inner_h as f64 * scale, "margin");

    let mut remaining = placed;
    for cell in layout.cells() {
        let side = cell.size as f64 * scale;
        let class = if !cell.fits_within(canvas) {
            "cell offpage"
        } else if remaining > 0 {
            remaining -= 1;
            "cell placed"
        } else {
            "cell empty"
        };
        rect(&mut svg, sx(cell.x), sy(cell.y), side, side, class);
    }

    let (grid_w, grid_h) = layout.grid_extent();
    let (top, bottom) = (
        layout.y_offset - CUT_LINE_OVERHANG,
        layout.y_offset + grid_h + CUT_LINE_OVERHANG,
    );
    for x in layout.vertical_guides() {
        line(&mut svg, sx(x), sy(top), sx(x), sy(bottom));
    }
    let (left, right) = (
        layout.x_offset - CUT_LINE_OVERHANG,
        layout.x_offset + grid_w + CUT_LINE_OVERHANG,
    );
    for y in layout.horizontal_guides() {
        line(&mut svg, sx(left), sy(y), sx(right), sy(y));
    }

    svg.push_str("</svg>\n");
    svg
}

fn rect(svg: &mut String, x: f64, y: f64, w: f64, h: f64, class: &str) {
    svg.push_str(&format!(
        r#"<rect x="{x:.1}" y="{y:.1}" width="{w:.1}" height="{h:.1}" class="{class}"/>"#
    ));
    svg.push('\n');
}

fn line(svg: &mut String, x1: f64, y1: f64, x2: f64, y2: f64) {
    svg.push_str(&format!(
        r#"<line x1="{x1:.1}" y1="{y1:.1}" x2="{x2:.1}" y2="{y2:.1}" class="guide"/>"#
    ));
    svg.push('\n');
}

/// Scale a canvas to fit the panel, preserving aspect ratio.
fn scale_to_fit(width: u32, height: u32) -> (f64, f64, f64) {
    let (w, h) = (width as f64, height as f64);
    if w == 0.0 || h == 0.0 {
        return (1.0, 1.0, 1.0);
    }
    let scale = (MAX_PANEL_W / w).min(MAX_PANEL_H / h);
    (w * scale, h * scale, scale)
}

/// Escape special characters for XML text content.
fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
