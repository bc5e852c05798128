//! Print sheet layout: a centered grid of square photo cells on paper.
//!
//! [`SheetLayout::compute`] is pure arithmetic. [`compose_sheet`] and
//! [`compose_sheet_mixed`] rasterize photos into a white canvas at 300 DPI
//! and optionally overlay cut guides.
//!
//! # Example
//!
//! ```
//! use passport_photo::sheet::{Paper, SheetLayout};
//!
//! let canvas = Paper::A4.to_pixels(300);
//! let layout = SheetLayout::compute(canvas, 600, 60, 30);
//! assert_eq!((layout.cols, layout.rows), (3, 5));
//! assert_eq!((layout.x_offset, layout.y_offset), (310, 194));
//! ```

use std::borrow::Cow;

use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage};
use tracing::{debug, info, warn};

use crate::geometry::Size;
use crate::pipeline::PASSPORT_SIZE;

/// Raster resolution of composed sheets.
pub const SHEET_DPI: u32 = 300;
/// Default copies on a single-photo sheet.
pub const DEFAULT_COPIES: usize = 12;
/// Cut guide color.
pub const CUT_LINE_COLOR: Rgb<u8> = Rgb([200, 200, 200]);
/// How far cut guides run past the grid on each end, in pixels.
pub const CUT_LINE_OVERHANG: i64 = 10;
/// Largest sheet canvas side that will be rasterized.
pub const MAX_SHEET_SIDE: u32 = 20_000;

const MM_PER_INCH: f64 = 25.4;
const POINTS_PER_INCH: f64 = 72.0;

/// Physical paper size in millimetres.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Paper {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl Paper {
    /// ISO A4, 210 × 297 mm.
    pub const A4: Self = Self::new(210.0, 297.0);

    pub const fn new(width_mm: f64, height_mm: f64) -> Self {
        Self {
            width_mm,
            height_mm,
        }
    }

    /// Page size in PostScript points.
    pub fn to_points(self) -> (f64, f64) {
        (
            self.width_mm / MM_PER_INCH * POINTS_PER_INCH,
            self.height_mm / MM_PER_INCH * POINTS_PER_INCH,
        )
    }

    /// Raster size at `dpi`, rounded to whole pixels.
    pub fn to_pixels(self, dpi: u32) -> Size {
        let px = |mm: f64| (mm / MM_PER_INCH * dpi as f64).round().max(0.0) as u32;
        Size::new(px(self.width_mm), px(self.height_mm))
    }
}

impl Default for Paper {
    fn default() -> Self {
        Self::A4
    }
}

/// Grid geometry for one sheet.
///
/// Offsets are signed: when margins and spacing leave no room, the grid is
/// wider than the canvas and the centering offset goes negative. That is
/// kept as computed; placement skips cells that fall outside.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SheetLayout {
    pub canvas: Size,
    pub cols: u32,
    pub rows: u32,
    pub cell_size: u32,
    pub spacing: u32,
    pub margin: u32,
    pub x_offset: i64,
    pub y_offset: i64,
}

/// One grid cell in canvas pixels.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    pub col: u32,
    pub row: u32,
    pub x: i64,
    pub y: i64,
    pub size: u32,
}

impl Cell {
    /// Whether the whole cell lies on the canvas.
    pub fn fits_within(&self, canvas: Size) -> bool {
        let size = self.size as i64;
        self.x >= 0
            && self.y >= 0
            && self.x + size <= canvas.width as i64
            && self.y + size <= canvas.height as i64
    }
}

impl SheetLayout {
    /// Fit as many `cell_size` squares as the margins allow (at least one
    /// per axis) and center the grid on the canvas.
    pub fn compute(canvas: Size, cell_size: u32, margin: u32, spacing: u32) -> Self {
        let pitch = (cell_size as i64 + spacing as i64).max(1);
        let count = |extent: u32| {
            let available = extent as i64 - 2 * margin as i64;
            (available + spacing as i64).div_euclid(pitch).clamp(1, u32::MAX as i64) as u32
        };
        let cols = count(canvas.width);
        let rows = count(canvas.height);

        let mut layout = Self {
            canvas,
            cols,
            rows,
            cell_size,
            spacing,
            margin,
            x_offset: 0,
            y_offset: 0,
        };
        let (grid_w, grid_h) = layout.grid_extent();
        layout.x_offset = (canvas.width as i64 - grid_w).div_euclid(2);
        layout.y_offset = (canvas.height as i64 - grid_h).div_euclid(2);
        layout
    }

    pub fn total_cells(&self) -> u64 {
        self.cols as u64 * self.rows as u64
    }

    /// Width and height of the grid, cells plus inner spacing.
    pub fn grid_extent(&self) -> (i64, i64) {
        let span = |n: u32| n as i64 * self.cell_size as i64 + (n as i64 - 1) * self.spacing as i64;
        (span(self.cols), span(self.rows))
    }

    fn pitch(&self) -> i64 {
        self.cell_size as i64 + self.spacing as i64
    }

    pub fn cell(&self, col: u32, row: u32) -> Cell {
        Cell {
            col,
            row,
            x: self.x_offset + col as i64 * self.pitch(),
            y: self.y_offset + row as i64 * self.pitch(),
            size: self.cell_size,
        }
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.cols).map(move |col| self.cell(col, row)))
    }

    /// Canvas x of each vertical cut guide (middle of each column gap).
    pub fn vertical_guides(&self) -> impl Iterator<Item = i64> + '_ {
        (1..self.cols).map(move |c| self.x_offset + c as i64 * self.pitch() - self.spacing as i64 / 2)
    }

    /// Canvas y of each horizontal cut guide.
    pub fn horizontal_guides(&self) -> impl Iterator<Item = i64> + '_ {
        (1..self.rows).map(move |r| self.y_offset + r as i64 * self.pitch() - self.spacing as i64 / 2)
    }
}

/// Sheet composition settings.
///
/// ```
/// use passport_photo::sheet::LayoutOptions;
///
/// let opts = LayoutOptions::default().margin(40).cut_lines(false);
/// assert_eq!((opts.margin, opts.spacing, opts.cut_lines), (40, 30, false));
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LayoutOptions {
    pub margin: u32,
    pub spacing: u32,
    pub cut_lines: bool,
    pub paper: Paper,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            margin: 60,
            spacing: 30,
            cut_lines: true,
            paper: Paper::A4,
        }
    }
}

impl LayoutOptions {
    pub fn margin(mut self, px: u32) -> Self {
        self.margin = px;
        self
    }

    pub fn spacing(mut self, px: u32) -> Self {
        self.spacing = px;
        self
    }

    pub fn cut_lines(mut self, enable: bool) -> Self {
        self.cut_lines = enable;
        self
    }

    pub fn paper(mut self, paper: Paper) -> Self {
        self.paper = paper;
        self
    }

    /// Layout for canonical photos on this paper at [`SHEET_DPI`].
    pub fn layout(&self) -> SheetLayout {
        SheetLayout::compute(
            self.paper.to_pixels(SHEET_DPI),
            PASSPORT_SIZE,
            self.margin,
            self.spacing,
        )
    }
}

/// A rasterized sheet.
#[derive(Clone, Debug)]
pub struct Sheet {
    pub canvas: RgbImage,
    pub layout: SheetLayout,
    pub paper: Paper,
    /// Photos actually placed.
    pub placed: usize,
}

/// `copies` of one photo, row-major, stopping at `copies` or when cells run out.
pub fn compose_sheet(photo: &RgbImage, copies: usize, opts: &LayoutOptions) -> Sheet {
    let layout = opts.layout();
    let fitted = fit_cell(photo, layout.cell_size);
    let photos = std::iter::repeat_n(Cow::Borrowed(&*fitted), copies);
    let sheet = compose(photos, layout, opts);
    info!(placed = sheet.placed, requested = copies, "sheet composed");
    sheet
}

/// Each cell takes the next photo in order until photos or cells run out.
/// Photos not already cell-sized are resized with Lanczos3.
pub fn compose_sheet_mixed<'p, I>(photos: I, opts: &LayoutOptions) -> Sheet
where
    I: IntoIterator<Item = &'p RgbImage>,
{
    let layout = opts.layout();
    let photos = photos.into_iter().map(|p| fit_cell(p, layout.cell_size));
    let sheet = compose(photos, layout, opts);
    info!(placed = sheet.placed, "mixed sheet composed");
    sheet
}

/// Whether a canvas of this size will be rasterized.
pub fn canvas_fits(canvas: Size) -> bool {
    canvas.width <= MAX_SHEET_SIDE && canvas.height <= MAX_SHEET_SIDE
}

fn compose<'p>(photos: impl Iterator<Item = Cow<'p, RgbImage>>, layout: SheetLayout, opts: &LayoutOptions) -> Sheet {
    if !canvas_fits(layout.canvas) {
        warn!(
            width = layout.canvas.width,
            height = layout.canvas.height,
            max = MAX_SHEET_SIDE,
            "sheet canvas too large, not rasterized"
        );
        return Sheet {
            canvas: RgbImage::new(0, 0),
            layout,
            paper: opts.paper,
            placed: 0,
        };
    }
    let mut canvas = RgbImage::from_pixel(
        layout.canvas.width,
        layout.canvas.height,
        Rgb([255, 255, 255]),
    );
    debug!(?layout, "sheet layout");
    let placed = fill_cells(&mut canvas, &layout, photos);
    if opts.cut_lines {
        draw_cut_guides(&mut canvas, &layout);
    }
    Sheet {
        canvas,
        layout,
        paper: opts.paper,
        placed,
    }
}

/// Paste photos into fitting cells. A cell that does not fit is skipped
/// without consuming a photo.
fn fill_cells<'p>(
    canvas: &mut RgbImage,
    layout: &SheetLayout,
    photos: impl Iterator<Item = Cow<'p, RgbImage>>,
) -> usize {
    let bounds = Size::new(canvas.width(), canvas.height());
    let mut photos = photos.peekable();
    let mut placed = 0;
    for cell in layout.cells() {
        if photos.peek().is_none() {
            break;
        }
        if !cell.fits_within(bounds) {
            debug!(col = cell.col, row = cell.row, x = cell.x, y = cell.y, "cell off canvas, skipped");
            continue;
        }
        let Some(photo) = photos.next() else { break };
        imageops::replace(canvas, &*photo, cell.x, cell.y);
        placed += 1;
    }
    placed
}

/// Borrow when already `cell × cell`, otherwise resize.
pub fn fit_cell(photo: &RgbImage, cell: u32) -> Cow<'_, RgbImage> {
    if photo.dimensions() == (cell, cell) {
        Cow::Borrowed(photo)
    } else {
        Cow::Owned(imageops::resize(photo, cell, cell, FilterType::Lanczos3))
    }
}

/// 1 px guides through the middle of each inter-cell gap, running
/// [`CUT_LINE_OVERHANG`] past the grid at both ends. Clipped to the canvas.
pub fn draw_cut_guides(canvas: &mut RgbImage, layout: &SheetLayout) {
    let (grid_w, grid_h) = layout.grid_extent();
    let (w, h) = (canvas.width() as i64, canvas.height() as i64);

    let y0 = (layout.y_offset - CUT_LINE_OVERHANG).max(0);
    let y1 = (layout.y_offset + grid_h + CUT_LINE_OVERHANG).min(h - 1);
    for x in layout.vertical_guides().filter(|x| (0..w).contains(x)) {
        for y in y0..=y1 {
            canvas.put_pixel(x as u32, y as u32, CUT_LINE_COLOR);
        }
    }

    let x0 = (layout.x_offset - CUT_LINE_OVERHANG).max(0);
    let x1 = (layout.x_offset + grid_w + CUT_LINE_OVERHANG).min(w - 1);
    for y in layout.horizontal_guides().filter(|y| (0..h).contains(y)) {
        for x in x0..=x1 {
            canvas.put_pixel(x as u32, y as u32, CUT_LINE_COLOR);
        }
    }
}

/// Columns and rows of `photo_mm` squares that fit on `paper`.
///
/// The usual defaults are a 51 mm photo, 20 mm margin and 10 mm spacing,
/// which gives 2 × 4 on A4.
pub fn estimate_grid_mm(photo_mm: f64, margin_mm: f64, spacing_mm: f64, paper: Paper) -> (u32, u32) {
    let pitch = photo_mm + spacing_mm;
    let count = |extent: f64| {
        let n = ((extent - 2.0 * margin_mm + spacing_mm) / pitch).floor();
        if n.is_finite() && n >= 1.0 {
            n.min(u32::MAX as f64) as u32
        } else {
            1
        }
    };
    (count(paper.width_mm), count(paper.height_mm))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn a4() -> Size {
        Paper::A4.to_pixels(SHEET_DPI)
    }

    // ── Paper ───────────────────────────────────────────────────────────

    #[test]
    fn oversized_paper_not_rasterized() {
        // 5 m wide at 300 DPI is about 59k pixels.
        let opts = LayoutOptions::default().paper(Paper::new(5000.0, 297.0));
        assert!(!canvas_fits(opts.layout().canvas));
        let sheet = compose_sheet(&RgbImage::new(600, 600), 4, &opts);
        assert_eq!(sheet.canvas.dimensions(), (0, 0));
        assert_eq!(sheet.placed, 0);
        assert!(canvas_fits(Size::new(MAX_SHEET_SIDE, MAX_SHEET_SIDE)));
    }

    #[test]
    fn a4_pixels_and_points() {
        assert_eq!(a4(), Size::new(2480, 3508));
        let (w, h) = Paper::A4.to_points();
        assert!((w - 595.28).abs() < 0.01);
        assert!((h - 841.89).abs() < 0.01);
    }

    // ── SheetLayout ─────────────────────────────────────────────────────

    #[test]
    fn a4_default_grid() {
        let l = SheetLayout::compute(a4(), 600, 60, 30);
        assert_eq!((l.cols, l.rows), (3, 5));
        assert_eq!(l.total_cells(), 15);
        assert_eq!(l.grid_extent(), (1860, 3120));
        assert_eq!((l.x_offset, l.y_offset), (310, 194));
    }

    #[test]
    fn at_least_one_cell_each_axis() {
        let l = SheetLayout::compute(Size::new(100, 100), 600, 60, 30);
        assert_eq!((l.cols, l.rows), (1, 1));
        // (100 - 600) / 2 floors to -250
        assert_eq!((l.x_offset, l.y_offset), (-250, -250));
    }

    #[test]
    fn negative_offset_floors() {
        let l = SheetLayout::compute(Size::new(99, 99), 100, 0, 0);
        assert_eq!(l.x_offset, -1);
    }

    #[test]
    fn cells_row_major() {
        let l = SheetLayout::compute(a4(), 600, 60, 30);
        let cells: Vec<_> = l.cells().take(4).collect();
        assert_eq!((cells[0].col, cells[0].row), (0, 0));
        assert_eq!((cells[2].col, cells[2].row), (2, 0));
        assert_eq!((cells[3].col, cells[3].row), (0, 1));
        assert_eq!(cells[1].x - cells[0].x, 630);
        assert_eq!(cells[3].y - cells[0].y, 630);
    }

    #[test]
    fn cell_bounds() {
        let canvas = Size::new(100, 100);
        let cell = |x, y| Cell {
            col: 0,
            row: 0,
            x,
            y,
            size: 50,
        };
        assert!(cell(0, 0).fits_within(canvas));
        assert!(cell(50, 50).fits_within(canvas));
        assert!(!cell(51, 0).fits_within(canvas));
        assert!(!cell(-1, 0).fits_within(canvas));
    }

    #[test]
    fn guide_positions() {
        let l = SheetLayout::compute(a4(), 600, 60, 30);
        let xs: Vec<_> = l.vertical_guides().collect();
        assert_eq!(xs, vec![310 + 630 - 15, 310 + 1260 - 15]);
        assert_eq!(l.horizontal_guides().count(), 4);
    }

    // ── composition ─────────────────────────────────────────────────────

    fn photo(v: u8) -> RgbImage {
        RgbImage::from_pixel(PASSPORT_SIZE, PASSPORT_SIZE, Rgb([v, 0, 0]))
    }

    #[test]
    fn twelve_copies_placed() {
        let sheet = compose_sheet(&photo(10), DEFAULT_COPIES, &LayoutOptions::default());
        assert_eq!(sheet.placed, 12);
        assert_eq!(sheet.canvas.dimensions(), (2480, 3508));
        // First cell top-left, last placed cell is (2, 3).
        assert_eq!(sheet.canvas.get_pixel(310, 194).0, [10, 0, 0]);
        let last = sheet.layout.cell(2, 3);
        assert_eq!(sheet.canvas.get_pixel(last.x as u32, last.y as u32).0, [10, 0, 0]);
        let unused = sheet.layout.cell(0, 4);
        assert_eq!(
            sheet.canvas.get_pixel(unused.x as u32 + 5, unused.y as u32 + 5).0,
            [255, 255, 255]
        );
    }

    #[test]
    fn copies_capped_by_cells() {
        let sheet = compose_sheet(&photo(1), 100, &LayoutOptions::default());
        assert_eq!(sheet.placed, 15);
    }

    #[test]
    fn zero_copies_is_blank_sheet() {
        let sheet = compose_sheet(&photo(1), 0, &LayoutOptions::default().cut_lines(false));
        assert_eq!(sheet.placed, 0);
        assert!(sheet.canvas.pixels().all(|p| p.0 == [255, 255, 255]));
    }

    #[test]
    fn mixed_in_order_and_resized() {
        let small = RgbImage::from_pixel(300, 200, Rgb([0, 9, 0]));
        let photos = [photo(1), small, photo(3)];
        let sheet = compose_sheet_mixed(&photos, &LayoutOptions::default());
        assert_eq!(sheet.placed, 3);
        let px = |col| {
            let c = sheet.layout.cell(col, 0);
            sheet.canvas.get_pixel(c.x as u32 + 300, c.y as u32 + 300).0
        };
        assert_eq!(px(0), [1, 0, 0]);
        assert_eq!(px(1), [0, 9, 0]);
        assert_eq!(px(2), [3, 0, 0]);
    }

    #[test]
    fn mixed_empty() {
        let none: Vec<RgbImage> = Vec::new();
        let sheet = compose_sheet_mixed(&none, &LayoutOptions::default());
        assert_eq!(sheet.placed, 0);
    }

    #[test]
    fn off_canvas_cells_skipped() {
        // Paper narrower than one cell: the only column is off canvas.
        let opts = LayoutOptions::default().paper(Paper::new(40.0, 297.0));
        let sheet = compose_sheet(&photo(1), 5, &opts);
        assert_eq!(sheet.layout.cols, 1);
        assert!(sheet.layout.x_offset < 0);
        assert_eq!(sheet.placed, 0);
    }

    #[test]
    fn fit_cell_borrows_when_sized() {
        let p = photo(7);
        assert!(matches!(fit_cell(&p, PASSPORT_SIZE), Cow::Borrowed(_)));
        assert_eq!(*fit_cell(&p, PASSPORT_SIZE), p);
        assert_eq!(fit_cell(&p, 300).dimensions(), (300, 300));
    }

    #[test]
    fn cut_guides_drawn_in_gaps() {
        let sheet = compose_sheet(&photo(1), 0, &LayoutOptions::default());
        let l = sheet.layout;
        let x = l.vertical_guides().next().unwrap() as u32;
        assert_eq!(sheet.canvas.get_pixel(x, l.y_offset as u32).0, [200, 200, 200]);
        assert_eq!(sheet.canvas.get_pixel(x, (l.y_offset - 10) as u32).0, [200, 200, 200]);
        assert_eq!(sheet.canvas.get_pixel(x, (l.y_offset - 11) as u32).0, [255, 255, 255]);
        assert_eq!(sheet.canvas.get_pixel(x + 1, l.y_offset as u32).0, [255, 255, 255]);
    }

    #[test]
    fn cut_guides_clipped() {
        // 2 × 2 grid of 20 px cells, offset 3; overhang runs off every edge.
        let layout = SheetLayout::compute(Size::new(50, 50), 20, 0, 4);
        assert_eq!((layout.cols, layout.x_offset), (2, 3));
        let mut canvas = RgbImage::from_pixel(50, 50, Rgb([255, 255, 255]));
        draw_cut_guides(&mut canvas, &layout);
        assert_eq!(canvas.get_pixel(25, 0).0, [200, 200, 200]);
        assert_eq!(canvas.get_pixel(25, 49).0, [200, 200, 200]);
        assert_eq!(canvas.get_pixel(0, 25).0, [200, 200, 200]);
        assert_eq!(canvas.get_pixel(24, 10).0, [255, 255, 255]);
    }

    // ── estimate_grid_mm ────────────────────────────────────────────────

    #[test]
    fn estimate_defaults_on_a4() {
        // (210 - 40 + 10) / 61 = 2.95 → 2; (297 - 40 + 10) / 61 = 4.37 → 4
        assert_eq!(estimate_grid_mm(51.0, 20.0, 10.0, Paper::A4), (2, 4));
    }

    #[test]
    fn estimate_never_zero() {
        assert_eq!(estimate_grid_mm(500.0, 20.0, 10.0, Paper::A4), (1, 1));
        assert_eq!(estimate_grid_mm(0.0, 0.0, 0.0, Paper::A4), (1, 1));
    }
}
