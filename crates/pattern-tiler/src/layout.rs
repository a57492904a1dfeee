//! Page grid planning.
//!
//! Splits a normalized pattern (smallest x and y at zero) into a regular grid
//! of printable tiles. Consecutive tiles overlap by `overlap` inches, the
//! strip that carries the alignment marks and page matrix.

use serde::Serialize;

use crate::config::{MM_PER_INCH, SheetConfig};
use crate::geometry::{Path, Point, Rect};

/// Position of a tile's lower-left printable corner relative to the pattern origin [in].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageOffset {
    pub x: f64,
    pub y: f64,
}

/// The planned tile grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageLayout {
    /// Tiles along x
    pub columns: usize,
    /// Tiles along y
    pub rows: usize,
    /// Column-major: tile (column, row) is at `column * rows + row`.
    pub offsets: Vec<PageOffset>,
}

impl PageOffset {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// The tile's printable rectangle in pattern millimeters.
    pub fn printable_rect(&self, config: &SheetConfig) -> Rect {
        let min = Point::new(self.x * MM_PER_INCH, self.y * MM_PER_INCH);
        let max = Point::new(
            min.x + config.available_width() * MM_PER_INCH,
            min.y + config.available_height() * MM_PER_INCH,
        );
        Rect::new(min, max)
    }

    /// Pattern position [mm] of the physical sheet's lower-left corner.
    ///
    /// Subtracting this from a pattern point gives its position on the sheet.
    pub fn sheet_origin(&self, config: &SheetConfig) -> Point {
        Point::new(
            (self.x - config.margin) * MM_PER_INCH,
            (self.y - config.margin) * MM_PER_INCH,
        )
    }
}

impl PageLayout {
    #[inline]
    pub fn page_count(&self) -> usize {
        self.offsets.len()
    }

    #[inline]
    pub fn is_single_page(&self) -> bool {
        self.offsets.len() == 1
    }

    /// (column, row) of the tile at `index`.
    #[inline]
    pub fn position(&self, index: usize) -> (usize, usize) {
        (index / self.rows, index % self.rows)
    }
}

/// Slack allowed before a pattern that exactly fills its tiles spills onto
/// another one; absorbs the mm/in conversion round-off.
const FIT_TOLERANCE: f64 = 1e-9;

/// Tiles needed along one axis.
///
/// `ceil((pattern - paper + 2 margin) / (paper - 2 margin - overlap)) + 1`,
/// never less than one.
pub fn tiles_along(paper_dim: f64, pattern_dim: f64, margin: f64, overlap: f64) -> usize {
    let step = paper_dim - 2.0 * margin - overlap;
    let count = ((pattern_dim - paper_dim + 2.0 * margin) / step - FIT_TOLERANCE).ceil() + 1.0;
    if count.is_finite() && count > 1.0 {
        count as usize
    } else {
        1
    }
}

/// Plan the tile grid for a normalized pattern given in millimeters.
///
/// A pattern that fits on one sheet is centered on it; otherwise the first
/// tile's printable corner sits at the pattern origin.
pub fn plan_pages(path: &Path, config: &SheetConfig) -> PageLayout {
    let (min_x, min_y, max_x, max_y) = path.bounding_box();
    debug_assert!(min_x >= 0.0 && min_y >= 0.0, "plan_pages expects a normalized path");

    let pattern_width = (max_x - min_x) / MM_PER_INCH;
    let pattern_height = (max_y - min_y) / MM_PER_INCH;

    let columns = tiles_along(config.page_width, pattern_width, config.margin, config.overlap);
    let rows = tiles_along(config.page_height, pattern_height, config.margin, config.overlap);

    let (base_x, base_y) = if columns * rows == 1 {
        (
            0.5 * (pattern_width - config.page_width) + config.margin,
            0.5 * (pattern_height - config.page_height) + config.margin,
        )
    } else {
        (0.0, 0.0)
    };

    let step_x = config.available_width() - config.overlap;
    let step_y = config.available_height() - config.overlap;

    let offsets = (0..columns)
        .flat_map(|column| {
            (0..rows).map(move |row| {
                PageOffset::new(
                    base_x + column as f64 * step_x,
                    base_y + row as f64 * step_y,
                )
            })
        })
        .collect();

    PageLayout {
        columns,
        rows,
        offsets,
    }
}
