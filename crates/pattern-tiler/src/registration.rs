//! Registration geometry printed alongside the pattern.
//!
//! Everything here is in sheet millimeters: measured from the lower-left
//! corner of the physical sheet, independent of where the tile sits in the
//! pattern.
//!
//! - The scale mark is a stepped outline with known lengths (1/2in and 1/4in
//!   steps) so the printout can be checked against a ruler.
//! - Alignment marks sit in the middle of the overlap band at each corner.
//!   Diagonal corners share an orientation, so the marks of two neighbouring
//!   sheets complete each other when the sheets are taped together.
//! - The page matrix is a miniature of the tile grid with the current tile
//!   filled in, scaled to fit an `overlap`-sized square.

use crate::config::{MM_PER_INCH, SheetConfig};
use crate::geometry::{Point, Rect};
use crate::layout::PageOffset;

/// Scale mark outline relative to its anchor [mm].
pub const SCALE_MARK_OUTLINE: [(f64, f64); 10] = [
    (12.7, 0.0),
    (0.0, 0.0),
    (0.0, 12.7),
    (12.7, 12.7),
    (12.7, 25.4),
    (0.0, 25.4),
    (0.0, 31.75),
    (6.35, 31.75),
    (6.35, 38.1),
    (0.0, 38.1),
];

/// Alignment mark diameter [in].
pub const MARK_SIZE_INCHES: f64 = 0.3;

/// Scale mark polyline, anchored at (margin, 2 * overlap) inches.
pub fn scale_mark(config: &SheetConfig) -> Vec<Point> {
    let anchor = Point::new(config.margin * MM_PER_INCH, 2.0 * config.overlap * MM_PER_INCH);
    SCALE_MARK_OUTLINE
        .iter()
        .map(|&(x, y)| anchor + Point::new(x, y))
        .collect()
}

// ============================================================================
// ALIGNMENT MARKS
// ============================================================================

/// Which pair of opposite quadrants an alignment mark fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOrientation {
    /// Upper-right and lower-left quadrants
    Normal,
    /// Upper-left and lower-right quadrants
    Rotated,
}

impl MarkOrientation {
    pub fn name(&self) -> &'static str {
        match self {
            MarkOrientation::Normal => "normal",
            MarkOrientation::Rotated => "rotated",
        }
    }

    /// Filled quadrants as (start, end) angles in degrees, counter-clockwise from +x.
    pub fn filled_quadrants(&self) -> [(f64, f64); 2] {
        match self {
            MarkOrientation::Normal => [(0.0, 90.0), (180.0, 270.0)],
            MarkOrientation::Rotated => [(90.0, 180.0), (270.0, 360.0)],
        }
    }
}

/// A circle outline with two opposite quadrants filled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignmentMark {
    pub center: Point,
    /// Circle radius [mm]
    pub half_size: f64,
    pub orientation: MarkOrientation,
}

/// The four corner marks: bottom-left, bottom-right, top-left, top-right.
pub fn alignment_marks(config: &SheetConfig) -> [AlignmentMark; 4] {
    let edge = (config.margin + 0.5 * config.overlap) * MM_PER_INCH;
    let right = config.page_width * MM_PER_INCH - edge;
    let top = config.page_height * MM_PER_INCH - edge;
    let half_size = 0.5 * MARK_SIZE_INCHES * MM_PER_INCH;

    let mark = |x: f64, y: f64, orientation: MarkOrientation| AlignmentMark {
        center: Point::new(x, y),
        half_size,
        orientation,
    };

    [
        mark(edge, edge, MarkOrientation::Normal),
        mark(right, edge, MarkOrientation::Rotated),
        mark(edge, top, MarkOrientation::Rotated),
        mark(right, top, MarkOrientation::Normal),
    ]
}

// ============================================================================
// PAGE MATRIX
// ============================================================================

/// Miniature tile grid with one highlighted cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageMatrix {
    /// Lower-left corner of the grid on the sheet [mm]
    pub origin: Point,
    pub step_x: f64,
    pub step_y: f64,
    pub width: f64,
    pub height: f64,
    /// The current tile's cell, in sheet coordinates
    pub highlight: Rect,
}

impl PageMatrix {
    #[inline]
    pub fn columns(&self) -> usize {
        (self.width / self.step_x).round() as usize
    }

    #[inline]
    pub fn rows(&self) -> usize {
        (self.height / self.step_y).round() as usize
    }
}

/// Smallest gap between distinct values, or zero when all are equal.
fn grid_spacing(mut values: Vec<f64>) -> f64 {
    values.sort_by(f64::total_cmp);
    values.dedup();
    match values.as_slice() {
        [first, second, ..] => second - first,
        _ => 0.0,
    }
}

/// Page matrix for the tile at `current`. `None` with fewer than two tiles.
///
/// Grid spacing comes from the offsets themselves. An axis with a single tile
/// borrows the other axis' spacing scaled by the sheet's aspect ratio, so the
/// cells keep the shape of a sheet.
pub fn page_matrix(offsets: &[PageOffset], current: PageOffset, config: &SheetConfig) -> Option<PageMatrix> {
    if offsets.len() < 2 {
        return None;
    }

    let mut delta_x = grid_spacing(offsets.iter().map(|o| o.x).collect());
    let mut delta_y = grid_spacing(offsets.iter().map(|o| o.y).collect());
    if delta_x == 0.0 && delta_y == 0.0 {
        return None;
    }
    if delta_x == 0.0 {
        delta_x = delta_y * config.page_width / config.page_height;
    }
    if delta_y == 0.0 {
        delta_y = delta_x * config.page_height / config.page_width;
    }

    let min_x = offsets.iter().map(|o| o.x).fold(f64::INFINITY, f64::min);
    let min_y = offsets.iter().map(|o| o.y).fold(f64::INFINITY, f64::min);
    let max_x = offsets.iter().map(|o| o.x).fold(f64::NEG_INFINITY, f64::max);
    let max_y = offsets.iter().map(|o| o.y).fold(f64::NEG_INFINITY, f64::max);

    // Grid extent [mm], one cell past the last offset
    let extent_x = (max_x - min_x + delta_x) * MM_PER_INCH;
    let extent_y = (max_y - min_y + delta_y) * MM_PER_INCH;
    let scale = config.overlap * MM_PER_INCH / extent_x.max(extent_y);

    let origin = Point::new(
        (config.margin + config.overlap) * MM_PER_INCH,
        config.margin * MM_PER_INCH,
    );
    let step_x = delta_x * MM_PER_INCH * scale;
    let step_y = delta_y * MM_PER_INCH * scale;

    let cell_min = origin
        + Point::new(
            (current.x - min_x) * MM_PER_INCH * scale,
            (current.y - min_y) * MM_PER_INCH * scale,
        );

    Some(PageMatrix {
        origin,
        step_x,
        step_y,
        width: extent_x * scale,
        height: extent_y * scale,
        highlight: Rect::new(cell_min, cell_min + Point::new(step_x, step_y)),
    })
}
