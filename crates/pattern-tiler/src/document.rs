//! Page assembly.
//!
//! Turns a pattern and a sheet configuration into a [`Document`]: one
//! [`Page`] per tile that actually carries part of the pattern, each holding
//! the drawing primitives for that sheet in sheet millimeters. Serializers
//! (TikZ, SVG) only read this model.

use std::fs;

use tracing::{debug, info, warn};

use crate::clip::clip_path;
use crate::config::SheetConfig;
use crate::error::{Result, TilerError};
use crate::geometry::{Path, Point};
use crate::layout::{PageLayout, PageOffset, plan_pages};
use crate::registration::{AlignmentMark, PageMatrix, alignment_marks, page_matrix, scale_mark};
use crate::rotation::optimize_rotation;

/// One thing drawn on a sheet. Coordinates are sheet millimeters.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// A run of the pattern outline.
    Polyline { points: Vec<Point>, closed: bool },
    /// The 1:1 scale reference.
    ScaleMark { points: Vec<Point> },
    AlignmentMark(AlignmentMark),
    PageMatrix(PageMatrix),
}

/// A retained sheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Index into the planned grid (column-major)
    pub index: usize,
    pub column: usize,
    pub row: usize,
    pub offset: PageOffset,
    pub primitives: Vec<Primitive>,
}

/// The assembled output of one generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub config: SheetConfig,
    /// Rotation applied to the pattern before layout
    pub rotation_degrees: f64,
    /// Every planned tile, blank ones included
    pub grid: PageLayout,
    /// Tiles that carry part of the pattern, in grid order
    pub pages: Vec<Page>,
}

impl Page {
    pub fn polylines(&self) -> impl Iterator<Item = (&[Point], bool)> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Polyline { points, closed } => Some((points.as_slice(), *closed)),
            _ => None,
        })
    }

    pub fn has_scale_mark(&self) -> bool {
        self.primitives.iter().any(|p| matches!(p, Primitive::ScaleMark { .. }))
    }

    pub fn alignment_marks(&self) -> impl Iterator<Item = &AlignmentMark> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::AlignmentMark(mark) => Some(mark),
            _ => None,
        })
    }

    pub fn page_matrix(&self) -> Option<&PageMatrix> {
        self.primitives.iter().find_map(|p| match p {
            Primitive::PageMatrix(matrix) => Some(matrix),
            _ => None,
        })
    }
}

impl Document {
    #[inline]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// For each grid index, whether its tile was kept.
    pub fn retained(&self) -> Vec<bool> {
        let mut retained = vec![false; self.grid.page_count()];
        for page in &self.pages {
            retained[page.index] = true;
        }
        retained
    }
}

// ============================================================================
// SCALE MARK PLACEMENT
// ============================================================================

/// Where the scale mark goes: on the first page that is not blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScaleMarkState {
    #[default]
    AwaitingFirstNonBlankPage,
    Emitting,
}

impl ScaleMarkState {
    /// Advance past one page; true when the scale mark belongs on it.
    pub fn advance(&mut self, page_is_blank: bool) -> bool {
        match (*self, page_is_blank) {
            (ScaleMarkState::AwaitingFirstNonBlankPage, false) => {
                *self = ScaleMarkState::Emitting;
                true
            }
            _ => false,
        }
    }
}

// ============================================================================
// ASSEMBLY
// ============================================================================

/// Clip `path` (already rotated and normalized) to every tile of `layout`.
pub fn assemble(path: &Path, config: &SheetConfig, rotation_degrees: f64, layout: PageLayout) -> Document {
    let multi_page = layout.page_count() > 1;
    let mut scale_state = ScaleMarkState::default();
    let mut pages = Vec::new();

    for (index, offset) in layout.offsets.iter().copied().enumerate() {
        let clipped = clip_path(path, &offset.printable_rect(config));
        let (column, row) = layout.position(index);
        debug!(
            index,
            column,
            row,
            points = clipped.points_on_page,
            runs = clipped.runs.len(),
            "clipped page"
        );

        let blank = clipped.is_blank();
        let place_scale_mark = scale_state.advance(blank);
        if blank {
            continue;
        }

        let mut primitives = Vec::new();
        if place_scale_mark {
            primitives.push(Primitive::ScaleMark {
                points: scale_mark(config),
            });
        }

        let origin = offset.sheet_origin(config);
        primitives.extend(clipped.runs.into_iter().map(|run| Primitive::Polyline {
            points: run.points.into_iter().map(|p| p - origin).collect(),
            closed: run.closed,
        }));

        if multi_page {
            primitives.extend(alignment_marks(config).into_iter().map(Primitive::AlignmentMark));
            if let Some(matrix) = page_matrix(&layout.offsets, offset, config) {
                primitives.push(Primitive::PageMatrix(matrix));
            }
        }

        pages.push(Page {
            index,
            column,
            row,
            offset,
            primitives,
        });
    }

    Document {
        config: *config,
        rotation_degrees,
        grid: layout,
        pages,
    }
}

/// Knobs for [`generate_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Search for the rotation needing the fewest sheets
    pub optimize_rotation: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            optimize_rotation: true,
        }
    }
}

/// Lay `path` (millimeters) out over sheets, rotating it to save paper.
pub fn generate(path: &Path, config: &SheetConfig) -> Result<Document> {
    generate_with(path, config, GenerateOptions::default())
}

pub fn generate_with(path: &Path, config: &SheetConfig, options: GenerateOptions) -> Result<Document> {
    config.validate()?;

    let normalized = path.shifted_to_origin();
    let rotation_degrees = if options.optimize_rotation {
        optimize_rotation(&normalized, config).angle_degrees
    } else {
        0.0
    };

    let placed = normalized.rotated(rotation_degrees).shifted_to_origin();
    let layout = plan_pages(&placed, config);
    info!(
        columns = layout.columns,
        rows = layout.rows,
        tiles = layout.page_count(),
        "planned tile grid"
    );

    let document = assemble(&placed, config, rotation_degrees, layout);
    info!(
        pages = document.page_count(),
        skipped = document.grid.page_count() - document.page_count(),
        "assembled document"
    );
    Ok(document)
}

// ============================================================================
// OUTPUT
// ============================================================================

/// Write a serialized document to `dest`, replacing any existing file.
pub fn write_document(dest: impl AsRef<std::path::Path>, text: &str) -> Result<()> {
    let dest = dest.as_ref();
    fs::write(dest, text).map_err(|e| TilerError::io(dest, e))
}

/// [`write_document`] that reports failure as `false` instead of an error.
pub fn try_write_document(dest: impl AsRef<std::path::Path>, text: &str) -> bool {
    match write_document(dest, text) {
        Ok(()) => true,
        Err(e) => {
            warn!("{}", e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MM_PER_INCH;
    use approx::assert_relative_eq;

    fn rectangle_in(width_in: f64, height_in: f64) -> Path {
        let w = width_in * MM_PER_INCH;
        let h = height_in * MM_PER_INCH;
        Path::closed(vec![
            Point::new(0.0, 0.0),
            Point::new(w, 0.0),
            Point::new(w, h),
            Point::new(0.0, h),
        ])
        .unwrap()
    }

    fn polyline_bounds(page: &Page) -> (f64, f64, f64, f64) {
        let points: Vec<Point> = page.polylines().flat_map(|(pts, _)| pts.iter().copied()).collect();
        let path = Path::open(points).unwrap();
        path.bounding_box()
    }

    #[test]
    fn scale_mark_state_waits_for_content() {
        let mut state = ScaleMarkState::default();
        assert!(!state.advance(true));
        assert!(!state.advance(true));
        assert_eq!(state, ScaleMarkState::AwaitingFirstNonBlankPage);
        assert!(state.advance(false));
        assert_eq!(state, ScaleMarkState::Emitting);
        assert!(!state.advance(false));
        assert!(!state.advance(true));
    }

    #[test]
    fn ten_inch_square_is_one_centered_page() {
        let config = SheetConfig::default();
        let document = generate(&rectangle_in(10.0, 10.0), &config).unwrap();

        assert_eq!(document.rotation_degrees, 0.0);
        assert_eq!(document.page_count(), 1);
        let page = &document.pages[0];
        assert!(page.has_scale_mark());
        assert_eq!(page.alignment_marks().count(), 0);
        assert!(page.page_matrix().is_none());

        // Centered on the 17 x 11 sheet
        let (min_x, min_y, max_x, max_y) = polyline_bounds(page);
        assert_relative_eq!((min_x + max_x) / 2.0, 8.5 * MM_PER_INCH, epsilon = 1e-6);
        assert_relative_eq!((min_y + max_y) / 2.0, 5.5 * MM_PER_INCH, epsilon = 1e-6);
        assert_relative_eq!(max_x - min_x, 10.0 * MM_PER_INCH, epsilon = 1e-6);
    }

    #[test]
    fn thirty_by_ten_spans_pages_with_registration() {
        let config = SheetConfig::default();
        let document = generate(&rectangle_in(30.0, 10.0), &config).unwrap();

        assert_eq!(document.rotation_degrees, 0.0);
        assert!(document.grid.columns > 1);
        assert_eq!(document.page_count(), 2);

        for page in &document.pages {
            assert_eq!(page.alignment_marks().count(), 4);
            assert!(page.page_matrix().is_some());
            assert!(page.polylines().count() > 0);
        }
        assert!(document.pages[0].has_scale_mark());
        assert!(!document.pages[1].has_scale_mark());
    }

    #[test]
    fn scale_mark_moves_past_blank_first_tile() {
        let config = SheetConfig::default();
        let w = 30.0 * MM_PER_INCH;
        let h = 18.0 * MM_PER_INCH;
        // An upside-down L hugging the top and right: the bottom-left tile is empty.
        let path = Path::open(vec![Point::new(0.0, h), Point::new(w, h), Point::new(w, 0.0)]).unwrap();
        let layout = plan_pages(&path, &config);
        assert_eq!((layout.columns, layout.rows), (2, 2));

        let document = assemble(&path, &config, 0.0, layout);
        assert_eq!(document.retained(), vec![false, true, true, true]);

        let indices: Vec<usize> = document.pages.iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![1, 2, 3]);
        assert!(document.pages[0].has_scale_mark());
        assert_eq!(document.pages.iter().filter(|p| p.has_scale_mark()).count(), 1);
        // Registration still reflects the full four-tile grid
        assert!(document.pages.iter().all(|p| p.alignment_marks().count() == 4));
    }

    #[test]
    fn sheet_coordinates_subtract_offset_and_margin() {
        let config = SheetConfig::default();
        let path = Path::open(vec![Point::new(100.0, 100.0), Point::new(110.0, 120.0)]).unwrap();
        let layout = PageLayout {
            columns: 1,
            rows: 1,
            offsets: vec![PageOffset::new(1.0, 2.0)],
        };
        let document = assemble(&path, &config, 0.0, layout);
        let (points, closed) = document.pages[0].polylines().next().unwrap();
        assert!(!closed);
        // p - (offset - margin) * 25.4
        assert_relative_eq!(points[0].x, 100.0 - 0.5 * MM_PER_INCH, epsilon = 1e-9);
        assert_relative_eq!(points[0].y, 100.0 - 1.5 * MM_PER_INCH, epsilon = 1e-9);
    }

    #[test]
    fn no_rotation_option_keeps_orientation() {
        let config = SheetConfig::default();
        let tall = rectangle_in(10.0, 20.0);

        let rotated = generate(&tall, &config).unwrap();
        assert_eq!(rotated.rotation_degrees, 90.0);
        assert_eq!(rotated.grid.page_count(), 2);

        let upright = generate_with(&tall, &config, GenerateOptions { optimize_rotation: false }).unwrap();
        assert_eq!(upright.rotation_degrees, 0.0);
        assert_eq!(upright.grid.page_count(), 3);
    }

    #[test]
    fn rotated_edge_reaches_page_boundary() {
        // 10x20in with the left side sampled every 50mm. After the 90° turn
        // that side lies along y = 0 up to rounding noise.
        let w = 10.0 * MM_PER_INCH;
        let h = 20.0 * MM_PER_INCH;
        let mut points = vec![Point::new(0.0, 0.0), Point::new(w, 0.0), Point::new(w, h), Point::new(0.0, h)];
        points.extend((1..=10).rev().map(|i| Point::new(0.0, i as f64 * 50.0)));
        let path = Path::closed(points).unwrap();

        let document = generate(&path, &SheetConfig::default()).unwrap();
        assert_eq!(document.rotation_degrees, 90.0);
        assert_eq!((document.grid.columns, document.grid.rows), (2, 1));

        let page = &document.pages[0];
        assert_eq!(page.column, 0);
        // The sampled side runs along the bottom margin up to the right edge
        let bottom = 0.5 * MM_PER_INCH;
        let rightmost = page
            .polylines()
            .flat_map(|(pts, _)| pts.iter())
            .filter(|p| (p.y - bottom).abs() < 1e-6)
            .map(|p| p.x)
            .fold(f64::NEG_INFINITY, f64::max);
        assert_relative_eq!(rightmost, 16.5 * MM_PER_INCH, epsilon = 1e-6);
    }

    #[test]
    fn invalid_sheet_is_rejected_before_layout() {
        let config = SheetConfig::new(0.5, 12.0, 17.0, 11.0);
        let result = generate(&rectangle_in(10.0, 10.0), &config);
        assert!(matches!(result, Err(TilerError::InvalidSheet(_))));
    }

    #[test]
    fn write_document_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("pattern.tex");
        write_document(&dest, "\\end{document}\n").unwrap();
        assert_eq!(fs::read_to_string(&dest).unwrap(), "\\end{document}\n");
        assert!(try_write_document(&dest, "again"));
    }

    #[test]
    fn unwritable_destination_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("missing").join("pattern.tex");
        assert!(matches!(write_document(&dest, "x"), Err(TilerError::Io { .. })));
        assert!(!try_write_document(&dest, "x"));
        assert!(!dest.exists());
    }
}
