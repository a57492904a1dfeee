//! SVG import and per-page SVG previews.
//!
//! Import uses usvg for complete SVG resolution (CSS, transforms, basic
//! shapes turned into paths), then takes the first path in document order as
//! the pattern outline.
//!
//! ## Curve Flattening
//!
//! SVG paths contain Bézier curves (cubic and quadratic). The tiler works on
//! polylines, so curves are flattened with lyon_geom at [`CURVE_TOLERANCE`].
//!
//! ## Rust Lesson #21: The ? Operator
//!
//! `expression?` is sugar for:
//! ```text
//! match expression {
//!     Ok(v) => v,
//!     Err(e) => return Err(e.into()),
//! }
//! ```
//! The `.into()` is why a `usvg::Error` can't bubble up directly: it has no
//! `From` conversion into [`TilerError`], so we `map_err` it first.

use std::fmt::Write;

use lyon_geom::{CubicBezierSegment, QuadraticBezierSegment, point};
use usvg::tiny_skia_path::{PathSegment, Transform};

use crate::config::{MM_PER_INCH, SheetConfig, Units};
use crate::document::{Page, Primitive};
use crate::error::{Result, TilerError};
use crate::geometry::{Path, Point};
use crate::registration::{AlignmentMark, PageMatrix};
use crate::tikz::format_number;

/// Tolerance for curve flattening, in SVG user units.
/// Lower = more points, smoother curves.
pub const CURVE_TOLERANCE: f32 = 0.1;

// ============================================================================
// IMPORT
// ============================================================================

/// Extract the pattern outline from SVG text.
///
/// Coordinates are scaled by `units` into millimeters and flipped so y
/// points up. A closing `Z` on the outline makes the path closed.
pub fn extract_path_from_svg(svg_content: &str, units: Units) -> Result<Path> {
    let options = usvg::Options::default();
    let tree = usvg::Tree::from_str(svg_content, &options)
        .map_err(|e| TilerError::SvgParse(e.to_string()))?;

    let (points, closed) = find_first_path(tree.root()).ok_or(TilerError::NoPath)?;
    let scale = units.to_mm();
    let points = points
        .into_iter()
        .map(|p| Point::new(p.x * scale, -p.y * scale))
        .collect();
    Path::new(points, closed)
}

/// Depth-first search for the first path with at least two points.
fn find_first_path(group: &usvg::Group) -> Option<(Vec<Point>, bool)> {
    group.children().iter().find_map(|node| match node {
        usvg::Node::Group(group) => find_first_path(group),
        usvg::Node::Path(path) => flatten_path(path),
        _ => None,
    })
}

#[inline]
fn apply(ts: &Transform, x: f32, y: f32) -> Point {
    Point::new(
        (ts.sx * x + ts.kx * y + ts.tx) as f64,
        (ts.ky * x + ts.sy * y + ts.ty) as f64,
    )
}

/// First subpath of a usvg path as a polyline in user units.
fn flatten_path(path: &usvg::Path) -> Option<(Vec<Point>, bool)> {
    let ts = path.abs_transform();
    let mut points = Vec::new();
    let mut closed = false;
    let mut last: Option<(f32, f32)> = None;

    for segment in path.data().segments() {
        match segment {
            PathSegment::MoveTo(p) => {
                // Only the first subpath is the outline
                if !points.is_empty() {
                    break;
                }
                points.push(apply(&ts, p.x, p.y));
                last = Some((p.x, p.y));
            }
            PathSegment::LineTo(p) => {
                points.push(apply(&ts, p.x, p.y));
                last = Some((p.x, p.y));
            }
            PathSegment::QuadTo(ctrl, p) => {
                if let Some((lx, ly)) = last {
                    let curve = QuadraticBezierSegment {
                        from: point(lx, ly),
                        ctrl: point(ctrl.x, ctrl.y),
                        to: point(p.x, p.y),
                    };
                    curve.for_each_flattened(CURVE_TOLERANCE, &mut |line| {
                        points.push(apply(&ts, line.to.x, line.to.y));
                    });
                } else {
                    points.push(apply(&ts, p.x, p.y));
                }
                last = Some((p.x, p.y));
            }
            PathSegment::CubicTo(ctrl1, ctrl2, p) => {
                if let Some((lx, ly)) = last {
                    let curve = CubicBezierSegment {
                        from: point(lx, ly),
                        ctrl1: point(ctrl1.x, ctrl1.y),
                        ctrl2: point(ctrl2.x, ctrl2.y),
                        to: point(p.x, p.y),
                    };
                    curve.for_each_flattened(CURVE_TOLERANCE, &mut |line| {
                        points.push(apply(&ts, line.to.x, line.to.y));
                    });
                } else {
                    points.push(apply(&ts, p.x, p.y));
                }
                last = Some((p.x, p.y));
            }
            PathSegment::Close => {
                closed = true;
                break;
            }
        }
    }

    // Flattening repeats endpoints; a closed outline may also repeat its start.
    points.dedup_by(|a, b| (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6);
    if closed && points.len() > 1 {
        if let (Some(first), Some(last)) = (points.first(), points.last()) {
            if first.distance(*last) < 1e-6 {
                points.pop();
            }
        }
    }

    if points.len() >= 2 { Some((points, closed)) } else { None }
}

// ============================================================================
// PREVIEW EXPORT
// ============================================================================

/// Render one page as a standalone SVG at physical size.
///
/// The viewBox is in millimeters with y flipped so sheet coordinates (y up)
/// can be written unchanged. The printable area is outlined in light grey.
pub fn page_to_svg(page: &Page, config: &SheetConfig) -> String {
    let width = config.page_width * MM_PER_INCH;
    let height = config.page_height * MM_PER_INCH;
    let margin = config.margin * MM_PER_INCH;

    let mut svg = format!(
        r##"<?xml version="1.0" encoding="UTF-8"?>
<svg xmlns="http://www.w3.org/2000/svg"
     width="{}in" height="{}in"
     viewBox="0 0 {} {}">
  <title>Tile {} (column {}, row {})</title>
  <rect width="100%" height="100%" fill="white"/>
  <g transform="translate(0,{}) scale(1,-1)" fill="none" stroke="black" stroke-width="0.2">
    <rect x="{}" y="{}" width="{}" height="{}" stroke="#cccccc" stroke-dasharray="2,2"/>
"##,
        format_number(config.page_width),
        format_number(config.page_height),
        format_number(width),
        format_number(height),
        page.index + 1,
        page.column + 1,
        page.row + 1,
        format_number(height),
        format_number(margin),
        format_number(margin),
        format_number(width - 2.0 * margin),
        format_number(height - 2.0 * margin),
    );

    for primitive in &page.primitives {
        match primitive {
            Primitive::Polyline { points, closed } => svg_polyline(&mut svg, points, *closed, "pattern"),
            Primitive::ScaleMark { points } => svg_polyline(&mut svg, points, false, "scale-mark"),
            Primitive::AlignmentMark(mark) => svg_alignment_mark(&mut svg, mark),
            Primitive::PageMatrix(matrix) => svg_page_matrix(&mut svg, matrix),
        }
    }

    svg.push_str("  </g>\n</svg>\n");
    svg
}

fn svg_points(points: &[Point]) -> String {
    points
        .iter()
        .map(|p| format!("{},{}", format_number(p.x), format_number(p.y)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn svg_polyline(svg: &mut String, points: &[Point], closed: bool, class: &str) {
    let element = if closed { "polygon" } else { "polyline" };
    let _ = writeln!(
        svg,
        r#"    <{} class="{}" points="{}"/>"#,
        element,
        class,
        svg_points(points)
    );
}

fn svg_alignment_mark(svg: &mut String, mark: &AlignmentMark) {
    let r = mark.half_size;
    let c = mark.center;
    for (start, end) in mark.orientation.filled_quadrants() {
        let (s_sin, s_cos) = start.to_radians().sin_cos();
        let (e_sin, e_cos) = end.to_radians().sin_cos();
        let _ = writeln!(
            svg,
            r#"    <path class="alignment-mark" d="M {} {} L {} {} A {} {} 0 0 1 {} {} Z" fill="black" stroke="none"/>"#,
            format_number(c.x),
            format_number(c.y),
            format_number(c.x + r * s_cos),
            format_number(c.y + r * s_sin),
            format_number(r),
            format_number(r),
            format_number(c.x + r * e_cos),
            format_number(c.y + r * e_sin),
        );
    }
    let _ = writeln!(
        svg,
        r#"    <circle class="alignment-mark" cx="{}" cy="{}" r="{}"/>"#,
        format_number(c.x),
        format_number(c.y),
        format_number(r)
    );
}

fn svg_page_matrix(svg: &mut String, matrix: &PageMatrix) {
    let _ = writeln!(
        svg,
        r#"    <g class="page-matrix" stroke-width="0.1" transform="translate({},{})">"#,
        format_number(matrix.origin.x),
        format_number(matrix.origin.y)
    );
    for column in 0..=matrix.columns() {
        let x = column as f64 * matrix.step_x;
        let _ = writeln!(
            svg,
            r#"      <line x1="{}" y1="0" x2="{}" y2="{}"/>"#,
            format_number(x),
            format_number(x),
            format_number(matrix.height)
        );
    }
    for row in 0..=matrix.rows() {
        let y = row as f64 * matrix.step_y;
        let _ = writeln!(
            svg,
            r#"      <line x1="0" y1="{}" x2="{}" y2="{}"/>"#,
            format_number(y),
            format_number(matrix.width),
            format_number(y)
        );
    }
    let cell = matrix.highlight.relative_to(matrix.origin);
    let _ = writeln!(
        svg,
        r#"      <rect x="{}" y="{}" width="{}" height="{}" fill="black"/>"#,
        format_number(cell.min.x),
        format_number(cell.min.y),
        format_number(cell.width()),
        format_number(cell.height())
    );
    svg.push_str("    </g>\n");
}

// ============================================================================
// TESTS
// ============================================================================
