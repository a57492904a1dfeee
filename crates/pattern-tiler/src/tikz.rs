//! TikZ/LaTeX output.
//!
//! Renders a [`Document`] as a standalone LaTeX file: one `\newpage` per
//! retained sheet, with every primitive drawn in an overlay picture anchored
//! at the sheet's lower-left corner. `x` and `y` units are set to 1mm, so
//! sheet coordinates are written as-is.

use std::fmt::Write;

use crate::config::SheetConfig;
use crate::document::{Document, Page, Primitive};
use crate::geometry::Point;
use crate::registration::{AlignmentMark, PageMatrix};

/// Closes the document.
pub const TRAILER: &str = "\\end{document}\n";

const BEGIN_OVERLAY: &str =
    "\\begin{tikzpicture}[remember picture, overlay, shift={(current page.south west)}]\n";
const END_OVERLAY: &str = "\\end{tikzpicture}\n\n";

/// Radius of the dot drawn for a run that is a single point [mm].
const DOT_RADIUS: f64 = 0.25;

/// Format a coordinate with at most four decimals and no trailing zeros.
pub fn format_number(value: f64) -> String {
    let text = format!("{:.4}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" || text.is_empty() {
        "0".to_string()
    } else {
        text.to_string()
    }
}

fn coord(p: Point) -> String {
    format!("({},{})", format_number(p.x), format_number(p.y))
}

/// Document preamble: paper size, margins and the 1mm unit.
pub fn header(config: &SheetConfig) -> String {
    format!(
        "\\documentclass{{article}}\n\n\
         \\usepackage{{tikz}}\n\
         \\usepackage[margin={}in,paperwidth={}in,paperheight={}in]{{geometry}}\n\n\
         \\begin{{document}}\n\n\
         \\tikzset\n{{\n  x=1mm,\n  y=1mm\n}}\n\n",
        format_number(config.margin),
        format_number(config.page_width),
        format_number(config.page_height),
    )
}

/// Render the whole document.
pub fn render(document: &Document) -> String {
    let mut out = header(&document.config);
    for page in &document.pages {
        render_page(&mut out, page);
    }
    out.push_str(TRAILER);
    out
}

fn render_page(out: &mut String, page: &Page) {
    let _ = writeln!(
        out,
        "% Tile {} (column {}, row {})",
        page.index + 1,
        page.column + 1,
        page.row + 1
    );
    out.push_str("\\newpage\n\\thispagestyle{empty}\n\n");

    let mut marks = Vec::new();
    let mut pattern = String::new();
    for primitive in &page.primitives {
        match primitive {
            Primitive::ScaleMark { points } => {
                out.push_str("% Scale mark\n");
                out.push_str(BEGIN_OVERLAY);
                draw_polyline(out, points, false);
                out.push_str(END_OVERLAY);
            }
            Primitive::Polyline { points, closed } => draw_polyline(&mut pattern, points, *closed),
            Primitive::AlignmentMark(mark) => marks.push(*mark),
            Primitive::PageMatrix(matrix) => {
                if !pattern.is_empty() {
                    flush_pattern(out, &mut pattern);
                }
                if !marks.is_empty() {
                    flush_marks(out, &mut marks);
                }
                out.push_str("% Page arrangement matrix\n");
                out.push_str(BEGIN_OVERLAY);
                draw_matrix(out, matrix);
                out.push_str(END_OVERLAY);
            }
        }
    }

    if !pattern.is_empty() {
        flush_pattern(out, &mut pattern);
    }
    if !marks.is_empty() {
        flush_marks(out, &mut marks);
    }
}

fn flush_pattern(out: &mut String, pattern: &mut String) {
    out.push_str("% Pattern\n");
    out.push_str(BEGIN_OVERLAY);
    out.push_str(pattern);
    out.push_str(END_OVERLAY);
    pattern.clear();
}

fn flush_marks(out: &mut String, marks: &mut Vec<AlignmentMark>) {
    out.push_str("% Alignment marks\n");
    out.push_str(BEGIN_OVERLAY);
    for mark in marks.drain(..) {
        draw_alignment_mark(out, &mark);
    }
    out.push_str(END_OVERLAY);
}

fn draw_polyline(out: &mut String, points: &[Point], closed: bool) {
    match points {
        [] => {}
        [only] => {
            let _ = writeln!(out, "  \\fill {} circle [radius={}];", coord(*only), format_number(DOT_RADIUS));
        }
        _ => {
            let path: Vec<String> = points.iter().map(|&p| coord(p)).collect();
            let cycle = if closed { " -- cycle" } else { "" };
            let _ = writeln!(out, "  \\draw {}{};", path.join(" -- "), cycle);
        }
    }
}

fn draw_alignment_mark(out: &mut String, mark: &AlignmentMark) {
    let radius = format_number(mark.half_size);
    for (start, end) in mark.orientation.filled_quadrants() {
        let (sin, cos) = start.to_radians().sin_cos();
        let rim = Point::new(cos * mark.half_size, sin * mark.half_size);
        let _ = writeln!(
            out,
            "  \\fill {} -- ++{} arc [start angle={}, end angle={}, radius={}] -- cycle;",
            coord(mark.center),
            coord(rim),
            format_number(start),
            format_number(end),
            radius
        );
    }
    let _ = writeln!(out, "  \\draw {} circle [radius={}];", coord(mark.center), radius);
}

fn draw_matrix(out: &mut String, matrix: &PageMatrix) {
    let highlight = matrix.highlight.relative_to(matrix.origin);
    let _ = writeln!(out, "  \\begin{{scope}}[shift={{{}}}]", coord(matrix.origin));
    let _ = writeln!(
        out,
        "    \\draw[xstep={},ystep={},very thin] (0,0) grid {};",
        format_number(matrix.step_x),
        format_number(matrix.step_y),
        coord(Point::new(matrix.width, matrix.height))
    );
    let _ = writeln!(
        out,
        "    \\fill {} rectangle {};",
        coord(highlight.min),
        coord(highlight.max)
    );
    out.push_str("  \\end{scope}\n");
}
