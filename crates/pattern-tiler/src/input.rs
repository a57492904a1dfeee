//! Pattern input files.
//!
//! A pattern is either an SVG drawing (see [`crate::svg`]) or a JSON point
//! list in millimeters, in one of two shapes:
//!
//! ```json
//! {"closed": false, "points": [[0, 0], [120.5, 0], [60, 80]]}
//! ```
//!
//! ```json
//! [[0, 0], [120.5, 0], [60, 80]]
//! ```
//!
//! The bare array is a closed outline.

use std::fs;

use serde::Deserialize;

use crate::config::Units;
use crate::error::{Result, TilerError};
use crate::geometry::{Path, Point};
use crate::svg::extract_path_from_svg;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PathFile {
    Object {
        #[serde(default = "default_closed")]
        closed: bool,
        points: Vec<[f64; 2]>,
    },
    Bare(Vec<[f64; 2]>),
}

fn default_closed() -> bool {
    true
}

/// Parse a JSON point list, scaling coordinates by `units`.
pub fn path_from_json(text: &str, units: Units) -> Result<Path> {
    let (closed, points) = match serde_json::from_str(text)? {
        PathFile::Object { closed, points } => (closed, points),
        PathFile::Bare(points) => (true, points),
    };
    let scale = units.to_mm();
    let points = points.into_iter().map(|[x, y]| Point::new(x, y) * scale).collect();
    Path::new(points, closed)
}

/// Load a pattern from disk; `.svg` files go through the SVG importer.
pub fn load_path(file: impl AsRef<std::path::Path>, units: Units) -> Result<Path> {
    let file = file.as_ref();
    let text = fs::read_to_string(file).map_err(|e| TilerError::io(file, e))?;

    let is_svg = file
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));

    if is_svg {
        extract_path_from_svg(&text, units)
    } else {
        path_from_json(&text, units)
    }
}
