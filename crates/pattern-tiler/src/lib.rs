//! # pattern-tiler
//!
//! Split a flat pattern outline (the unrolled 2D shape of a 3D part) across
//! as many printer sheets as it needs, with registration marks for taping
//! the printout back together at 1:1 scale.
//!
//! The pipeline, one module per stage:
//!
//! 1. [`rotation`] picks the whole-degree rotation that needs the fewest sheets
//! 2. [`layout`] plans the overlapping tile grid
//! 3. [`clip`] cuts the outline to each tile, using [`boundary`] for the crossings
//! 4. [`registration`] adds the scale mark, alignment marks and page matrix
//! 5. [`document`] collects it all; [`tikz`] and [`svg`] serialize it
//!
//! ## Rust Lesson #7: Modules
//!
//! Rust modules are like ES6 modules but more explicit:
//! - `mod foo;` = load from `foo.rs` or `foo/mod.rs`
//! - `pub mod foo;` = also export it publicly
//! - `pub use foo::Bar;` = re-export Bar at this level
//!
//! Unlike Node.js, you must explicitly declare every module.

pub mod boundary;
pub mod clip;
pub mod config;
pub mod document;
pub mod error;
pub mod geometry;
pub mod input;
pub mod layout;
pub mod registration;
pub mod rotation;
pub mod svg;
pub mod tikz;

// Re-export common types at crate root for convenience.
pub use clip::{ClippedPath, ClippedRun, clip_path};
pub use config::{MM_PER_INCH, PaperSize, SheetConfig, Units};
pub use document::{
    Document, GenerateOptions, Page, Primitive, generate, generate_with, try_write_document, write_document,
};
pub use error::{Result, TilerError};
pub use geometry::{Path, Point, Rect};
pub use input::{load_path, path_from_json};
pub use layout::{PageLayout, PageOffset, plan_pages};
pub use rotation::{RotationCandidate, optimize_rotation};
pub use svg::{extract_path_from_svg, page_to_svg};
