//! CLI command implementations.
//!
//! - `tile` - Write the tiled LaTeX document (and optional SVG previews)
//! - `plan` - Print the tile plan as JSON
//! - `papers` - List paper size presets

pub mod common;
pub mod plan;
pub mod tile;

pub use plan::cmd_plan;
pub use tile::cmd_tile;

use pattern_tiler::PaperSize;

/// Execute the papers command.
pub fn cmd_papers() {
    println!("Available paper sizes (portrait, inches):");
    for paper in PaperSize::all() {
        let (width, height) = paper.dimensions(false);
        println!("  {:<8} {:>6.2} x {:.2}", paper.name(), width, height);
    }
}
