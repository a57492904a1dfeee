//! Tile command implementation.

use std::fs;
use std::path::Path;

use pattern_tiler::{page_to_svg, tikz, write_document};
use tracing::info;

use super::common::{build_document, parse_tile_args};

/// Execute the tile command.
pub fn cmd_tile(args: &[String]) -> Result<(), String> {
    let args = parse_tile_args(args)?;
    let document = build_document(&args)?;
    let text = tikz::render(&document);

    match &args.output {
        Some(output) => {
            write_document(output, &text).map_err(|e| e.to_string())?;
            info!(
                pages = document.page_count(),
                columns = document.grid.columns,
                rows = document.grid.rows,
                rotation = document.rotation_degrees,
                path = %output,
                "wrote tiled document"
            );
        }
        None => print!("{}", text),
    }

    if let Some(dir) = &args.svg_dir {
        let dir = Path::new(dir);
        fs::create_dir_all(dir).map_err(|e| format!("failed to create {}: {}", dir.display(), e))?;
        for page in &document.pages {
            let file = dir.join(format!("page-{:02}.svg", page.index + 1));
            write_document(&file, &page_to_svg(page, &document.config)).map_err(|e| e.to_string())?;
        }
        info!(pages = document.page_count(), dir = %dir.display(), "wrote SVG previews");
    }

    Ok(())
}
