//! Plan command implementation.

use serde::Serialize;

use pattern_tiler::SheetConfig;

use super::common::{build_document, parse_tile_args};

/// One planned tile in JSON output.
#[derive(Serialize)]
struct JsonTile {
    index: usize,
    column: usize,
    row: usize,
    /// Lower-left printable corner in pattern inches
    offset_x: f64,
    offset_y: f64,
    retained: bool,
}

/// JSON summary of a layout.
#[derive(Serialize)]
struct JsonPlan {
    sheet: SheetConfig,
    rotation_degrees: f64,
    columns: usize,
    rows: usize,
    tiles: usize,
    pages: usize,
    grid: Vec<JsonTile>,
}

/// Execute the plan command.
pub fn cmd_plan(args: &[String]) -> Result<(), String> {
    let args = parse_tile_args(args)?;
    let document = build_document(&args)?;

    let retained = document.retained();
    let grid = document
        .grid
        .offsets
        .iter()
        .enumerate()
        .map(|(index, offset)| {
            let (column, row) = document.grid.position(index);
            JsonTile {
                index,
                column,
                row,
                offset_x: offset.x,
                offset_y: offset.y,
                retained: retained[index],
            }
        })
        .collect();

    let plan = JsonPlan {
        sheet: document.config,
        rotation_degrees: document.rotation_degrees,
        columns: document.grid.columns,
        rows: document.grid.rows,
        tiles: document.grid.page_count(),
        pages: document.page_count(),
        grid,
    };

    let json = serde_json::to_string_pretty(&plan).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}
