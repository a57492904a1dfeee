//! pattern-tiler - print flat patterns across several sheets
//!
//! Usage:
//!   pattern-tiler tile <input> [-o out.tex]   Write the tiled LaTeX document
//!   pattern-tiler plan <input>                Print the tile plan as JSON
//!   pattern-tiler papers                      List paper size presets

use std::env;

use tracing_subscriber::EnvFilter;

mod cli;

use cli::{cmd_papers, cmd_plan, cmd_tile};

/// Log to stderr so stdout stays free for the document.
///
/// Default: WARN for everything, INFO for the library and this binary.
/// Override with RUST_LOG (e.g. RUST_LOG=pattern_tiler=debug).
fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,pattern_tiler=info,pattern_tiler_cli=info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_usage(program: &str) {
    eprintln!("pattern-tiler - split a flat pattern across printable sheets");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  {} tile <input> [options]    Write the tiled LaTeX document", program);
    eprintln!("  {} plan <input> [options]    Print the tile plan as JSON", program);
    eprintln!("  {} papers                    List paper size presets", program);
    eprintln!();
    eprintln!("Input is an SVG file (first path is the outline) or a JSON point list");
    eprintln!("in millimeters: [[x, y], ...] or {{\"closed\": true, \"points\": [...]}}");
    eprintln!();
    eprintln!("Sheet options (inches):");
    eprintln!("  --config <file.yaml>   Sheet settings file");
    eprintln!("  --paper <name>         Paper preset (see `papers`)");
    eprintln!("  --landscape            Use the preset sideways");
    eprintln!("  --width <in>           Sheet width (default 17)");
    eprintln!("  --height <in>          Sheet height (default 11)");
    eprintln!("  --margin <in>          Unprintable border (default 0.5)");
    eprintln!("  --overlap <in>         Shared strip between tiles (default 0.75)");
    eprintln!();
    eprintln!("Tile options:");
    eprintln!("  -o, --output <file>    Write the document here instead of stdout");
    eprintln!("  --svg-dir <dir>        Also write one SVG preview per page");
    eprintln!("  --units <mm|in|px>     Units of the input coordinates (default mm)");
    eprintln!("  --no-rotate            Keep the pattern's orientation");
    eprintln!();
    eprintln!("Logging goes to stderr; set RUST_LOG=pattern_tiler=debug for detail.");
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("pattern-tiler");

    init_logging();

    let result = match args.get(1).map(String::as_str) {
        Some("tile") => cmd_tile(&args[2..]),
        Some("plan") => cmd_plan(&args[2..]),
        Some("papers") => {
            cmd_papers();
            Ok(())
        }
        Some("help" | "--help" | "-h") => {
            print_usage(program);
            Ok(())
        }
        Some(other) => Err(format!("unknown command: {}", other)),
        None => {
            print_usage(program);
            std::process::exit(2);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
