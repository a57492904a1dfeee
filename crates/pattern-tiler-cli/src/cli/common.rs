//! Argument parsing shared by `tile` and `plan`.

use pattern_tiler::{
    Document, GenerateOptions, PaperSize, SheetConfig, Units, generate_with, load_path,
};

/// Parsed command line for a generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct TileArgs {
    pub input: String,
    pub output: Option<String>,
    pub svg_dir: Option<String>,
    pub units: Units,
    pub rotate: bool,
    pub sheet: SheetConfig,
}

/// Sheet settings given explicitly on the command line.
#[derive(Debug, Default)]
struct SheetOverrides {
    config_file: Option<String>,
    paper: Option<PaperSize>,
    landscape: bool,
    width: Option<f64>,
    height: Option<f64>,
    margin: Option<f64>,
    overlap: Option<f64>,
}

impl SheetOverrides {
    /// Defaults, then the config file, then the paper preset, then single values.
    fn resolve(&self) -> Result<SheetConfig, String> {
        let mut sheet = match &self.config_file {
            Some(path) => SheetConfig::load(path).map_err(|e| e.to_string())?,
            None => SheetConfig::default(),
        };

        if let Some(paper) = self.paper {
            let (width, height) = paper.dimensions(self.landscape);
            sheet.page_width = width;
            sheet.page_height = height;
        }
        if let Some(width) = self.width {
            sheet.page_width = width;
        }
        if let Some(height) = self.height {
            sheet.page_height = height;
        }
        if let Some(margin) = self.margin {
            sheet.margin = margin;
        }
        if let Some(overlap) = self.overlap {
            sheet.overlap = overlap;
        }

        sheet.validate().map_err(|e| e.to_string())?;
        Ok(sheet)
    }
}

fn value<'a>(args: &'a [String], i: usize, flag: &str) -> Result<&'a str, String> {
    args.get(i)
        .map(String::as_str)
        .ok_or_else(|| format!("{} needs a value", flag))
}

fn number(args: &[String], i: usize, flag: &str) -> Result<f64, String> {
    let text = value(args, i, flag)?;
    text.parse()
        .map_err(|_| format!("{} expects a number, got '{}'", flag, text))
}

/// Parse `<input> [options]`.
pub fn parse_tile_args(args: &[String]) -> Result<TileArgs, String> {
    let mut input: Option<String> = None;
    let mut output: Option<String> = None;
    let mut svg_dir: Option<String> = None;
    let mut units = Units::default();
    let mut rotate = true;
    let mut overrides = SheetOverrides::default();

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "-o" | "--output" => {
                i += 1;
                output = Some(value(args, i, flag)?.to_string());
            }
            "--svg-dir" => {
                i += 1;
                svg_dir = Some(value(args, i, flag)?.to_string());
            }
            "--units" => {
                i += 1;
                let name = value(args, i, flag)?;
                units = Units::from_name(name)
                    .ok_or_else(|| format!("unknown units: {}. Use 'mm', 'in' or 'px'.", name))?;
            }
            "--no-rotate" => {
                rotate = false;
            }
            "--config" => {
                i += 1;
                overrides.config_file = Some(value(args, i, flag)?.to_string());
            }
            "--paper" => {
                i += 1;
                let name = value(args, i, flag)?;
                overrides.paper = Some(
                    PaperSize::from_name(name)
                        .ok_or_else(|| format!("unknown paper size: {}. Run `papers` for the list.", name))?,
                );
            }
            "--landscape" => {
                overrides.landscape = true;
            }
            "--width" => {
                i += 1;
                overrides.width = Some(number(args, i, flag)?);
            }
            "--height" => {
                i += 1;
                overrides.height = Some(number(args, i, flag)?);
            }
            "--margin" => {
                i += 1;
                overrides.margin = Some(number(args, i, flag)?);
            }
            "--overlap" => {
                i += 1;
                overrides.overlap = Some(number(args, i, flag)?);
            }
            other if other.starts_with('-') => {
                return Err(format!("unknown option: {}", other));
            }
            other => {
                if input.is_some() {
                    return Err(format!("unexpected argument: {}", other));
                }
                input = Some(other.to_string());
            }
        }
        i += 1;
    }

    Ok(TileArgs {
        input: input.ok_or("missing input file")?,
        output,
        svg_dir,
        units,
        rotate,
        sheet: overrides.resolve()?,
    })
}

/// Load the input pattern and lay it out.
pub fn build_document(args: &TileArgs) -> Result<Document, String> {
    let path = load_path(&args.input, args.units).map_err(|e| e.to_string())?;
    let options = GenerateOptions {
        optimize_rotation: args.rotate,
    };
    generate_with(&path, &args.sheet, options).map_err(|e| e.to_string())
}
