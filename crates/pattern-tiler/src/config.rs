//! Sheet configuration: paper size, margin and overlap.
//!
//! All sheet settings are in inches. Pattern geometry is in millimeters;
//! [`MM_PER_INCH`] is applied wherever the two meet.
//!
//! Settings can come from a YAML file, where every field is optional:
//!
//! ```yaml
//! margin: 0.25
//! overlap: 0.75
//! page_width: 11
//! page_height: 8.5
//! ```

use std::fs;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TilerError};

/// Millimeters per inch.
pub const MM_PER_INCH: f64 = 25.4;

/// Paper, margin and overlap for one generation request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SheetConfig {
    /// Unprintable border on every side [in]
    #[serde(default = "default_margin")]
    pub margin: f64,
    /// Strip shared by neighbouring tiles [in]
    #[serde(default = "default_overlap")]
    pub overlap: f64,
    /// Physical sheet width [in]
    #[serde(default = "default_page_width")]
    pub page_width: f64,
    /// Physical sheet height [in]
    #[serde(default = "default_page_height")]
    pub page_height: f64,
}

fn default_margin() -> f64 {
    0.5
}

fn default_overlap() -> f64 {
    0.75
}

fn default_page_width() -> f64 {
    17.0
}

fn default_page_height() -> f64 {
    11.0
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            margin: default_margin(),
            overlap: default_overlap(),
            page_width: default_page_width(),
            page_height: default_page_height(),
        }
    }
}

impl SheetConfig {
    pub fn new(margin: f64, overlap: f64, page_width: f64, page_height: f64) -> Self {
        Self {
            margin,
            overlap,
            page_width,
            page_height,
        }
    }

    /// Default margin and overlap on the given paper.
    pub fn for_paper(paper: PaperSize, landscape: bool) -> Self {
        let (page_width, page_height) = paper.dimensions(landscape);
        Self {
            page_width,
            page_height,
            ..Self::default()
        }
    }

    /// Printable width inside the margins [in].
    #[inline]
    pub fn available_width(&self) -> f64 {
        self.page_width - 2.0 * self.margin
    }

    /// Printable height inside the margins [in].
    #[inline]
    pub fn available_height(&self) -> f64 {
        self.page_height - 2.0 * self.margin
    }

    /// Check that the sheet leaves a printable area and a positive tile step.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("margin", self.margin),
            ("overlap", self.overlap),
            ("page width", self.page_width),
            ("page height", self.page_height),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(TilerError::InvalidSheet(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }

        if self.available_width() <= 0.0 || self.available_height() <= 0.0 {
            return Err(TilerError::InvalidSheet(format!(
                "margin {}in leaves no printable area on a {}x{}in sheet",
                self.margin, self.page_width, self.page_height
            )));
        }

        let narrowest = self.available_width().min(self.available_height());
        if self.overlap >= narrowest {
            return Err(TilerError::InvalidSheet(format!(
                "overlap {}in must be smaller than the printable area ({}in)",
                self.overlap, narrowest
            )));
        }

        Ok(())
    }

    /// Parse a (possibly partial) YAML sheet description.
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: SheetConfig = serde_yaml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a YAML sheet description from disk.
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| TilerError::io(path, e))?;
        Self::from_yaml_str(&text)
    }
}

/// Common paper sizes, portrait dimensions in inches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaperSize {
    Letter,
    Legal,
    Tabloid,
    A4,
    A3,
}

impl PaperSize {
    /// Preset name as accepted on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            PaperSize::Letter => "letter",
            PaperSize::Legal => "legal",
            PaperSize::Tabloid => "tabloid",
            PaperSize::A4 => "a4",
            PaperSize::A3 => "a3",
        }
    }

    /// Parse a preset from its name.
    pub fn from_name(name: &str) -> Option<PaperSize> {
        match name.to_lowercase().as_str() {
            "letter" | "us-letter" => Some(PaperSize::Letter),
            "legal" => Some(PaperSize::Legal),
            "tabloid" | "ledger" | "11x17" => Some(PaperSize::Tabloid),
            "a4" => Some(PaperSize::A4),
            "a3" => Some(PaperSize::A3),
            _ => None,
        }
    }

    /// All presets.
    pub fn all() -> &'static [PaperSize] {
        &[
            PaperSize::Letter,
            PaperSize::Legal,
            PaperSize::Tabloid,
            PaperSize::A4,
            PaperSize::A3,
        ]
    }

    /// (width, height) in inches.
    pub fn dimensions(&self, landscape: bool) -> (f64, f64) {
        let (w, h) = match self {
            PaperSize::Letter => (8.5, 11.0),
            PaperSize::Legal => (8.5, 14.0),
            PaperSize::Tabloid => (11.0, 17.0),
            PaperSize::A4 => (210.0 / MM_PER_INCH, 297.0 / MM_PER_INCH),
            PaperSize::A3 => (297.0 / MM_PER_INCH, 420.0 / MM_PER_INCH),
        };
        if landscape { (h, w) } else { (w, h) }
    }
}

/// Length unit of imported pattern coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Units {
    #[default]
    Millimeters,
    Inches,
    /// CSS pixels, 96 per inch
    Pixels,
}

impl Units {
    pub fn from_name(name: &str) -> Option<Units> {
        match name.to_lowercase().as_str() {
            "mm" | "millimeters" => Some(Units::Millimeters),
            "in" | "inch" | "inches" => Some(Units::Inches),
            "px" | "pixels" => Some(Units::Pixels),
            _ => None,
        }
    }

    /// Scale factor that converts one unit into millimeters.
    pub fn to_mm(&self) -> f64 {
        match self {
            Units::Millimeters => 1.0,
            Units::Inches => MM_PER_INCH,
            Units::Pixels => MM_PER_INCH / 96.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_landscape_tabloid() {
        let config = SheetConfig::default();
        assert_eq!(config, SheetConfig::new(0.5, 0.75, 17.0, 11.0));
        assert_eq!(config.available_width(), 16.0);
        assert_eq!(config.available_height(), 10.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn margin_consuming_sheet_is_rejected() {
        let config = SheetConfig::new(6.0, 0.75, 17.0, 11.0);
        assert!(matches!(config.validate(), Err(TilerError::InvalidSheet(_))));
    }

    #[test]
    fn overlap_wider_than_printable_area_is_rejected() {
        let config = SheetConfig::new(0.5, 10.0, 17.0, 11.0);
        assert!(matches!(config.validate(), Err(TilerError::InvalidSheet(_))));
    }

    #[test]
    fn non_finite_values_are_rejected() {
        let config = SheetConfig::new(f64::NAN, 0.75, 17.0, 11.0);
        assert!(config.validate().is_err());
        let config = SheetConfig::new(0.5, -1.0, 17.0, 11.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_yaml_uses_defaults() {
        let config = SheetConfig::from_yaml_str("margin: 0.25\npage_width: 11\npage_height: 8.5\n").unwrap();
        assert_eq!(config.margin, 0.25);
        assert_eq!(config.overlap, 0.75);
        assert_eq!(config.page_width, 11.0);
        assert_eq!(config.page_height, 8.5);
    }

    #[test]
    fn invalid_yaml_sheet_is_rejected() {
        assert!(matches!(
            SheetConfig::from_yaml_str("margin: [1, 2]"),
            Err(TilerError::Yaml(_))
        ));
        assert!(matches!(
            SheetConfig::from_yaml_str("margin: 5\npage_height: 8"),
            Err(TilerError::InvalidSheet(_))
        ));
    }

    #[test]
    fn paper_parsing() {
        assert_eq!(PaperSize::from_name("Letter"), Some(PaperSize::Letter));
        assert_eq!(PaperSize::from_name("11x17"), Some(PaperSize::Tabloid));
        assert_eq!(PaperSize::from_name("b5"), None);
        assert_eq!(PaperSize::Tabloid.dimensions(true), (17.0, 11.0));

        let config = SheetConfig::for_paper(PaperSize::Letter, false);
        assert_eq!((config.page_width, config.page_height), (8.5, 11.0));
        assert_eq!(config.margin, 0.5);
    }

    #[test]
    fn unit_scales() {
        assert_eq!(Units::from_name("in").map(|u| u.to_mm()), Some(25.4));
        assert_eq!(Units::from_name("mm").map(|u| u.to_mm()), Some(1.0));
        assert!((Units::Pixels.to_mm() - 0.264_583_333).abs() < 1e-6);
        assert_eq!(Units::from_name("furlong"), None);
    }
}
