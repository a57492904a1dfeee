//! Error type for pattern tiling.
//!
//! Geometric contract violations inside the engine are not represented here:
//! those are programming errors and are caught by debug assertions. This enum
//! covers what a caller can actually get wrong (bad sheet settings, unreadable
//! input, an unwritable destination).

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TilerError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON path data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid sheet configuration file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("SVG parse error: {0}")]
    SvgParse(String),

    #[error("no path found in input")]
    NoPath,

    #[error("path has no points")]
    EmptyPath,

    #[error("invalid point: {0}")]
    InvalidPoint(String),

    #[error("invalid sheet configuration: {0}")]
    InvalidSheet(String),
}

impl TilerError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        TilerError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TilerError>;
