use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PlotError>;

/// Everything that can go wrong between opening the metrics file and drawing it.
#[derive(Debug, Error)]
pub enum PlotError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("missing column '{column}' in {}", .path.display())]
    MissingColumn { column: String, path: PathBuf },

    /// A value that could not be converted to the column's numeric type.
    #[error("line {line}: cannot parse {column} value '{value}'")]
    Parse {
        line: u64,
        column: String,
        value: String,
    },

    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("no data rows in {}", .0.display())]
    EmptySeries(PathBuf),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid configuration file: {0}")]
    ConfigFile(#[from] serde_json::Error),

    #[error("render failed: {0}")]
    Render(String),
}

impl PlotError {
    pub(crate) fn render<E: std::fmt::Display>(err: E) -> Self {
        PlotError::Render(err.to_string())
    }
}
