//! Error types for verdant

use thiserror::Error;

/// Main error type for verdant raster and table operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid raster dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },

    #[error("Index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Raster size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("Unsupported data type: {0}")]
    UnsupportedDataType(String),

    #[error("TIFF error: {0}")]
    Tiff(#[from] tiff::TiffError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Malformed row {row}: {fields} fields, expected {expected}")]
    MalformedRow {
        row: usize,
        fields: usize,
        expected: usize,
    },

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether the error is a missing-column condition, which callers
    /// report as a warning rather than a failure.
    pub fn is_missing_column(&self) -> bool {
        matches!(self, Error::MissingColumn(_))
    }
}

/// Result type alias for verdant core operations
pub type Result<T> = std::result::Result<T, Error>;
