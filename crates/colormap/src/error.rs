//! Error types for rendering

use thiserror::Error;

/// Errors produced while encoding or writing rendered output
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("cannot render an empty {rows}x{cols} raster")]
    EmptyRaster { rows: usize, cols: usize },

    #[error("figure has no panels")]
    EmptyFigure,
}

/// Result alias for rendering operations.
pub type Result<T> = std::result::Result<T, RenderError>;
