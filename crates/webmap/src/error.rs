//! Error types for map output

use thiserror::Error;

#[derive(Error, Debug)]
pub enum WebMapError {
    #[error("no points with coordinates to map")]
    NoPoints,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for map operations.
pub type Result<T> = std::result::Result<T, WebMapError>;
