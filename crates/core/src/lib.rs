//! # Verdant Core
//!
//! Core types and I/O shared by the verdant utilities.
//!
//! This crate provides:
//! - `Raster<T>`: generic single-band raster grid
//! - `GeoTransform`: affine transformation for georeferencing
//! - GeoTIFF reading/writing for band images
//! - CSV point tables and point features for the map viewer

pub mod error;
pub mod io;
pub mod raster;
pub mod vector;

pub use error::{Error, Result};
pub use raster::{GeoTransform, Raster, RasterElement, RasterStatistics};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GeoTransform, Raster, RasterElement, RasterStatistics};
    pub use crate::vector::{AttributeValue, Feature, FeatureCollection};
}
