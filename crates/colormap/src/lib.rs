//! # Verdant Colormap
//!
//! Color mapping and figure output for verdant rasters.
//!
//! Provides the diverging NDVI scheme and the sequential mask schemes,
//! a multi-stop interpolation engine, raster-to-RGBA conversion with a
//! fixed value range, PNG export and side-by-side figures with colorbars.
//!
//! ## Usage
//!
//! ```ignore
//! use verdant_colormap::{ColormapParams, Figure, Panel};
//!
//! let mut figure = Figure::new();
//! figure.push(Panel::new("NDVI Image", &ndvi, ColormapParams::ndvi(), "NDVI Value")?);
//! figure.write_svg("ndvi.svg")?;
//! ```

mod error;
mod figure;
mod render;
mod scheme;

pub use error::{RenderError, Result};
pub use figure::{Figure, Panel};
pub use render::{colorbar_rgba, encode_png, raster_to_rgba, write_png, ColormapParams};
pub use scheme::{evaluate, ColorScheme, ColorStop, Rgb};
