//! # Verdant Webmap
//!
//! Point maps for tabular records: a Leaflet page over OpenStreetMap tiles
//! centered on the mean position of the points, with one marker per
//! record, plus a GeoJSON export of the same features.

mod error;
mod geojson;
mod map;

pub use error::{Result, WebMapError};
pub use geojson::{to_geojson, write_geojson};
pub use map::{MapParams, Marker, WebMap};
