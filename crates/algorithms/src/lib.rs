//! # Verdant Algorithms
//!
//! Numeric core of the verdant utilities.
//!
//! - **imagery**: NDVI / normalized difference, threshold masks and
//!   land-cover segmentation
//! - **vector**: centroid and extent of point features

mod maybe_rayon;

pub mod imagery;
pub mod vector;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::imagery::{
        mask_fraction, ndvi, ndvi_statistics, normalized_difference, segment_landcover,
        threshold_mask, water_mask, LandCover, LandCoverClass, LandCoverParams, NdviStatistics,
        ThresholdOp, WaterMaskParams,
    };
    pub use crate::vector::{bounding_box, centroid, BoundingBox};
    pub use verdant_core::prelude::*;
}
