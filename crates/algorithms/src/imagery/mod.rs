//! Imagery analysis algorithms
//!
//! - NDVI and the generic two-band normalized difference
//! - Threshold masks (water) and three-way land-cover segmentation

mod indices;
mod threshold;

pub use indices::{ndvi, ndvi_statistics, normalized_difference, NdviStatistics};
pub use threshold::{
    mask_fraction, segment_landcover, threshold_mask, water_mask, LandCover, LandCoverClass,
    LandCoverParams, ThresholdOp, WaterMaskParams,
};
