//! Threshold masks and land-cover segmentation of NDVI rasters.
//!
//! Masks are `Raster<u8>` holding 0 or 1. Comparisons are strict, so a
//! pixel sitting exactly on a threshold is never in the positive class of
//! that comparison. NaN pixels compare false and end up as 0 in every
//! mask.

use crate::maybe_rayon::*;
use tracing::debug;
use verdant_core::raster::Raster;
use verdant_core::{Error, Result};

/// Direction of a threshold comparison
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdOp {
    /// `value < threshold`
    Below,
    /// `value > threshold`
    Above,
}

impl ThresholdOp {
    fn test(self, value: f64, threshold: f64) -> bool {
        match self {
            ThresholdOp::Below => value < threshold,
            ThresholdOp::Above => value > threshold,
        }
    }
}

/// Build a 0/1 mask marking pixels on the `op` side of `threshold`.
pub fn threshold_mask(raster: &Raster<f64>, threshold: f64, op: ThresholdOp) -> Result<Raster<u8>> {
    classify(raster, |v| u8::from(op.test(v, threshold)))
}

/// Parameters for water detection
#[derive(Debug, Clone, Copy)]
pub struct WaterMaskParams {
    /// NDVI below this value is water. Default: 0.1
    pub threshold: f64,
}

impl Default for WaterMaskParams {
    fn default() -> Self {
        Self { threshold: 0.1 }
    }
}

/// Water body mask: 1 where `ndvi < threshold`.
pub fn water_mask(ndvi: &Raster<f64>, params: WaterMaskParams) -> Result<Raster<u8>> {
    check_finite("threshold", params.threshold)?;
    threshold_mask(ndvi, params.threshold, ThresholdOp::Below)
}

/// Parameters for land-cover segmentation
#[derive(Debug, Clone, Copy)]
pub struct LandCoverParams {
    /// NDVI above this value is vegetation. Default: 0.2
    pub vegetation_threshold: f64,
    /// NDVI below this value is water. Default: -0.1
    pub water_threshold: f64,
}

impl Default for LandCoverParams {
    fn default() -> Self {
        Self {
            vegetation_threshold: 0.2,
            water_threshold: -0.1,
        }
    }
}

/// Land-cover class codes used by [`LandCover::class_raster`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LandCoverClass {
    Undefined = 0,
    Water = 1,
    Soil = 2,
    Vegetation = 3,
}

impl LandCoverClass {
    pub fn name(self) -> &'static str {
        match self {
            LandCoverClass::Undefined => "undefined",
            LandCoverClass::Water => "water",
            LandCoverClass::Soil => "soil",
            LandCoverClass::Vegetation => "vegetation",
        }
    }
}

/// The three masks of a land-cover segmentation
#[derive(Debug, Clone)]
pub struct LandCover {
    /// `ndvi > vegetation_threshold`
    pub vegetation: Raster<u8>,
    /// `ndvi < water_threshold`
    pub water: Raster<u8>,
    /// `water_threshold <= ndvi <= vegetation_threshold`
    pub soil: Raster<u8>,
}

impl LandCover {
    /// Merge the masks into one raster of [`LandCoverClass`] codes.
    ///
    /// The masks are disjoint; a pixel in none of them (NaN NDVI) is
    /// `Undefined`.
    pub fn class_raster(&self) -> Result<Raster<u8>> {
        let data: Vec<u8> = self
            .vegetation
            .data()
            .iter()
            .zip(self.water.data().iter())
            .zip(self.soil.data().iter())
            .map(|((&veg, &water), &soil)| {
                let class = if veg == 1 {
                    LandCoverClass::Vegetation
                } else if water == 1 {
                    LandCoverClass::Water
                } else if soil == 1 {
                    LandCoverClass::Soil
                } else {
                    LandCoverClass::Undefined
                };
                class as u8
            })
            .collect();

        let mut classes = self.vegetation.derive(data)?;
        classes.set_nodata(Some(LandCoverClass::Undefined as u8));
        Ok(classes)
    }
}

/// Segment an NDVI raster into vegetation, water and soil masks.
///
/// # Errors
/// `InvalidParameter` when a threshold is not finite or the water
/// threshold lies above the vegetation threshold.
pub fn segment_landcover(ndvi: &Raster<f64>, params: LandCoverParams) -> Result<LandCover> {
    let LandCoverParams {
        vegetation_threshold: veg,
        water_threshold: water,
    } = params;
    check_finite("vegetation_threshold", veg)?;
    check_finite("water_threshold", water)?;
    if water > veg {
        return Err(Error::InvalidParameter {
            name: "water_threshold",
            value: water.to_string(),
            reason: format!("must not exceed vegetation_threshold ({})", veg),
        });
    }

    debug!("segmenting land cover: water < {} <= soil <= {} < vegetation", water, veg);
    Ok(LandCover {
        vegetation: threshold_mask(ndvi, veg, ThresholdOp::Above)?,
        water: threshold_mask(ndvi, water, ThresholdOp::Below)?,
        soil: classify(ndvi, |v| u8::from(v >= water && v <= veg))?,
    })
}

/// Share of mask pixels set to 1, in [0, 1]. Empty masks give 0.
pub fn mask_fraction(mask: &Raster<u8>) -> f64 {
    if mask.is_empty() {
        return 0.0;
    }
    let positive = mask.data().iter().filter(|&&v| v == 1).count();
    positive as f64 / mask.len() as f64
}

fn classify<F>(raster: &Raster<f64>, f: F) -> Result<Raster<u8>>
where
    F: Fn(f64) -> u8 + Sync + Send,
{
    let (rows, cols) = raster.shape();

    let data: Vec<u8> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![0u8; cols];
            for (col, cell) in row_data.iter_mut().enumerate() {
                // SAFETY: row < rows and col < cols
                *cell = f(unsafe { raster.get_unchecked(row, col) });
            }
            row_data
        })
        .collect();

    raster.derive(data)
}

fn check_finite(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: "must be a finite number".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ndvi_row(values: &[f64]) -> Raster<f64> {
        Raster::from_vec(values.to_vec(), 1, values.len()).unwrap()
    }

    fn cells(mask: &Raster<u8>) -> Vec<u8> {
        mask.data().iter().copied().collect()
    }

    #[test]
    fn water_mask_is_strict() {
        let ndvi = ndvi_row(&[-0.5, 0.0, 0.1, 0.1000001, 0.8]);
        let mask = water_mask(&ndvi, WaterMaskParams::default()).unwrap();
        assert_eq!(cells(&mask), [1, 1, 0, 0, 0]);
    }

    #[test]
    fn nan_is_never_positive() {
        let ndvi = ndvi_row(&[f64::NAN]);
        let water = water_mask(&ndvi, WaterMaskParams::default()).unwrap();
        assert_eq!(cells(&water), [0]);

        let cover = segment_landcover(&ndvi, LandCoverParams::default()).unwrap();
        assert_eq!(cells(&cover.vegetation), [0]);
        assert_eq!(cells(&cover.soil), [0]);
        assert_eq!(cells(&cover.class_raster().unwrap()), [0]);
    }

    #[test]
    fn landcover_boundaries() {
        let ndvi = ndvi_row(&[-0.5, -0.1, 0.0, 0.2, 0.6]);
        let cover = segment_landcover(&ndvi, LandCoverParams::default()).unwrap();

        assert_eq!(cells(&cover.water), [1, 0, 0, 0, 0]);
        assert_eq!(cells(&cover.soil), [0, 1, 1, 1, 0]);
        assert_eq!(cells(&cover.vegetation), [0, 0, 0, 0, 1]);
        assert_eq!(cells(&cover.class_raster().unwrap()), [1, 2, 2, 2, 3]);
    }

    #[test]
    fn masks_partition_defined_pixels() {
        let values: Vec<f64> = (0..41).map(|i| -1.0 + i as f64 * 0.05).collect();
        let ndvi = ndvi_row(&values);
        let cover = segment_landcover(&ndvi, LandCoverParams::default()).unwrap();

        for col in 0..values.len() {
            let total = cover.vegetation.get(0, col).unwrap()
                + cover.water.get(0, col).unwrap()
                + cover.soil.get(0, col).unwrap();
            assert_eq!(total, 1, "pixel {} = {}", col, values[col]);
        }
    }

    #[test]
    fn raising_vegetation_threshold_is_monotonic() {
        let values: Vec<f64> = (0..200).map(|i| ((i * 37) % 200) as f64 / 100.0 - 1.0).collect();
        let ndvi = ndvi_row(&values);

        let mut previous = usize::MAX;
        for step in 0..=20 {
            let threshold = -1.0 + step as f64 * 0.1;
            let mask = threshold_mask(&ndvi, threshold, ThresholdOp::Above).unwrap();
            let count = mask.data().iter().filter(|&&v| v == 1).count();
            assert!(count <= previous, "threshold {} grew the mask", threshold);
            previous = count;
        }
    }

    #[test]
    fn inverted_thresholds_are_rejected() {
        let ndvi = ndvi_row(&[0.0]);
        let params = LandCoverParams {
            vegetation_threshold: -0.2,
            water_threshold: 0.3,
        };
        assert!(matches!(
            segment_landcover(&ndvi, params),
            Err(Error::InvalidParameter { name: "water_threshold", .. })
        ));
        assert!(water_mask(&ndvi, WaterMaskParams { threshold: f64::NAN }).is_err());
    }

    #[test]
    fn fraction_of_positive_pixels() {
        let mask = Raster::from_vec(vec![1u8, 0, 0, 1], 2, 2).unwrap();
        assert_eq!(mask_fraction(&mask), 0.5);
        assert_eq!(mask_fraction(&Raster::<u8>::new(0, 0)), 0.0);
    }
}
