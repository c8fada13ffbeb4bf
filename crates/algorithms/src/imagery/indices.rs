//! Normalized difference vegetation index
//!
//! Band images are read as `Raster<f64>` whatever their storage type, so
//! the arithmetic below always happens in floating point.

use crate::maybe_rayon::*;
use tracing::debug;
use verdant_core::raster::Raster;
use verdant_core::{Error, Result};

/// Compute the normalized difference between two bands:
///
/// `(band_a - band_b) / (band_a + band_b)`
///
/// Result is in the range [-1, 1] for non-negative inputs. Pixels where
/// the band sum is zero, or either band is nodata, are set to NaN; the
/// output raster declares NaN as its nodata value.
///
/// # Errors
/// `SizeMismatch` when the two bands do not have the same shape.
pub fn normalized_difference(band_a: &Raster<f64>, band_b: &Raster<f64>) -> Result<Raster<f64>> {
    check_dimensions(band_a, band_b)?;

    let (rows, cols) = band_a.shape();
    let nodata_a = band_a.nodata();
    let nodata_b = band_b.nodata();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for (col, cell) in row_data.iter_mut().enumerate() {
                // SAFETY: row < rows and col < cols, both bands share the shape
                let a = unsafe { band_a.get_unchecked(row, col) };
                let b = unsafe { band_b.get_unchecked(row, col) };

                if is_nodata_f64(a, nodata_a) || is_nodata_f64(b, nodata_b) {
                    continue;
                }

                let sum = a + b;
                if sum == 0.0 {
                    continue;
                }

                *cell = (a - b) / sum;
            }
            row_data
        })
        .collect();

    let mut output = band_a.derive(data)?;
    output.set_nodata(Some(f64::NAN));
    Ok(output)
}

/// Normalized Difference Vegetation Index
///
/// `NDVI = (NIR - Red) / (NIR + Red)`
///
/// Typical values:
/// - Dense vegetation: 0.6 to 0.9
/// - Sparse vegetation: 0.2 to 0.5
/// - Bare soil: 0.1 to 0.2
/// - Water/clouds: -1.0 to 0.0
///
/// # Arguments
/// * `nir` - Near-infrared band
/// * `red` - Red band
pub fn ndvi(nir: &Raster<f64>, red: &Raster<f64>) -> Result<Raster<f64>> {
    debug!("ndvi on {}x{}", nir.cols(), nir.rows());
    normalized_difference(nir, red)
}

/// Summary shown next to an NDVI image
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NdviStatistics {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub valid_count: usize,
    /// Undefined pixels (zero band sum or nodata input)
    pub nan_count: usize,
}

/// Min, max and mean over the defined NDVI pixels
pub fn ndvi_statistics(ndvi: &Raster<f64>) -> NdviStatistics {
    let stats = ndvi.statistics();
    NdviStatistics {
        min: stats.min,
        max: stats.max,
        mean: stats.mean,
        valid_count: stats.valid_count,
        nan_count: stats.nodata_count,
    }
}

fn is_nodata_f64(value: f64, nodata: Option<f64>) -> bool {
    value.is_nan() || nodata.map_or(false, |nd| (value - nd).abs() < f64::EPSILON)
}

fn check_dimensions(a: &Raster<f64>, b: &Raster<f64>) -> Result<()> {
    if a.shape() != b.shape() {
        return Err(Error::SizeMismatch {
            er: a.rows(),
            ec: a.cols(),
            ar: b.rows(),
            ac: b.cols(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use verdant_core::GeoTransform;

    fn make_band(rows: usize, cols: usize, value: f64) -> Raster<f64> {
        let mut r = Raster::filled(rows, cols, value);
        r.set_transform(GeoTransform::new(0.0, rows as f64, 1.0, -1.0));
        r
    }

    #[test]
    fn equal_bands_give_zero() {
        for value in [1.0, 100.0, 4095.0, 65535.0] {
            let band = make_band(3, 3, value);
            let result = ndvi(&band, &band).unwrap();
            assert_eq!(result.get(1, 1).unwrap(), 0.0);
        }
    }

    #[test]
    fn single_pixel_examples() {
        let red = make_band(1, 1, 100.0);
        let nir = make_band(1, 1, 100.0);
        assert_eq!(ndvi(&nir, &red).unwrap().get(0, 0).unwrap(), 0.0);

        let red = make_band(1, 1, 50.0);
        let nir = make_band(1, 1, 150.0);
        assert_relative_eq!(ndvi(&nir, &red).unwrap().get(0, 0).unwrap(), 0.5);
    }

    #[test]
    fn dominant_band_approaches_bounds() {
        let small = make_band(2, 2, 1.0);
        let large = make_band(2, 2, 1.0e6);

        let veg = ndvi(&large, &small).unwrap().get(0, 0).unwrap();
        let bare = ndvi(&small, &large).unwrap().get(0, 0).unwrap();

        assert!(veg > 0.999 && veg <= 1.0, "got {}", veg);
        assert!(bare < -0.999 && bare >= -1.0, "got {}", bare);
    }

    #[test]
    fn values_stay_in_range() {
        let mut nir = Raster::new(4, 4);
        let mut red = Raster::new(4, 4);
        for row in 0..4 {
            for col in 0..4 {
                nir.set(row, col, (row * 37 + col * 11) as f64).unwrap();
                red.set(row, col, (col * 53 + 1) as f64).unwrap();
            }
        }

        let result = ndvi(&nir, &red).unwrap();
        for &v in result.data().iter() {
            assert!((-1.0..=1.0).contains(&v), "out of range: {}", v);
        }
    }

    #[test]
    fn zero_sum_is_nan() {
        let zero = make_band(2, 2, 0.0);
        let result = ndvi(&zero, &zero).unwrap();
        assert!(result.get(0, 0).unwrap().is_nan());
        assert!(result.nodata().unwrap().is_nan());
    }

    #[test]
    fn nodata_input_is_nan() {
        let mut nir = make_band(5, 5, 0.5);
        nir.set_nodata(Some(-9999.0));
        nir.set(2, 2, -9999.0).unwrap();
        let red = make_band(5, 5, 0.1);

        let result = ndvi(&nir, &red).unwrap();
        assert!(result.get(2, 2).unwrap().is_nan());
        assert!(!result.get(2, 3).unwrap().is_nan());
    }

    #[test]
    fn shape_mismatch_is_an_error() {
        let a = make_band(5, 5, 1.0);
        let b = make_band(5, 10, 1.0);

        let result = normalized_difference(&a, &b);
        assert!(matches!(result, Err(Error::SizeMismatch { .. })));
    }

    #[test]
    fn output_keeps_placement_of_first_band() {
        let mut nir = make_band(2, 2, 3.0);
        nir.set_transform(GeoTransform::new(10.0, 20.0, 30.0, -30.0));
        let red = make_band(2, 2, 1.0);

        let result = ndvi(&nir, &red).unwrap();
        assert_eq!(result.transform(), nir.transform());
    }

    #[test]
    fn statistics_skip_undefined_pixels() {
        let nir = Raster::from_vec(vec![150.0, 100.0, 0.0, 300.0], 2, 2).unwrap();
        let red = Raster::from_vec(vec![50.0, 100.0, 0.0, 100.0], 2, 2).unwrap();

        let stats = ndvi_statistics(&ndvi(&nir, &red).unwrap());
        assert_eq!(stats.valid_count, 3);
        assert_eq!(stats.nan_count, 1);
        assert_relative_eq!(stats.min.unwrap(), 0.0);
        assert_relative_eq!(stats.max.unwrap(), 0.5);
        assert_relative_eq!(stats.mean.unwrap(), 1.0 / 3.0, epsilon = 1e-12);
    }
}
