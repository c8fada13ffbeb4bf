//! Raster-to-RGBA rendering with a fixed value range.

use crate::error::{RenderError, Result};
use crate::scheme::{evaluate, ColorScheme, Rgb};
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;
use std::path::Path;
use verdant_core::raster::{Raster, RasterElement};

/// Parameters for colormap rendering.
#[derive(Debug, Clone)]
pub struct ColormapParams {
    pub scheme: ColorScheme,
    /// Value mapped to the first color. Values below clamp.
    pub min: f64,
    /// Value mapped to the last color. Values above clamp.
    pub max: f64,
    /// Color for nodata and NaN pixels (RGBA). Default: fully transparent.
    pub nodata_color: [u8; 4],
}

impl ColormapParams {
    pub fn with_range(scheme: ColorScheme, min: f64, max: f64) -> Self {
        Self {
            scheme,
            min,
            max,
            nodata_color: [0, 0, 0, 0],
        }
    }

    /// Red-yellow-green over the full NDVI range [-1, 1]
    pub fn ndvi() -> Self {
        Self::with_range(ColorScheme::RdYlGn, -1.0, 1.0)
    }

    /// A 0/1 mask drawn with a sequential scheme over [0, 1]
    pub fn mask(scheme: ColorScheme) -> Self {
        Self::with_range(scheme, 0.0, 1.0)
    }

    /// Color of a value, `None` for NaN
    pub fn color_of(&self, value: f64) -> Option<Rgb> {
        if value.is_nan() {
            return None;
        }
        let range = self.max - self.min;
        let t = if range.abs() > f64::EPSILON {
            (value - self.min) / range
        } else {
            0.0
        };
        Some(evaluate(self.scheme, t))
    }
}

/// Convert a raster to an RGBA pixel buffer.
///
/// Returns a `Vec<u8>` of length `rows * cols * 4` in row-major order.
/// Nodata and NaN pixels are rendered with `params.nodata_color`.
pub fn raster_to_rgba<T: RasterElement>(raster: &Raster<T>, params: &ColormapParams) -> Vec<u8> {
    let nodata = raster.nodata();
    let mut rgba = Vec::with_capacity(raster.len() * 4);

    for val in raster.data().iter() {
        let color = if val.is_nodata(nodata) {
            None
        } else {
            val.to_f64().and_then(|v| params.color_of(v))
        };

        match color {
            Some(Rgb { r, g, b }) => rgba.extend_from_slice(&[r, g, b, 255]),
            None => rgba.extend_from_slice(&params.nodata_color),
        }
    }

    rgba
}

/// Vertical legend strip, `params.max` at the top row and `params.min`
/// at the bottom row.
pub fn colorbar_rgba(params: &ColormapParams, width: u32, height: u32) -> Vec<u8> {
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    let span = height.saturating_sub(1).max(1) as f64;
    for y in 0..height {
        let value = params.max - (params.max - params.min) * y as f64 / span;
        let Rgb { r, g, b } = params.color_of(value).unwrap_or(Rgb::new(0, 0, 0));
        for _ in 0..width {
            rgba.extend_from_slice(&[r, g, b, 255]);
        }
    }
    rgba
}

pub(crate) fn rgba_image(width: u32, height: u32, rgba: Vec<u8>) -> Result<RgbaImage> {
    RgbaImage::from_raw(width, height, rgba).ok_or(RenderError::EmptyRaster {
        rows: height as usize,
        cols: width as usize,
    })
}

fn raster_image<T: RasterElement>(raster: &Raster<T>, params: &ColormapParams) -> Result<RgbaImage> {
    if raster.is_empty() {
        return Err(RenderError::EmptyRaster {
            rows: raster.rows(),
            cols: raster.cols(),
        });
    }
    rgba_image(
        raster.cols() as u32,
        raster.rows() as u32,
        raster_to_rgba(raster, params),
    )
}

pub(crate) fn png_bytes(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    image.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

/// Color-map a raster and encode it as PNG bytes
pub fn encode_png<T: RasterElement>(raster: &Raster<T>, params: &ColormapParams) -> Result<Vec<u8>> {
    png_bytes(&raster_image(raster, params)?)
}

/// Color-map a raster and write it as a PNG file
pub fn write_png<T, P>(raster: &Raster<T>, params: &ColormapParams, path: P) -> Result<()>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    std::fs::write(path, encode_png(raster, params)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raster_to_rgba_basic() {
        let mut r = Raster::<f64>::new(2, 2);
        r.set(0, 0, 0.0).unwrap();
        r.set(0, 1, 0.5).unwrap();
        r.set(1, 0, 1.0).unwrap();
        r.set(1, 1, f64::NAN).unwrap();

        let params = ColormapParams::with_range(ColorScheme::Grayscale, 0.0, 1.0);
        let rgba = raster_to_rgba(&r, &params);

        assert_eq!(rgba.len(), 16);
        assert_eq!(&rgba[0..4], &[0, 0, 0, 255]);
        assert_eq!(&rgba[4..8], &[128, 128, 128, 255]);
        assert_eq!(&rgba[8..12], &[255, 255, 255, 255]);
        // NaN -> transparent
        assert_eq!(&rgba[12..16], &[0, 0, 0, 0]);
    }

    #[test]
    fn ndvi_range_is_fixed() {
        // 0.0 sits in the middle of [-1, 1] whatever the data range is
        let r = Raster::<f64>::filled(1, 1, 0.0);
        let rgba = raster_to_rgba(&r, &ColormapParams::ndvi());
        assert_eq!(&rgba[0..3], &[255, 255, 191]);
    }

    #[test]
    fn mask_values_hit_scheme_ends() {
        let mask = Raster::from_vec(vec![0u8, 1], 1, 2).unwrap();
        let rgba = raster_to_rgba(&mask, &ColormapParams::mask(ColorScheme::Blues));
        assert_eq!(&rgba[0..3], &[247, 251, 255]);
        assert_eq!(&rgba[4..7], &[8, 48, 107]);
    }

    #[test]
    fn colorbar_runs_top_down() {
        let params = ColormapParams::with_range(ColorScheme::Grayscale, 0.0, 1.0);
        let bar = colorbar_rgba(&params, 2, 3);
        assert_eq!(bar.len(), 2 * 3 * 4);
        assert_eq!(bar[0], 255);
        assert_eq!(bar[2 * 4 * 2], 0);
    }

    #[test]
    fn png_has_signature() {
        let r = Raster::<f64>::filled(3, 4, 0.25);
        let png = encode_png(&r, &ColormapParams::ndvi()).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn empty_raster_is_rejected() {
        let r = Raster::<f64>::new(0, 0);
        assert!(matches!(
            encode_png(&r, &ColormapParams::ndvi()),
            Err(RenderError::EmptyRaster { .. })
        ));
    }

    #[test]
    fn png_file_has_raster_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ndvi.png");
        let r = Raster::<f64>::filled(3, 5, -0.2);
        write_png(&r, &ColormapParams::ndvi(), &path).unwrap();
        assert_eq!(image::image_dimensions(&path).unwrap(), (5, 3));
    }
}
