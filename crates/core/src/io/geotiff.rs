//! GeoTIFF band reading/writing on top of the `tiff` crate.
//!
//! Only the georeferencing needed to place derived products back on the
//! input grid is handled (ModelPixelScaleTag + ModelTiepointTag).

use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster, RasterElement};
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Seek, Write};
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;
use tracing::debug;

const MODEL_PIXEL_SCALE: u16 = 33550;
const MODEL_TIEPOINT: u16 = 33922;
const GEO_KEY_DIRECTORY: u16 = 34735;

/// Read one band of a GeoTIFF file into a Raster.
///
/// `band` selects a sample of a multi-sample (chunky) image, defaulting
/// to the first one.
pub fn read_geotiff<T, P>(path: P, band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    debug!("reading {}", path.display());
    let file = BufReader::new(File::open(path)?);
    decode_geotiff(file, band)
}

/// Read one band of an in-memory GeoTIFF into a Raster
pub fn read_geotiff_from_buffer<T>(data: &[u8], band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement,
{
    decode_geotiff(Cursor::new(data), band)
}

fn cast_all<S, T>(buf: Vec<S>) -> Vec<T>
where
    S: num_traits::NumCast + Copy,
    T: RasterElement,
{
    buf.into_iter()
        .map(|v| num_traits::cast(v).unwrap_or_else(T::default_nodata))
        .collect()
}

fn decode_geotiff<T, R>(reader: R, band: Option<usize>) -> Result<Raster<T>>
where
    T: RasterElement,
    R: Read + Seek,
{
    let mut decoder = Decoder::new(reader)?;
    let (width, height) = decoder.dimensions()?;
    let rows = height as usize;
    let cols = width as usize;

    let samples: Vec<T> = match decoder.read_image()? {
        DecodingResult::U8(buf) => cast_all(buf),
        DecodingResult::U16(buf) => cast_all(buf),
        DecodingResult::U32(buf) => cast_all(buf),
        DecodingResult::I8(buf) => cast_all(buf),
        DecodingResult::I16(buf) => cast_all(buf),
        DecodingResult::I32(buf) => cast_all(buf),
        DecodingResult::F32(buf) => cast_all(buf),
        DecodingResult::F64(buf) => cast_all(buf),
        _ => {
            return Err(Error::UnsupportedDataType(
                "Unsupported TIFF pixel format".to_string(),
            ))
        }
    };

    let cells = rows * cols;
    if cells == 0 || samples.len() % cells != 0 {
        return Err(Error::InvalidDimensions {
            width: cols,
            height: rows,
        });
    }

    let per_pixel = samples.len() / cells;
    let band = band.unwrap_or(0);
    if band >= per_pixel {
        return Err(Error::InvalidParameter {
            name: "band",
            value: band.to_string(),
            reason: format!("image has {} band(s)", per_pixel),
        });
    }

    let data = if per_pixel == 1 {
        samples
    } else {
        debug!("extracting band {} of {}", band, per_pixel);
        samples.into_iter().skip(band).step_by(per_pixel).collect()
    };

    let mut raster = Raster::from_vec(data, rows, cols)?;
    if let Some(transform) = read_geotransform(&mut decoder) {
        raster.set_transform(transform);
    }

    Ok(raster)
}

fn read_geotransform<R: Read + Seek>(decoder: &mut Decoder<R>) -> Option<GeoTransform> {
    let scale = decoder
        .get_tag_f64_vec(Tag::Unknown(MODEL_PIXEL_SCALE))
        .ok()?;
    let tiepoint = decoder.get_tag_f64_vec(Tag::Unknown(MODEL_TIEPOINT)).ok()?;

    if scale.len() < 2 || tiepoint.len() < 6 {
        return None;
    }

    // tiepoint: [I, J, K, X, Y, Z]
    let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
    let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
    Some(GeoTransform::new(origin_x, origin_y, scale[0], -scale[1]))
}

/// Write a Raster to a GeoTIFF file as 32-bit float
pub fn write_geotiff<T, P>(raster: &Raster<T>, path: P) -> Result<()>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    debug!("writing {}", path.display());
    let mut file = BufWriter::new(File::create(path)?);
    encode_geotiff(raster, &mut file)?;
    file.flush()?;
    Ok(())
}

/// Write a Raster to an in-memory GeoTIFF buffer
pub fn write_geotiff_to_buffer<T>(raster: &Raster<T>) -> Result<Vec<u8>>
where
    T: RasterElement,
{
    let mut buf = Vec::new();
    encode_geotiff(raster, Cursor::new(&mut buf))?;
    Ok(buf)
}

fn encode_geotiff<T, W>(raster: &Raster<T>, writer: W) -> Result<()>
where
    T: RasterElement,
    W: Write + Seek,
{
    let mut encoder = TiffEncoder::new(writer)?;
    let (rows, cols) = raster.shape();

    let data: Vec<f32> = raster
        .data()
        .iter()
        .map(|&v| num_traits::cast(v).unwrap_or(f32::NAN))
        .collect();

    let mut image = encoder.new_image::<Gray32Float>(cols as u32, rows as u32)?;

    let gt = raster.transform();
    let scale = [gt.pixel_width, gt.pixel_height.abs(), 0.0];
    image
        .encoder()
        .write_tag(Tag::Unknown(MODEL_PIXEL_SCALE), &scale[..])?;

    let tiepoint = [0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
    image
        .encoder()
        .write_tag(Tag::Unknown(MODEL_TIEPOINT), &tiepoint[..])?;

    // Version 1.1.0 with GTModelType = projected, GTRasterType = pixel-is-area
    let geokeys: [u16; 12] = [1, 1, 0, 2, 1024, 0, 1, 1, 1025, 0, 1, 1];
    image
        .encoder()
        .write_tag(Tag::Unknown(GEO_KEY_DIRECTORY), &geokeys[..])?;

    image.write_data(&data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_round_trip_keeps_values_and_placement() {
        let mut raster = Raster::from_vec(vec![0.0f64, 0.25, -0.5, 1.0], 2, 2).unwrap();
        raster.set_transform(GeoTransform::new(500_000.0, 4_200_000.0, 30.0, -30.0));

        let bytes = write_geotiff_to_buffer(&raster).unwrap();
        let back: Raster<f64> = read_geotiff_from_buffer(&bytes, None).unwrap();

        assert_eq!(back.shape(), (2, 2));
        assert_eq!(back.get(1, 0).unwrap(), -0.5);
        assert_eq!(back.transform(), raster.transform());
    }

    #[test]
    fn nan_cells_survive_as_nan() {
        let raster = Raster::from_vec(vec![f64::NAN, 0.5], 1, 2).unwrap();
        let bytes = write_geotiff_to_buffer(&raster).unwrap();
        let back: Raster<f64> = read_geotiff_from_buffer(&bytes, None).unwrap();
        assert!(back.get(0, 0).unwrap().is_nan());
    }

    #[test]
    fn garbage_is_an_error() {
        let result: Result<Raster<f64>> = read_geotiff_from_buffer(b"not a tiff", None);
        assert!(result.is_err());
    }

    #[test]
    fn file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("band.tif");
        let raster = Raster::from_vec(vec![10u16, 20, 30, 40, 50, 60], 2, 3).unwrap();
        write_geotiff(&raster, &path).unwrap();

        let back: Raster<f64> = read_geotiff(&path, None).unwrap();
        assert_eq!(back.shape(), (2, 3));
        assert_eq!(back.get(1, 2).unwrap(), 60.0);
    }

    #[test]
    fn band_of_chunky_image() {
        let mut buf = Vec::new();
        {
            let mut encoder = tiff::encoder::TiffEncoder::new(Cursor::new(&mut buf)).unwrap();
            // two pixels, RGB interleaved
            encoder
                .write_image::<tiff::encoder::colortype::RGB8>(2, 1, &[1, 2, 3, 4, 5, 6])
                .unwrap();
        }

        let green: Raster<u8> = read_geotiff_from_buffer(&buf, Some(1)).unwrap();
        assert_eq!(green.get(0, 0).unwrap(), 2);
        assert_eq!(green.get(0, 1).unwrap(), 5);

        let missing: Result<Raster<u8>> = read_geotiff_from_buffer(&buf, Some(3));
        assert!(matches!(missing, Err(Error::InvalidParameter { name: "band", .. })));
    }
}
