//! Land-cover demo: synthetic red/NIR scene
//!
//! Generates a 200x200 scene with:
//! - Bare soil background (red 0.25, NIR 0.30)
//! - A lake in the middle (red 0.10, NIR 0.04)
//! - A vegetated band along the top (red 0.05, NIR 0.50)
//! - A strip of zero reflectance along the right edge (NDVI undefined)
//!
//! Then computes NDVI, the water mask and the land-cover split and writes
//! each result to TIFF:
//!   1. red.tif, nir.tif   the synthetic inputs
//!   2. ndvi.tif           NDVI in [-1, 1], NaN where undefined
//!   3. water.tif          NDVI < 0.1
//!   4. classes.tif        1 water, 2 soil, 3 vegetation
//!
//! Run:
//!   cargo run -p verdant-algorithms --example landcover_demo

use std::fs;
use std::path::Path;

use verdant_algorithms::imagery::{
    mask_fraction, ndvi, ndvi_statistics, segment_landcover, water_mask, LandCoverParams,
    WaterMaskParams,
};
use verdant_core::io::write_geotiff;
use verdant_core::{GeoTransform, Raster, RasterElement};

const ROWS: usize = 200;
const COLS: usize = 200;

fn main() {
    let out_dir = Path::new("output/landcover_demo");
    fs::create_dir_all(out_dir).expect("Cannot create output directory");

    let (red, nir) = build_scene();
    println!("Synthetic scene: {}x{}", COLS, ROWS);
    save(out_dir, "red.tif", &red);
    save(out_dir, "nir.tif", &nir);

    let result = ndvi(&nir, &red).expect("NDVI failed");
    let stats = ndvi_statistics(&result);
    println!(
        "NDVI: min={:.3} max={:.3} mean={:.3} undefined={}",
        stats.min.unwrap_or(f64::NAN),
        stats.max.unwrap_or(f64::NAN),
        stats.mean.unwrap_or(f64::NAN),
        stats.nan_count
    );
    save(out_dir, "ndvi.tif", &result);

    let water = water_mask(&result, WaterMaskParams::default()).expect("water mask failed");
    println!("Water (NDVI < 0.1): {:.1}%", 100.0 * mask_fraction(&water));
    save(out_dir, "water.tif", &water);

    let cover = segment_landcover(&result, LandCoverParams::default()).expect("segmentation failed");
    println!("Vegetation: {:.1}%", 100.0 * mask_fraction(&cover.vegetation));
    println!("Water:      {:.1}%", 100.0 * mask_fraction(&cover.water));
    println!("Soil:       {:.1}%", 100.0 * mask_fraction(&cover.soil));
    let classes = cover.class_raster().expect("class raster failed");
    save(out_dir, "classes.tif", &classes);

    println!("\nOutputs written to {}", out_dir.display());
}

fn build_scene() -> (Raster<f64>, Raster<f64>) {
    let mut red = Vec::with_capacity(ROWS * COLS);
    let mut nir = Vec::with_capacity(ROWS * COLS);
    let (cy, cx) = (ROWS as f64 / 2.0, COLS as f64 / 2.0);

    for row in 0..ROWS {
        for col in 0..COLS {
            let dy = (row as f64 - cy) / 40.0;
            let dx = (col as f64 - cx) / 60.0;
            let (r, n) = if col >= COLS - 10 {
                (0.0, 0.0)
            } else if row < 40 {
                (0.05, 0.50)
            } else if dx * dx + dy * dy <= 1.0 {
                (0.10, 0.04)
            } else {
                (0.25, 0.30)
            };
            red.push(r);
            nir.push(n);
        }
    }

    let transform = GeoTransform::new(-70.80, -33.30, 0.0001, -0.0001);
    let mut red = Raster::from_vec(red, ROWS, COLS).expect("red band");
    let mut nir = Raster::from_vec(nir, ROWS, COLS).expect("nir band");
    red.set_transform(transform);
    nir.set_transform(transform);
    (red, nir)
}

fn save<T: RasterElement>(dir: &Path, name: &str, raster: &Raster<T>) {
    let path = dir.join(name);
    write_geotiff(raster, &path).expect("write failed");
}
