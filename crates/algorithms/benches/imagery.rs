//! Benchmarks for the NDVI and threshold kernels

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use verdant_algorithms::imagery::{ndvi, segment_landcover, LandCoverParams};
use verdant_core::{GeoTransform, Raster};

fn create_band(size: usize, base: f64) -> Raster<f64> {
    let mut r = Raster::new(size, size);
    r.set_transform(GeoTransform::new(0.0, size as f64, 1.0, -1.0));
    for row in 0..size {
        for col in 0..size {
            let v = base + ((row * 7 + col * 13) % 200) as f64;
            r.set(row, col, v).unwrap();
        }
    }
    r
}

fn bench_ndvi(c: &mut Criterion) {
    let mut group = c.benchmark_group("imagery/ndvi");
    for size in [256, 512, 1024, 2048] {
        let nir = create_band(size, 300.0);
        let red = create_band(size, 100.0);
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| ndvi(black_box(&nir), black_box(&red)).unwrap())
        });
    }
    group.finish();
}

fn bench_landcover(c: &mut Criterion) {
    let mut group = c.benchmark_group("imagery/landcover");
    for size in [256, 1024] {
        let index = ndvi(&create_band(size, 120.0), &create_band(size, 100.0)).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| segment_landcover(black_box(&index), LandCoverParams::default()).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_ndvi, bench_landcover);
criterion_main!(benches);
