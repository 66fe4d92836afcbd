// tests/common/mod.rs
#![allow(dead_code)]

pub mod http;

use gdal::raster::{Buffer, GdalType};
use gdal::spatial_ref::SpatialRef;
use gdal::{Dataset, DriverManager};
use std::path::Path;

pub const ORIGIN: (f64, f64) = (399960.0, 4500000.0);

pub fn utm_wkt() -> String {
    SpatialRef::from_epsg(32630).unwrap().to_wkt().unwrap()
}

/// Write a single-band GeoTIFF with `pixel_size` metre pixels at `ORIGIN`
pub fn write_band<T: GdalType + Copy>(
    path: &Path,
    width: usize,
    height: usize,
    pixel_size: f64,
    data: Vec<T>,
) {
    write_band_at(path, width, height, pixel_size, ORIGIN, data);
}

pub fn write_band_at<T: GdalType + Copy>(
    path: &Path,
    width: usize,
    height: usize,
    pixel_size: f64,
    origin: (f64, f64),
    data: Vec<T>,
) {
    let driver = DriverManager::get_driver_by_name("GTiff").unwrap();
    let mut ds = driver
        .create_with_band_type::<T, _>(path, width, height, 1)
        .unwrap();
    ds.set_geo_transform(&[origin.0, pixel_size, 0.0, origin.1, 0.0, -pixel_size])
        .unwrap();
    ds.set_projection(&utm_wkt()).unwrap();

    let mut band = ds.rasterband(1).unwrap();
    let mut buffer = Buffer::new((width, height), data);
    band.write((0, 0), (width, height), &mut buffer).unwrap();
}

pub fn read_f32(path: &Path) -> Vec<f32> {
    let ds = Dataset::open(path).unwrap();
    let band = ds.rasterband(1).unwrap();
    let size = band.size();
    band.read_as::<f32>((0, 0), size, size, None)
        .unwrap()
        .data()
        .to_vec()
}
