// src/raster.rs
use gdal::raster::GdalDataType;

use crate::utils::gdal_ext::TypedBuffer;

/// Georeferencing carried from an input band to the output raster
#[derive(Debug, Clone, PartialEq)]
pub struct GeoInfo {
    pub projection: String,
    /// GDAL order: origin x, pixel width, row rotation, origin y, column rotation, pixel height
    pub geo_transform: [f64; 6],
    pub width: usize,
    pub height: usize,
}

impl GeoInfo {
    pub fn pixel_size(&self) -> (f64, f64) {
        (self.geo_transform[1], self.geo_transform[5])
    }
}

/// A single band loaded into memory together with its georeferencing
#[derive(Debug, Clone)]
pub struct RasterBand {
    pub data: TypedBuffer,
    pub geo: GeoInfo,
}

impl RasterBand {
    pub fn new(data: TypedBuffer, geo: GeoInfo) -> Self {
        Self { data, geo }
    }

    /// Grid dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        let (width, height) = self.data.shape();
        (height, width)
    }

    pub fn dtype(&self) -> GdalDataType {
        self.data.data_type()
    }
}
