// src/io/reader.rs
use gdal::Dataset;
use log::debug;
use std::path::Path;

use crate::error::{NbrError, Result};
use crate::raster::{GeoInfo, RasterBand};
use crate::utils::gdal_ext::TypedBuffer;

/// Read the georeferencing of an open dataset
pub fn geo_info(dataset: &Dataset) -> Result<GeoInfo> {
    let (width, height) = dataset.raster_size();
    Ok(GeoInfo {
        projection: dataset.projection(),
        geo_transform: dataset.geo_transform()?,
        width,
        height,
    })
}

/// Load band 1 of the raster at `path` fully into memory
pub fn open_raster(path: &Path) -> Result<RasterBand> {
    if !path.exists() {
        return Err(NbrError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("raster not found: {}", path.display()),
        )));
    }

    let dataset = Dataset::open(path)?;
    let geo = geo_info(&dataset)?;
    let band = dataset.rasterband(1)?;
    let data = TypedBuffer::read_band(&band)?;

    debug!(
        "Read {} ({}x{}, {:?}, pixel size {:?})",
        path.display(),
        geo.width,
        geo.height,
        data.data_type(),
        geo.pixel_size()
    );

    Ok(RasterBand::new(data, geo))
}
