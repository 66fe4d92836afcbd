// src/io/writer.rs
use gdal::raster::{Buffer, RasterCreationOptions};
use gdal::{DriverManager, Metadata};
use log::{debug, info};
use std::path::Path;

use crate::error::{NbrError, Result};
use crate::raster::GeoInfo;

/// GeoTIFF creation settings
#[derive(Debug, Clone, PartialEq)]
pub struct WriteOptions {
    pub compress: String,
    pub compress_level: u8,
    pub tiled: bool,
    /// Recorded as the band's nodata value when set
    pub no_data: Option<f32>,
    pub description: String,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            compress: "DEFLATE".to_string(),
            compress_level: 6,
            tiled: true,
            no_data: None,
            description: "NBR".to_string(),
        }
    }
}

impl WriteOptions {
    pub fn creation_options(&self) -> Vec<String> {
        let mut options = Vec::new();
        let compress = self.compress.to_uppercase();

        if compress != "NONE" {
            options.push(format!("COMPRESS={compress}"));

            match compress.as_str() {
                "DEFLATE" => options.push(format!("ZLEVEL={}", self.compress_level.min(9))),
                "ZSTD" => options.push(format!("ZSTD_LEVEL={}", self.compress_level.min(22))),
                _ => {}
            }
        }

        if self.tiled {
            options.push("TILED=YES".to_string());
        }

        options
    }
}

/// Write `data` as a single Float32 band georeferenced by `geo_info`.
///
/// The raster is built in a temporary file next to `output_path` and renamed
/// over it once GDAL has flushed, so a failed write never leaves a partial
/// file at the destination.
pub fn write_raster(
    data: Vec<f32>,
    geo_info: &GeoInfo,
    output_path: &Path,
    options: &WriteOptions,
) -> Result<()> {
    let expected = geo_info.width * geo_info.height;
    if data.len() != expected {
        return Err(NbrError::shape_mismatch(
            format!("index grid holds {} samples, expected {}", data.len(), expected),
            (geo_info.height, geo_info.width),
            (data.len() / geo_info.width.max(1), geo_info.width),
        ));
    }

    let dir = match output_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let temp_path = tempfile::Builder::new()
        .prefix(".nbr-")
        .suffix(".tif")
        .tempfile_in(dir)?
        .into_temp_path();

    debug!("Writing index to temporary file {}", temp_path.display());
    write_geotiff(data, geo_info, &temp_path, options)?;

    temp_path
        .persist(output_path)
        .map_err(|e| NbrError::Io(e.error))?;

    info!(
        "Wrote {}x{} Float32 raster to {}",
        geo_info.width,
        geo_info.height,
        output_path.display()
    );
    Ok(())
}

fn write_geotiff(
    data: Vec<f32>,
    geo_info: &GeoInfo,
    path: &Path,
    options: &WriteOptions,
) -> Result<()> {
    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let creation_options = RasterCreationOptions::from_iter(options.creation_options());

    let mut out_ds = driver.create_with_band_type_with_options::<f32, _>(
        path,
        geo_info.width,
        geo_info.height,
        1,
        &creation_options,
    )?;

    out_ds.set_projection(&geo_info.projection)?;
    out_ds.set_geo_transform(&geo_info.geo_transform)?;

    {
        let mut band = out_ds.rasterband(1)?;
        if let Some(no_data) = options.no_data {
            band.set_no_data_value(Some(f64::from(no_data)))?;
        }
        band.set_description(&options.description)?;

        let shape = (geo_info.width, geo_info.height);
        let mut buffer = Buffer::new(shape, data);
        band.write((0, 0), shape, &mut buffer)?;
    }

    out_ds.flush_cache()?;
    Ok(())
}
