// src/processing/align.rs
use gdal::spatial_ref::SpatialRef;
use itertools::iproduct;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::{NbrError, Result};
use crate::raster::{GeoInfo, RasterBand};
use crate::utils::gdal_ext::TypedBuffer;

/// Allowed georeferencing drift, as a fraction of the fine pixel size
const GEO_TOLERANCE: f64 = 1e-3;

/// Resampling factor between Sentinel-2's 10 m and 20 m grids
pub const SENTINEL2_FACTOR: usize = 2;

/// How to treat grids whose sizes are not an exact multiple of each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlignPolicy {
    /// Both axes must divide exactly by the same factor
    #[default]
    Exact,
    /// Round the factor up and crop the overhang to the fine grid
    CropExcess,
}

/// Resampling factor `k` for upsampling `coarse` onto `fine`. Shapes are (rows, cols).
pub fn resample_factor(
    fine: (usize, usize),
    coarse: (usize, usize),
    policy: AlignPolicy,
) -> Result<usize> {
    let (rows, cols) = fine;
    let (coarse_rows, coarse_cols) = coarse;

    if rows == 0 || cols == 0 || coarse_rows == 0 || coarse_cols == 0 {
        return Err(NbrError::shape_mismatch("empty grid", fine, coarse));
    }
    if coarse_rows > rows || coarse_cols > cols {
        return Err(NbrError::shape_mismatch(
            "coarse grid is larger than the fine grid",
            fine,
            coarse,
        ));
    }

    let (row_factor, col_factor) = match policy {
        AlignPolicy::Exact => {
            if rows % coarse_rows != 0 || cols % coarse_cols != 0 {
                return Err(NbrError::shape_mismatch(
                    "grids are not related by an integer factor",
                    fine,
                    coarse,
                ));
            }
            (rows / coarse_rows, cols / coarse_cols)
        }
        AlignPolicy::CropExcess => (rows.div_ceil(coarse_rows), cols.div_ceil(coarse_cols)),
    };

    if row_factor != col_factor {
        return Err(NbrError::shape_mismatch(
            format!("row factor {row_factor} differs from column factor {col_factor}"),
            fine,
            coarse,
        ));
    }

    if row_factor != SENTINEL2_FACTOR {
        warn!(
            "Resampling factor is {row_factor}, expected {SENTINEL2_FACTOR} for 10 m / 20 m Sentinel-2 bands"
        );
    }

    Ok(row_factor)
}

/// Nearest-neighbour upsample by `factor` along both axes:
/// `out[i, j] == coarse[i / factor, j / factor]`.
pub fn upsample(coarse: &TypedBuffer, factor: usize) -> TypedBuffer {
    let (width, height) = coarse.shape();
    let out_width = width * factor;
    let out_height = height * factor;

    let lookup: Vec<usize> = iproduct!(0..out_height, 0..out_width)
        .map(|(i, j)| (i / factor) * width + j / factor)
        .collect();

    coarse.remap((out_width, out_height), |n| lookup[n])
}

/// Keep the top-left `rows x cols` corner of `buffer`
pub fn crop(buffer: &TypedBuffer, rows: usize, cols: usize) -> TypedBuffer {
    let (width, _) = buffer.shape();
    buffer.remap((cols, rows), |n| (n / cols) * width + n % cols)
}

/// Align `coarse` onto a grid of `fine_shape` (rows, cols).
///
/// The result always has exactly `fine_shape`.
pub fn align_to(
    coarse: &TypedBuffer,
    fine_shape: (usize, usize),
    policy: AlignPolicy,
) -> Result<TypedBuffer> {
    let (width, height) = coarse.shape();
    let factor = resample_factor(fine_shape, (height, width), policy)?;
    Ok(resize(coarse, fine_shape, factor))
}

/// Align a georeferenced band onto `reference`, refusing bands that cover a
/// different area or use a different projection.
pub fn align_band(
    band: &RasterBand,
    reference: &GeoInfo,
    policy: AlignPolicy,
) -> Result<TypedBuffer> {
    let fine_shape = (reference.height, reference.width);
    let factor = if band.shape() == fine_shape {
        1
    } else {
        resample_factor(fine_shape, band.shape(), policy)?
    };

    check_georeferencing(reference, &band.geo, factor)?;

    if factor == 1 && band.shape() == fine_shape {
        Ok(band.data.clone())
    } else {
        Ok(resize(&band.data, fine_shape, factor))
    }
}

/// Check that `coarse` shares the projection and origin of `fine` and that its
/// pixels are `factor` times larger.
pub fn check_georeferencing(fine: &GeoInfo, coarse: &GeoInfo, factor: usize) -> Result<()> {
    if !same_projection(&fine.projection, &coarse.projection) {
        return Err(NbrError::Georeferencing(
            "bands use different projections".to_string(),
        ));
    }

    let tolerance = fine.pixel_size().0.abs().max(f64::EPSILON) * GEO_TOLERANCE;
    let (f, c) = (&fine.geo_transform, &coarse.geo_transform);

    if (f[0] - c[0]).abs() > tolerance || (f[3] - c[3]).abs() > tolerance {
        return Err(NbrError::Georeferencing(format!(
            "origins differ: ({}, {}) vs ({}, {})",
            f[0], f[3], c[0], c[3]
        )));
    }

    let k = factor as f64;
    if [1, 2, 4, 5]
        .iter()
        .any(|&i| (c[i] - k * f[i]).abs() > tolerance * k)
    {
        return Err(NbrError::Georeferencing(format!(
            "pixel size {:?} is not {factor} x {:?}",
            coarse.pixel_size(),
            fine.pixel_size()
        )));
    }

    Ok(())
}

fn same_projection(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }
    match (SpatialRef::from_wkt(a), SpatialRef::from_wkt(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

fn resize(coarse: &TypedBuffer, fine_shape: (usize, usize), factor: usize) -> TypedBuffer {
    let (width, height) = coarse.shape();
    debug!("Upsampling {width}x{height} band by a factor of {factor}");

    let aligned = upsample(coarse, factor);
    let (aligned_width, aligned_height) = aligned.shape();
    let (rows, cols) = fine_shape;

    if (aligned_height, aligned_width) == fine_shape {
        aligned
    } else {
        debug!("Cropping aligned band from {aligned_width}x{aligned_height} to {cols}x{rows}");
        crop(&aligned, rows, cols)
    }
}
