// src/utils/mod.rs
pub mod gdal_ext;
