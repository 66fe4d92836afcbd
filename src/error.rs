// src/error.rs
use thiserror::Error;

/// Errors raised while acquiring bands or computing the index
#[derive(Error, Debug)]
pub enum NbrError {
    /// Two grids cannot be aligned or combined. Shapes are (rows, cols).
    #[error("{context}: fine grid {fine:?} vs coarse grid {coarse:?}")]
    ShapeMismatch {
        context: String,
        fine: (usize, usize),
        coarse: (usize, usize),
    },

    /// Two grids have compatible sizes but do not cover the same area
    #[error("Georeferencing mismatch: {0}")]
    Georeferencing(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),

    #[error("Unsupported raster data type: {0}")]
    UnsupportedDataType(String),

    #[error("Not enough input bands. Required: {required}, provided: {provided}")]
    BandCount { required: usize, provided: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid area of interest: {0}")]
    Footprint(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("No scenes found for the requested area and time window")]
    NoScenes,

    #[error("Invalid scene selection: {0}")]
    Selection(String),
}

impl From<reqwest::Error> for NbrError {
    fn from(e: reqwest::Error) -> Self {
        NbrError::Http(e.to_string())
    }
}

impl NbrError {
    pub fn shape_mismatch(
        context: impl Into<String>,
        fine: (usize, usize),
        coarse: (usize, usize),
    ) -> Self {
        NbrError::ShapeMismatch {
            context: context.into(),
            fine,
            coarse,
        }
    }
}

/// Result type for NBR operations
pub type Result<T> = std::result::Result<T, NbrError>;
