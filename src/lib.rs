// src/lib.rs
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod processing;
pub mod raster;
pub mod utils;

pub use error::{NbrError, Result};

// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
