// src/io/mod.rs
pub mod reader;
pub mod writer;

pub use reader::open_raster;
pub use writer::{write_raster, WriteOptions};
