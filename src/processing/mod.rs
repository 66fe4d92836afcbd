// src/processing/mod.rs
pub mod align;
pub mod indices;
pub mod processor;
pub mod stats;

// Re-export main components
pub use processor::{IndexCalculator, Processor};
pub use stats::IndexStats;
