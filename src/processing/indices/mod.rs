// src/processing/indices/mod.rs
pub mod nbr;

pub use nbr::{ZeroDenominator, NBR};
