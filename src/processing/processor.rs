// src/processing/processor.rs
use log::info;
use std::path::{Path, PathBuf};

use crate::error::{NbrError, Result};
use crate::io::{open_raster, write_raster, WriteOptions};
use crate::processing::align::{align_band, AlignPolicy};
use crate::processing::stats::IndexStats;
use crate::raster::RasterBand;
use crate::utils::gdal_ext::TypedBuffer;

/// Runs read -> align -> calculate -> write, one stage after another.
///
/// The first input band is the reference grid: every other band must cover
/// the same area, is aligned onto it, and the output inherits its
/// georeferencing.
pub struct Processor {
    align_policy: AlignPolicy,
    write_options: WriteOptions,
}

impl Processor {
    pub fn new(align_policy: AlignPolicy, write_options: WriteOptions) -> Self {
        Self {
            align_policy,
            write_options,
        }
    }

    pub fn process<I: IndexCalculator>(
        &self,
        calculator: &I,
        input_paths: &[PathBuf],
        output_path: &Path,
    ) -> Result<IndexStats> {
        if input_paths.len() < calculator.required_bands() {
            return Err(NbrError::BandCount {
                required: calculator.required_bands(),
                provided: input_paths.len(),
            });
        }

        let bands = input_paths
            .iter()
            .map(|path| open_raster(path))
            .collect::<Result<Vec<_>>>()?;

        let values = self.compute(calculator, &bands)?;
        let stats = IndexStats::from_values(&values, calculator.no_data());

        let options = WriteOptions {
            no_data: calculator.no_data(),
            description: calculator.name().to_string(),
            ..self.write_options.clone()
        };
        write_raster(values, &bands[0].geo, output_path, &options)?;

        Ok(stats)
    }

    /// Align `bands` onto the first band's grid and evaluate `calculator`
    pub fn compute<I: IndexCalculator>(
        &self,
        calculator: &I,
        bands: &[RasterBand],
    ) -> Result<Vec<f32>> {
        let reference = bands.first().ok_or(NbrError::BandCount {
            required: calculator.required_bands(),
            provided: 0,
        })?;
        let shape = reference.shape();

        let inputs = bands
            .iter()
            .map(|band| align_band(band, &reference.geo, self.align_policy))
            .collect::<Result<Vec<_>>>()?;

        info!(
            "Calculating {} on a {}x{} grid",
            calculator.name(),
            shape.1,
            shape.0
        );
        let result = calculator.calculate(&inputs)?;

        result
            .as_f32()
            .map(|buffer| buffer.data().to_vec())
            .ok_or_else(|| {
                NbrError::UnsupportedDataType(format!(
                    "{} produced {:?}, expected Float32",
                    calculator.name(),
                    result.data_type()
                ))
            })
    }
}

impl Default for Processor {
    fn default() -> Self {
        Self::new(AlignPolicy::default(), WriteOptions::default())
    }
}

/// Trait for band-math index calculators
pub trait IndexCalculator {
    /// Calculate the index from bands that already share one grid
    fn calculate(&self, inputs: &[TypedBuffer]) -> Result<TypedBuffer>;

    /// Return the number of required input bands
    fn required_bands(&self) -> usize;

    /// Return the name of the index
    fn name(&self) -> &str;

    /// Sentinel written where the index is undefined, if any
    fn no_data(&self) -> Option<f32> {
        None
    }
}
