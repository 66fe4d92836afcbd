// src/processing/indices/nbr.rs
use gdal::raster::Buffer;
use serde::{Deserialize, Serialize};

use crate::error::{NbrError, Result};
use crate::processing::processor::IndexCalculator;
use crate::utils::gdal_ext::TypedBuffer;

/// What to store where `NIR + SWIR == 0`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ZeroDenominator {
    /// Keep the IEEE result of the division: NaN for 0/0, ±inf otherwise
    #[default]
    Propagate,
    /// Substitute a sentinel, also recorded as the output's nodata value
    NoData(f32),
}

impl ZeroDenominator {
    pub fn no_data(&self) -> Option<f32> {
        match self {
            ZeroDenominator::Propagate => None,
            ZeroDenominator::NoData(value) => Some(*value),
        }
    }
}

/// Normalized Burn Ratio calculator: (NIR - SWIR) / (NIR + SWIR)
pub struct NBR {
    nir_index: usize,
    swir_index: usize,
    zero_denominator: ZeroDenominator,
    name: String,
}

impl NBR {
    pub fn new(nir_index: usize, swir_index: usize, name: Option<String>) -> Self {
        Self {
            nir_index,
            swir_index,
            zero_denominator: ZeroDenominator::default(),
            name: name.unwrap_or_else(|| "NBR".to_string()),
        }
    }

    pub fn with_zero_denominator(mut self, policy: ZeroDenominator) -> Self {
        self.zero_denominator = policy;
        self
    }

    fn ratio(&self, numerator: f64, denominator: f64) -> f32 {
        match self.zero_denominator {
            ZeroDenominator::NoData(value) if denominator == 0.0 => value,
            _ => (numerator / denominator) as f32,
        }
    }
}

impl IndexCalculator for NBR {
    fn calculate(&self, inputs: &[TypedBuffer]) -> Result<TypedBuffer> {
        if inputs.len() < self.required_bands() {
            return Err(NbrError::BandCount {
                required: self.required_bands(),
                provided: inputs.len(),
            });
        }

        let band = |index: usize| {
            inputs.get(index).ok_or(NbrError::BandCount {
                required: index + 1,
                provided: inputs.len(),
            })
        };
        let nir = band(self.nir_index)?;
        let swir = band(self.swir_index)?;

        let shape = nir.shape();
        if shape != swir.shape() {
            return Err(NbrError::shape_mismatch(
                "bands must share a grid to be combined",
                (shape.1, shape.0),
                (swir.shape().1, swir.shape().0),
            ));
        }

        // Integer samples are summed as i64; Int32 sums overflow otherwise.
        let result: Vec<f32> = match (nir.widen_to_i64(), swir.widen_to_i64()) {
            (Some(a), Some(b)) => a
                .iter()
                .zip(&b)
                .map(|(&a, &b)| self.ratio((a - b) as f64, (a + b) as f64))
                .collect(),
            _ => nir
                .to_f64()
                .iter()
                .zip(swir.to_f64())
                .map(|(&a, b)| self.ratio(a - b, a + b))
                .collect(),
        };

        Ok(TypedBuffer::F32(Buffer::new(shape, result)))
    }

    fn required_bands(&self) -> usize {
        2
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn no_data(&self) -> Option<f32> {
        self.zero_denominator.no_data()
    }
}
