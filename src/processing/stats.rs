// src/processing/stats.rs

/// Summary of an index grid
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IndexStats {
    pub valid: usize,
    pub nan: usize,
    pub infinite: usize,
    /// Pixels equal to the nodata sentinel, if one was used
    pub no_data: usize,
    pub min: Option<f32>,
    pub max: Option<f32>,
    pub mean: Option<f64>,
}

impl IndexStats {
    pub fn from_values(values: &[f32], no_data: Option<f32>) -> Self {
        let mut stats = IndexStats::default();
        let mut sum = 0.0f64;

        for &value in values {
            if value.is_nan() {
                stats.nan += 1;
            } else if value.is_infinite() {
                stats.infinite += 1;
            } else if no_data == Some(value) {
                stats.no_data += 1;
            } else {
                stats.valid += 1;
                sum += f64::from(value);
                stats.min = Some(stats.min.map_or(value, |m| m.min(value)));
                stats.max = Some(stats.max.map_or(value, |m| m.max(value)));
            }
        }

        if stats.valid > 0 {
            stats.mean = Some(sum / stats.valid as f64);
        }
        stats
    }
}
