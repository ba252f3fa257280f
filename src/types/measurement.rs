//! Stream channel measurements taken at the crossing site

use serde::{Deserialize, Serialize};

use crate::sizing_engine::SizingError;

/// Field measurements of the natural stream channel.
///
/// Top widths and depths are independent readings along the reach; the two
/// sequences do not need the same length. A single bottom width is recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamMeasurement {
    /// Channel top-width readings (m)
    pub top_widths_m: Vec<f64>,
    /// Channel bottom width (m)
    pub bottom_width_m: f64,
    /// Channel depth readings (m)
    pub depths_m: Vec<f64>,
}

impl StreamMeasurement {
    pub fn new(top_widths_m: Vec<f64>, bottom_width_m: f64, depths_m: Vec<f64>) -> Self {
        Self {
            top_widths_m,
            bottom_width_m,
            depths_m,
        }
    }

    /// Reject empty sequences and any reading that is not a positive finite number.
    pub fn validate(&self) -> Result<(), SizingError> {
        check_readings("top width", &self.top_widths_m)?;
        check_readings("depth", &self.depths_m)?;
        check_positive("bottom width", self.bottom_width_m)
    }

    /// Mean of the top-width readings (m). Zero for an empty sequence.
    pub fn average_top_width(&self) -> f64 {
        mean(&self.top_widths_m)
    }

    /// Mean of the depth readings (m). Zero for an empty sequence.
    pub fn average_depth(&self) -> f64 {
        mean(&self.depths_m)
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn check_readings(name: &str, values: &[f64]) -> Result<(), SizingError> {
    if values.is_empty() {
        return Err(SizingError::InvalidInput(format!(
            "at least one {name} reading is required"
        )));
    }
    for (i, v) in values.iter().enumerate() {
        check_positive(&format!("{name} reading #{}", i + 1), *v)?;
    }
    Ok(())
}

pub(crate) fn check_positive(name: &str, value: f64) -> Result<(), SizingError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(SizingError::InvalidInput(format!(
            "{name} must be a positive number, got {value}"
        )));
    }
    Ok(())
}
