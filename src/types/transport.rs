//! Debris and sediment transport parameters

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::sizing_engine::SizingError;

/// Field debris rating for the reach upstream of the crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DebrisRating {
    Low,
    Medium,
    High,
}

impl DebrisRating {
    pub fn as_str(self) -> &'static str {
        match self {
            DebrisRating::Low => "low",
            DebrisRating::Medium => "medium",
            DebrisRating::High => "high",
        }
    }
}

impl fmt::Display for DebrisRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DebrisRating {
    type Err = SizingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(DebrisRating::Low),
            "medium" | "med" => Ok(DebrisRating::Medium),
            "high" => Ok(DebrisRating::High),
            other => Err(SizingError::InvalidInput(format!(
                "unknown debris rating '{other}' (expected low, medium or high)"
            ))),
        }
    }
}

/// Transport risk inputs. Absent parameters mean transport was not assessed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportParameters {
    pub debris_rating: DebrisRating,
    /// Sediment wedge depth behind the inlet (cm)
    pub sediment_depth_cm: f64,
    /// Largest mobile log diameter observed in the channel (m)
    pub max_log_diameter_m: f64,
}

impl TransportParameters {
    pub fn validate(&self) -> Result<(), SizingError> {
        check_non_negative("sediment depth", self.sediment_depth_cm)?;
        check_non_negative("log diameter", self.max_log_diameter_m)
    }
}

fn check_non_negative(name: &str, value: f64) -> Result<(), SizingError> {
    if !value.is_finite() || value < 0.0 {
        return Err(SizingError::InvalidInput(format!(
            "{name} must be zero or greater, got {value}"
        )));
    }
    Ok(())
}
