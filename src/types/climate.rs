//! Climate projection scenario selection

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::sizing_engine::SizingError;

/// Named climate projection. Unknown names deserialize to `Unrecognized`,
/// which resolves to no uplift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClimateScenarioTag {
    #[default]
    None,
    NearTerm,
    LongTerm,
    Custom,
    #[serde(other)]
    Unrecognized,
}

impl ClimateScenarioTag {
    pub fn as_str(self) -> &'static str {
        match self {
            ClimateScenarioTag::None => "none",
            ClimateScenarioTag::NearTerm => "near-term",
            ClimateScenarioTag::LongTerm => "long-term",
            ClimateScenarioTag::Custom => "custom",
            ClimateScenarioTag::Unrecognized => "unrecognized",
        }
    }
}

impl fmt::Display for ClimateScenarioTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClimateScenarioTag {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "none" | "" => ClimateScenarioTag::None,
            "near-term" | "nearterm" => ClimateScenarioTag::NearTerm,
            "long-term" | "longterm" => ClimateScenarioTag::LongTerm,
            "custom" => ClimateScenarioTag::Custom,
            _ => ClimateScenarioTag::Unrecognized,
        };
        Ok(tag)
    }
}

/// Climate projection applied to the hydraulic opening.
///
/// A custom factor, when present, wins over the scenario tag.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ClimateScenario {
    #[serde(default)]
    pub scenario: ClimateScenarioTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_factor: Option<f64>,
}

impl ClimateScenario {
    pub fn named(scenario: ClimateScenarioTag) -> Self {
        Self {
            scenario,
            custom_factor: None,
        }
    }

    pub fn custom(factor: f64) -> Self {
        Self {
            scenario: ClimateScenarioTag::Custom,
            custom_factor: Some(factor),
        }
    }

    pub fn validate(&self) -> Result<(), SizingError> {
        match self.custom_factor {
            Some(f) if !f.is_finite() || f <= 1.0 => Err(SizingError::InvalidInput(format!(
                "custom climate factor must be greater than 1.0, got {f}"
            ))),
            None if self.scenario == ClimateScenarioTag::Custom => Err(
                SizingError::InvalidInput("custom climate scenario requires a factor".to_string()),
            ),
            _ => Ok(()),
        }
    }
}
