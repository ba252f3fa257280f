//! Climate projection uplift of the hydraulic opening

use tracing::warn;

use super::hydraulics::diameter_for_area;
use super::{SizingError, StandardSizeCatalog};
use crate::config::ClimateConfig;
use crate::types::{ClimateScenario, ClimateScenarioTag};

/// Result of applying a climate factor to the transport-adjusted size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClimateAdjustment {
    pub climate_factor: f64,
    /// Uplifted end-opening area (m²); `None` when no uplift applies
    pub adjusted_area_m2: Option<f64>,
    pub adjusted_size_mm: u32,
}

/// Resolve the uplift factor. A custom factor wins over the scenario tag;
/// unknown scenarios and `none` resolve to 1.0.
pub fn resolve_climate_factor(scenario: Option<&ClimateScenario>, config: &ClimateConfig) -> f64 {
    let Some(scenario) = scenario else {
        return 1.0;
    };
    if let Some(factor) = scenario.custom_factor {
        return factor;
    }
    match scenario.scenario {
        ClimateScenarioTag::NearTerm => config.near_term_factor,
        ClimateScenarioTag::LongTerm => config.long_term_factor,
        ClimateScenarioTag::None | ClimateScenarioTag::Custom => 1.0,
        ClimateScenarioTag::Unrecognized => {
            warn!("Unrecognized climate scenario, no uplift applied");
            1.0
        }
    }
}

/// Scale the end-opening area by the climate factor and re-derive the size.
/// The result never drops below `transport_adjusted_mm`.
pub fn apply_climate_adjustment(
    transport_adjusted_mm: u32,
    end_opening_area_m2: f64,
    scenario: Option<&ClimateScenario>,
    catalog: &StandardSizeCatalog,
    config: &ClimateConfig,
) -> Result<ClimateAdjustment, SizingError> {
    let climate_factor = resolve_climate_factor(scenario, config);
    if climate_factor <= 1.0 {
        return Ok(ClimateAdjustment {
            climate_factor: 1.0,
            adjusted_area_m2: None,
            adjusted_size_mm: transport_adjusted_mm,
        });
    }

    let adjusted_area_m2 = end_opening_area_m2 * climate_factor;
    let rounded = catalog.round_up_to_standard(f64::from(diameter_for_area(adjusted_area_m2)))?;

    Ok(ClimateAdjustment {
        climate_factor,
        adjusted_area_m2: Some(adjusted_area_m2),
        adjusted_size_mm: rounded.max(transport_adjusted_mm),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scenario_factors() {
        let config = ClimateConfig::default();
        assert!((resolve_climate_factor(None, &config) - 1.0).abs() < f64::EPSILON);
        let near = ClimateScenario::named(ClimateScenarioTag::NearTerm);
        assert!((resolve_climate_factor(Some(&near), &config) - 1.10).abs() < f64::EPSILON);
        let long = ClimateScenario::named(ClimateScenarioTag::LongTerm);
        assert!((resolve_climate_factor(Some(&long), &config) - 1.20).abs() < f64::EPSILON);
        let unknown = ClimateScenario::named(ClimateScenarioTag::Unrecognized);
        assert!((resolve_climate_factor(Some(&unknown), &config) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_custom_factor_overrides_scenario() {
        let config = ClimateConfig::default();
        let scenario = ClimateScenario {
            scenario: ClimateScenarioTag::LongTerm,
            custom_factor: Some(1.35),
        };
        assert!((resolve_climate_factor(Some(&scenario), &config) - 1.35).abs() < f64::EPSILON);
    }

    #[test]
    fn test_long_term_uplift() {
        let catalog = StandardSizeCatalog::default();
        let long = ClimateScenario::named(ClimateScenarioTag::LongTerm);
        let adj = apply_climate_adjustment(900, 0.45, Some(&long), &catalog, &ClimateConfig::default())
            .unwrap();
        assert!((adj.adjusted_area_m2.unwrap() - 0.54).abs() < 1e-9);
        // 0.54 m² -> 830 mm -> 900 mm, floored at the 900 mm transport size
        assert_eq!(adj.adjusted_size_mm, 900);
    }

    #[test]
    fn test_uplift_can_raise_size() {
        let catalog = StandardSizeCatalog::default();
        let long = ClimateScenario::named(ClimateScenarioTag::LongTerm);
        let adj = apply_climate_adjustment(800, 0.45, Some(&long), &catalog, &ClimateConfig::default())
            .unwrap();
        assert_eq!(adj.adjusted_size_mm, 900);
    }

    #[test]
    fn test_never_below_transport_floor() {
        let catalog = StandardSizeCatalog::default();
        let near = ClimateScenario::named(ClimateScenarioTag::NearTerm);
        let adj = apply_climate_adjustment(1200, 0.2, Some(&near), &catalog, &ClimateConfig::default())
            .unwrap();
        assert_eq!(adj.adjusted_size_mm, 1200);
    }

    #[test]
    fn test_no_uplift_passes_through() {
        let catalog = StandardSizeCatalog::default();
        let adj = apply_climate_adjustment(1514, 1.8, None, &catalog, &ClimateConfig::default())
            .unwrap();
        assert_eq!(adj.adjusted_size_mm, 1514);
        assert!(adj.adjusted_area_m2.is_none());
        assert!((adj.climate_factor - 1.0).abs() < f64::EPSILON);
    }
}
