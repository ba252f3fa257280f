//! Debris and sediment transport index and the one-size bump rule

use super::StandardSizeCatalog;
use crate::config::{defaults, TransportConfig};
use crate::types::TransportParameters;

/// Outcome of the transport assessment for a base size.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportAdjustment {
    pub transport_index: f64,
    pub adjusted_size_mm: u32,
    pub recommendation: Option<String>,
    pub tips: Vec<String>,
    /// Index called for a bump but no larger catalog size exists
    pub bump_capped: bool,
}

impl TransportAdjustment {
    fn unchanged(base_size_mm: u32, transport_index: f64) -> Self {
        Self {
            transport_index,
            adjusted_size_mm: base_size_mm,
            recommendation: None,
            tips: Vec::new(),
            bump_capped: false,
        }
    }
}

/// Weighted transport risk score.
///
/// `index = weight * debris_score + c_sed * sediment_cm + c_log * log_m`;
/// with defaults that is `1.0 * {1,2,3} + 0.05 * cm + 5.0 * m`.
pub fn transport_index(params: &TransportParameters, config: &TransportConfig) -> f64 {
    config.debris_weight * config.debris_score(params.debris_rating)
        + config.sediment_coefficient_per_cm * params.sediment_depth_cm
        + config.log_coefficient_per_m * params.max_log_diameter_m
}

/// Bump `base_size_mm` to the next catalog size when the transport index
/// reaches the configured threshold. No parameters means not assessed.
pub fn apply_transport_adjustment(
    base_size_mm: u32,
    params: Option<&TransportParameters>,
    catalog: &StandardSizeCatalog,
    config: &TransportConfig,
) -> TransportAdjustment {
    let Some(params) = params else {
        return TransportAdjustment::unchanged(base_size_mm, 0.0);
    };

    let index = transport_index(params, config);
    if index < config.bump_threshold {
        return TransportAdjustment::unchanged(base_size_mm, index);
    }

    let next = catalog.next_above(base_size_mm);
    TransportAdjustment {
        transport_index: index,
        adjusted_size_mm: next.unwrap_or(base_size_mm),
        recommendation: Some(defaults::TRANSPORT_RECOMMENDATION.to_string()),
        tips: defaults::TRANSPORT_TIPS.iter().map(|t| (*t).to_string()).collect(),
        bump_capped: next.is_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DebrisRating;

    fn params(rating: DebrisRating, sediment_cm: f64, log_m: f64) -> TransportParameters {
        TransportParameters {
            debris_rating: rating,
            sediment_depth_cm: sediment_cm,
            max_log_diameter_m: log_m,
        }
    }

    #[test]
    fn test_index_formula() {
        let config = TransportConfig::default();
        let idx = transport_index(&params(DebrisRating::High, 10.0, 0.5), &config);
        assert!((idx - 6.0).abs() < 1e-9, "expected 6.0, got {idx}");
        let idx = transport_index(&params(DebrisRating::Low, 0.0, 0.0), &config);
        assert!((idx - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_index_monotonic_in_each_input() {
        let config = TransportConfig::default();
        let base = transport_index(&params(DebrisRating::Low, 5.0, 0.1), &config);
        assert!(transport_index(&params(DebrisRating::Medium, 5.0, 0.1), &config) > base);
        assert!(transport_index(&params(DebrisRating::High, 5.0, 0.1), &config)
            > transport_index(&params(DebrisRating::Medium, 5.0, 0.1), &config));
        assert!(transport_index(&params(DebrisRating::Low, 6.0, 0.1), &config) > base);
        assert!(transport_index(&params(DebrisRating::Low, 5.0, 0.2), &config) > base);
    }

    #[test]
    fn test_absent_params_mean_no_bump() {
        let catalog = StandardSizeCatalog::default();
        let adj = apply_transport_adjustment(900, None, &catalog, &TransportConfig::default());
        assert_eq!(adj.adjusted_size_mm, 900);
        assert!(adj.transport_index.abs() < f64::EPSILON);
        assert!(adj.recommendation.is_none());
        assert!(adj.tips.is_empty());
    }

    #[test]
    fn test_high_index_bumps_one_size() {
        let catalog = StandardSizeCatalog::default();
        let p = params(DebrisRating::High, 10.0, 0.5);
        let adj = apply_transport_adjustment(900, Some(&p), &catalog, &TransportConfig::default());
        assert_eq!(adj.adjusted_size_mm, 1000);
        assert!(adj.recommendation.is_some());
        assert_eq!(adj.tips.len(), 4);
        assert!(!adj.bump_capped);
    }

    #[test]
    fn test_threshold_is_inclusive() {
        let catalog = StandardSizeCatalog::default();
        // 2 + 0.05 * 20 + 5 * 0.2 = 4.0
        let p = params(DebrisRating::Medium, 20.0, 0.2);
        let adj = apply_transport_adjustment(600, Some(&p), &catalog, &TransportConfig::default());
        assert!((adj.transport_index - 4.0).abs() < 1e-9);
        assert_eq!(adj.adjusted_size_mm, 700);
    }

    #[test]
    fn test_low_index_keeps_size() {
        let catalog = StandardSizeCatalog::default();
        let p = params(DebrisRating::Medium, 10.0, 0.1);
        let adj = apply_transport_adjustment(600, Some(&p), &catalog, &TransportConfig::default());
        assert!((adj.transport_index - 3.0).abs() < 1e-9);
        assert_eq!(adj.adjusted_size_mm, 600);
        assert!(adj.recommendation.is_none());
    }

    #[test]
    fn test_bump_at_catalog_max_is_capped() {
        let catalog = StandardSizeCatalog::default();
        let p = params(DebrisRating::High, 30.0, 1.0);
        let adj = apply_transport_adjustment(2000, Some(&p), &catalog, &TransportConfig::default());
        assert_eq!(adj.adjusted_size_mm, 2000);
        assert!(adj.bump_capped);
        assert!(adj.recommendation.is_some());
    }

    #[test]
    fn test_off_catalog_base_bumps_to_next_entry() {
        let catalog = StandardSizeCatalog::default();
        let p = params(DebrisRating::High, 10.0, 0.5);
        let adj = apply_transport_adjustment(1514, Some(&p), &catalog, &TransportConfig::default());
        assert_eq!(adj.adjusted_size_mm, 1600);
    }
}
