//! Sizing Configuration - every domain constant as an operator-tunable TOML value
//!
//! Each struct implements `Default` with the standard field-guide values, so
//! behaviour is unchanged when no config file is present.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

use super::defaults;
use crate::types::DebrisRating;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for the sizing engine and its collaborators.
///
/// Load with `SizingConfig::load()` which searches:
/// 1. `$CULVERT_CONFIG` env var
/// 2. `./culvert_config.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SizingConfig {
    /// Standard pipe sizes and the professional design threshold
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Hydraulic area sizing
    #[serde(default)]
    pub hydraulics: HydraulicsConfig,

    /// Debris / sediment transport index
    #[serde(default)]
    pub transport: TransportConfig,

    /// Climate projection uplift factors
    #[serde(default)]
    pub climate: ClimateConfig,

    /// Assessment record storage
    #[serde(default)]
    pub storage: StorageConfig,
}

impl SizingConfig {
    /// Load configuration using the standard search order:
    /// 1. `$CULVERT_CONFIG` environment variable
    /// 2. `./culvert_config.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(defaults::CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded sizing config from {}", defaults::CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", defaults::CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", defaults::CONFIG_ENV_VAR);
            }
        }

        let local = PathBuf::from(defaults::LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded sizing config from ./{}", defaults::LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", defaults::LOCAL_CONFIG_FILE);
                }
            }
        }

        info!("No {} found, using built-in defaults", defaults::LOCAL_CONFIG_FILE);
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, err) => ConfigError::Parse(path.to_path_buf(), err),
            other => other,
        })
    }

    /// Parse and validate a TOML document. Unknown keys only warn.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(PathBuf::new(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the effective config to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;
        std::fs::write(path, contents).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        info!(path = %path.display(), "Sizing config saved");
        Ok(())
    }

    /// Validate all values for internal consistency.
    ///
    /// Rules:
    /// - Catalog is non-empty, strictly increasing, all entries > 0
    /// - Professional threshold is not below the smallest catalog size
    /// - Multipliers and coefficients are finite; divisors and factors in range
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        // Catalog
        let sizes = &self.catalog.sizes_mm;
        if sizes.is_empty() {
            errors.push("catalog.sizes_mm must contain at least one size".to_string());
        } else {
            if sizes[0] == 0 {
                errors.push("catalog.sizes_mm entries must be > 0".to_string());
            }
            if let Some(pair) = sizes.windows(2).find(|w| w[1] <= w[0]) {
                errors.push(format!(
                    "catalog.sizes_mm must be strictly increasing ({} followed by {})",
                    pair[0], pair[1]
                ));
            }
            if self.catalog.professional_threshold_mm < sizes[0] {
                errors.push(format!(
                    "catalog.professional_threshold_mm ({}) is below the smallest catalog size ({})",
                    self.catalog.professional_threshold_mm, sizes[0]
                ));
            }
        }

        // Hydraulics
        Self::check_positive(
            self.hydraulics.end_opening_multiplier,
            "hydraulics.end_opening_multiplier",
            &mut errors,
        );

        // Transport
        let t = &self.transport;
        for (value, name) in [
            (t.debris_score_low, "transport.debris_score_low"),
            (t.debris_score_medium, "transport.debris_score_medium"),
            (t.debris_score_high, "transport.debris_score_high"),
            (t.debris_weight, "transport.debris_weight"),
            (t.sediment_coefficient_per_cm, "transport.sediment_coefficient_per_cm"),
            (t.log_coefficient_per_m, "transport.log_coefficient_per_m"),
        ] {
            Self::check_non_negative(value, name, &mut errors);
        }
        if !(t.debris_score_low <= t.debris_score_medium && t.debris_score_medium <= t.debris_score_high) {
            errors.push(format!(
                "transport debris scores must be ordered low <= medium <= high (got {:.2}, {:.2}, {:.2})",
                t.debris_score_low, t.debris_score_medium, t.debris_score_high
            ));
        }
        Self::check_positive(t.bump_threshold, "transport.bump_threshold", &mut errors);

        // Climate
        for (value, name) in [
            (self.climate.near_term_factor, "climate.near_term_factor"),
            (self.climate.long_term_factor, "climate.long_term_factor"),
        ] {
            if !value.is_finite() || value < 1.0 {
                errors.push(format!("{name} must be a finite factor >= 1.0 (got {value})"));
            }
        }

        if self.storage.db_path.trim().is_empty() {
            errors.push("storage.db_path must not be empty".to_string());
        }

        let (range_errors, range_warnings) = super::validation::validate_physical_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_positive(value: f64, name: &str, errors: &mut Vec<String>) {
        if !value.is_finite() || value <= 0.0 {
            errors.push(format!("{name} must be a finite value > 0 (got {value})"));
        }
    }

    fn check_non_negative(value: f64, name: &str, errors: &mut Vec<String>) {
        if !value.is_finite() || value < 0.0 {
            errors.push(format!("{name} must be a finite value >= 0 (got {value})"));
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config I/O error ({}): {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Config parse error ({}): {}", .0.display(), .1)]
    Parse(PathBuf, #[source] toml::de::Error),
    #[error("Config serialization error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation failed:\n  - {}", .0.join("\n  - "))]
    Validation(Vec<String>),
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Permitted diameters (mm), strictly ascending
    pub sizes_mm: Vec<u32>,
    /// Diameter at or above which professional design is mandatory (mm)
    pub professional_threshold_mm: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            sizes_mm: defaults::STANDARD_SIZES_MM.to_vec(),
            professional_threshold_mm: defaults::PROFESSIONAL_THRESHOLD_MM,
        }
    }
}

// ============================================================================
// Hydraulics
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HydraulicsConfig {
    /// End-opening area as a multiple of the channel cross-section
    pub end_opening_multiplier: f64,
}

impl Default for HydraulicsConfig {
    fn default() -> Self {
        Self {
            end_opening_multiplier: defaults::END_OPENING_MULTIPLIER,
        }
    }
}

// ============================================================================
// Transport
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    pub debris_score_low: f64,
    pub debris_score_medium: f64,
    pub debris_score_high: f64,
    pub debris_weight: f64,
    pub sediment_coefficient_per_cm: f64,
    pub log_coefficient_per_m: f64,
    /// Index at or above which the culvert is bumped one catalog size
    pub bump_threshold: f64,
}

impl TransportConfig {
    pub fn debris_score(&self, rating: DebrisRating) -> f64 {
        match rating {
            DebrisRating::Low => self.debris_score_low,
            DebrisRating::Medium => self.debris_score_medium,
            DebrisRating::High => self.debris_score_high,
        }
    }
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            debris_score_low: defaults::DEBRIS_SCORE_LOW,
            debris_score_medium: defaults::DEBRIS_SCORE_MEDIUM,
            debris_score_high: defaults::DEBRIS_SCORE_HIGH,
            debris_weight: defaults::DEBRIS_WEIGHT,
            sediment_coefficient_per_cm: defaults::SEDIMENT_COEFFICIENT_PER_CM,
            log_coefficient_per_m: defaults::LOG_COEFFICIENT_PER_M,
            bump_threshold: defaults::TRANSPORT_BUMP_THRESHOLD,
        }
    }
}

// ============================================================================
// Climate
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateConfig {
    pub near_term_factor: f64,
    pub long_term_factor: f64,
}

impl Default for ClimateConfig {
    fn default() -> Self {
        Self {
            near_term_factor: defaults::NEAR_TERM_FACTOR,
            long_term_factor: defaults::LONG_TERM_FACTOR,
        }
    }
}

// ============================================================================
// Storage
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// sled database directory
    pub db_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: defaults::DEFAULT_DB_PATH.to_string(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(SizingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_empty_toml_is_defaults() {
        let config = SizingConfig::from_toml_str("").unwrap();
        assert_eq!(config, SizingConfig::default());
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = SizingConfig::from_toml_str(
            r#"
[transport]
bump_threshold = 5.0
"#,
        )
        .unwrap();
        assert!((config.transport.bump_threshold - 5.0).abs() < f64::EPSILON);
        assert!((config.transport.log_coefficient_per_m - 5.0).abs() < f64::EPSILON);
        assert_eq!(config.catalog.sizes_mm.len(), 15);
    }

    #[test]
    fn test_non_increasing_catalog_rejected() {
        let mut config = SizingConfig::default();
        config.catalog.sizes_mm = vec![300, 500, 400];
        let result = config.validate();
        assert!(matches!(result, Err(ConfigError::Validation(_))));
        if let Err(ConfigError::Validation(errors)) = result {
            assert!(errors.iter().any(|e| e.contains("strictly increasing")));
        }
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let mut config = SizingConfig::default();
        config.catalog.sizes_mm.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_climate_factor_below_one_rejected() {
        let mut config = SizingConfig::default();
        config.climate.near_term_factor = 0.9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_nan_multiplier_rejected() {
        let mut config = SizingConfig::default();
        config.hydraulics.end_opening_multiplier = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_roundtrip_preserves_values() {
        let mut config = SizingConfig::default();
        config.climate.long_term_factor = 1.25;
        let s = config.to_toml().unwrap();
        let back = SizingConfig::from_toml_str(&s).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_validation_error_lists_all_problems() {
        let mut config = SizingConfig::default();
        config.transport.bump_threshold = 0.0;
        config.hydraulics.end_opening_multiplier = -1.0;
        let err = config.validate().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("bump_threshold"));
        assert!(msg.contains("end_opening_multiplier"));
    }
}
