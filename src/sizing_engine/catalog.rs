//! Standard culvert size catalog and round-up rule

use super::SizingError;
use crate::config::{CatalogConfig, ConfigError};

/// Ascending list of permitted pipe diameters (mm) plus the diameter at
/// which professional engineering review becomes mandatory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardSizeCatalog {
    sizes_mm: Vec<u32>,
    professional_threshold_mm: u32,
}

impl StandardSizeCatalog {
    /// Build a catalog, rejecting empty or non-increasing size lists.
    pub fn new(sizes_mm: Vec<u32>, professional_threshold_mm: u32) -> Result<Self, ConfigError> {
        if sizes_mm.is_empty() {
            return Err(ConfigError::Validation(vec![
                "catalog must contain at least one size".to_string(),
            ]));
        }
        if sizes_mm[0] == 0 || sizes_mm.windows(2).any(|w| w[1] <= w[0]) {
            return Err(ConfigError::Validation(vec![format!(
                "catalog sizes must be positive and strictly increasing: {sizes_mm:?}"
            )]));
        }
        Ok(Self {
            sizes_mm,
            professional_threshold_mm,
        })
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self, ConfigError> {
        Self::new(config.sizes_mm.clone(), config.professional_threshold_mm)
    }

    pub fn sizes(&self) -> &[u32] {
        &self.sizes_mm
    }

    pub fn min(&self) -> u32 {
        self.sizes_mm[0]
    }

    pub fn max(&self) -> u32 {
        self.sizes_mm[self.sizes_mm.len() - 1]
    }

    pub fn professional_threshold(&self) -> u32 {
        self.professional_threshold_mm
    }

    pub fn contains(&self, size_mm: u32) -> bool {
        self.sizes_mm.binary_search(&size_mm).is_ok()
    }

    /// Smallest catalog size >= `value`; the catalog maximum when `value`
    /// exceeds every entry. Flagging that case is the caller's job.
    pub fn round_up_to_standard(&self, value: f64) -> Result<u32, SizingError> {
        if !value.is_finite() || value <= 0.0 {
            return Err(SizingError::InvalidInput(format!(
                "diameter to round must be a positive number, got {value}"
            )));
        }
        Ok(self
            .sizes_mm
            .iter()
            .copied()
            .find(|&s| f64::from(s) >= value)
            .unwrap_or_else(|| self.max()))
    }

    /// The catalog entry strictly greater than `size_mm`, if one exists.
    pub fn next_above(&self, size_mm: u32) -> Option<u32> {
        let idx = self.sizes_mm.partition_point(|&s| s <= size_mm);
        self.sizes_mm.get(idx).copied()
    }
}

impl Default for StandardSizeCatalog {
    fn default() -> Self {
        let config = CatalogConfig::default();
        Self {
            sizes_mm: config.sizes_mm,
            professional_threshold_mm: config.professional_threshold_mm,
        }
    }
}
