//! Sizing Engine Module
//!
//! Deterministic culvert sizing from field measurements. Pure functions, no
//! I/O and no shared state: one call in, one `SizingResult` out.
//!
//! ## Stages
//! - `hydraulics` - trapezoidal channel area, end-opening area, area-based size
//! - `california_table` - California Method table lookup (width x depth)
//! - `transport` - debris/sediment transport index and the one-size bump
//! - `climate` - climate projection uplift of the end-opening area
//! - `catalog` - standard size list, round-up rule, professional threshold
//!
//! ## Resolution
//! The area-based and table sizes are evaluated independently and the larger
//! wins. If the table says professional design is required, the unrounded
//! area-based diameter is carried forward instead. Transport then climate
//! adjust that base; reaching the professional threshold sets the flag.

pub mod california_table;
pub mod catalog;
pub mod climate;
pub mod hydraulics;
pub mod transport;

pub use california_table::CaliforniaTable;
pub use catalog::StandardSizeCatalog;
pub use climate::{apply_climate_adjustment, resolve_climate_factor, ClimateAdjustment};
pub use hydraulics::{calculate_hydraulic_area, diameter_for_area, HydraulicArea};
pub use transport::{apply_transport_adjustment, transport_index, TransportAdjustment};

use thiserror::Error;
use tracing::{debug, info};

use crate::config::{ConfigError, SizingConfig};
use crate::types::{
    ClimateScenario, SizingInputs, SizingResult, StreamMeasurement, TableCell, TransportParameters,
};

/// Caller-contract violations. Professional design is not an error; it is
/// reported through `SizingResult::requires_professional_design`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SizingError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Culvert sizing engine bound to one configuration.
#[derive(Debug, Clone)]
pub struct SizingEngine {
    config: SizingConfig,
    catalog: StandardSizeCatalog,
    table: CaliforniaTable,
}

impl SizingEngine {
    /// Build an engine from a config, validating it first.
    pub fn new(config: SizingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let catalog = StandardSizeCatalog::from_config(&config.catalog)?;
        Ok(Self {
            config,
            catalog,
            table: CaliforniaTable::standard(),
        })
    }

    /// Replace the built-in California table (regional tables, tests).
    #[must_use]
    pub fn with_table(mut self, table: CaliforniaTable) -> Self {
        self.table = table;
        self
    }

    pub fn config(&self) -> &SizingConfig {
        &self.config
    }

    pub fn catalog(&self) -> &StandardSizeCatalog {
        &self.catalog
    }

    pub fn table(&self) -> &CaliforniaTable {
        &self.table
    }

    /// Size a culvert from measurements plus optional transport and climate inputs.
    ///
    /// Fails fast with `SizingError::InvalidInput` on malformed inputs; no
    /// partial result is produced.
    pub fn size_culvert(
        &self,
        measurement: &StreamMeasurement,
        transport: Option<&TransportParameters>,
        climate: Option<&ClimateScenario>,
    ) -> Result<SizingResult, SizingError> {
        measurement.validate()?;
        if let Some(t) = transport {
            t.validate()?;
        }
        if let Some(c) = climate {
            c.validate()?;
        }

        // Area-based and table-based sizes are independent
        let area = calculate_hydraulic_area(
            measurement,
            self.config.hydraulics.end_opening_multiplier,
            &self.catalog,
        )?;
        let table_cell = self
            .table
            .lookup(area.average_top_width_m, area.average_depth_m);
        debug!(
            cross_section_m2 = area.cross_sectional_area_m2,
            end_opening_m2 = area.end_opening_area_m2,
            raw_mm = area.diameter_raw_mm,
            area_based_mm = area.area_based_size_mm,
            table = ?table_cell,
            "Hydraulic area and table lookup"
        );

        let mut requires_professional_design = table_cell.requires_professional_design();
        let base_size_mm = match table_cell {
            TableCell::Sized(table_mm) => area.area_based_size_mm.max(table_mm),
            TableCell::ProfessionalDesignRequired => area.diameter_raw_mm,
        };

        let transport_adj =
            apply_transport_adjustment(base_size_mm, transport, &self.catalog, &self.config.transport);
        if transport_adj.adjusted_size_mm > base_size_mm {
            debug!(
                index = transport_adj.transport_index,
                from_mm = base_size_mm,
                to_mm = transport_adj.adjusted_size_mm,
                "Transport bump applied"
            );
        }
        if transport_adj.bump_capped {
            info!(
                index = transport_adj.transport_index,
                base_mm = base_size_mm,
                "Transport bump required beyond the largest catalog size"
            );
            requires_professional_design = true;
        }

        let climate_adj = apply_climate_adjustment(
            transport_adj.adjusted_size_mm,
            area.end_opening_area_m2,
            climate,
            &self.catalog,
            &self.config.climate,
        )?;
        let recommended_size_mm = climate_adj.adjusted_size_mm;

        if recommended_size_mm >= self.catalog.professional_threshold() {
            requires_professional_design = true;
        }

        info!(
            recommended_mm = recommended_size_mm,
            base_mm = base_size_mm,
            transport_index = transport_adj.transport_index,
            climate_factor = climate_adj.climate_factor,
            professional = requires_professional_design,
            "Culvert sized"
        );

        Ok(SizingResult {
            average_top_width_m: area.average_top_width_m,
            average_depth_m: area.average_depth_m,
            cross_sectional_area_m2: area.cross_sectional_area_m2,
            end_opening_area_m2: area.end_opening_area_m2,
            area_based_diameter_raw_mm: area.diameter_raw_mm,
            area_based_size_mm: area.area_based_size_mm,
            table_based_size_mm: table_cell.size(),
            base_size_mm,
            transport_index: transport_adj.transport_index,
            transport_adjusted_size_mm: transport_adj.adjusted_size_mm,
            transport_recommendation: transport_adj.recommendation,
            transport_tips: transport_adj.tips,
            transport_bump_capped: transport_adj.bump_capped,
            climate_factor: climate_adj.climate_factor,
            climate_adjusted_area_m2: climate_adj.adjusted_area_m2,
            climate_adjusted_size_mm: climate_adj.adjusted_size_mm,
            recommended_size_mm,
            requires_professional_design,
        })
    }

    /// Convenience wrapper over a bundled `SizingInputs` document.
    pub fn size_inputs(&self, inputs: &SizingInputs) -> Result<SizingResult, SizingError> {
        self.size_culvert(
            &inputs.measurement,
            inputs.transport.as_ref(),
            inputs.climate.as_ref(),
        )
    }
}

impl Default for SizingEngine {
    fn default() -> Self {
        Self {
            config: SizingConfig::default(),
            catalog: StandardSizeCatalog::default(),
            table: CaliforniaTable::standard(),
        }
    }
}

/// Size a culvert with the built-in defaults.
pub fn size_culvert(
    measurement: &StreamMeasurement,
    transport: Option<&TransportParameters>,
    climate: Option<&ClimateScenario>,
) -> Result<SizingResult, SizingError> {
    SizingEngine::default().size_culvert(measurement, transport, climate)
}
