//! Sizing engine inputs and output record

use serde::{Deserialize, Serialize};

use super::{ClimateScenario, StreamMeasurement, TransportParameters};

/// One cell of the California Method table, or the outcome of a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "mm")]
pub enum TableCell {
    /// Standard culvert diameter (mm)
    Sized(u32),
    /// Stream geometry is beyond standard sizing; a Q100 design is needed
    ProfessionalDesignRequired,
}

impl TableCell {
    pub fn size(self) -> Option<u32> {
        match self {
            TableCell::Sized(mm) => Some(mm),
            TableCell::ProfessionalDesignRequired => None,
        }
    }

    pub fn requires_professional_design(self) -> bool {
        matches!(self, TableCell::ProfessionalDesignRequired)
    }
}

/// Everything the engine needs for one calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingInputs {
    pub measurement: StreamMeasurement,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transport: Option<TransportParameters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub climate: Option<ClimateScenario>,
}

/// Output of a single culvert sizing calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingResult {
    pub average_top_width_m: f64,
    pub average_depth_m: f64,
    pub cross_sectional_area_m2: f64,
    pub end_opening_area_m2: f64,
    /// Unrounded diameter from the end-opening area (mm)
    pub area_based_diameter_raw_mm: u32,
    /// Area-based diameter rounded to the catalog (mm)
    pub area_based_size_mm: u32,
    /// California Method diameter; `None` when the table demands professional design
    pub table_based_size_mm: Option<u32>,
    /// Size before transport and climate adjustment (mm)
    pub base_size_mm: u32,
    pub transport_index: f64,
    pub transport_adjusted_size_mm: u32,
    pub transport_recommendation: Option<String>,
    #[serde(default)]
    pub transport_tips: Vec<String>,
    /// Transport called for a larger pipe but the base size was already the catalog maximum
    #[serde(default)]
    pub transport_bump_capped: bool,
    pub climate_factor: f64,
    pub climate_adjusted_area_m2: Option<f64>,
    pub climate_adjusted_size_mm: u32,
    pub recommended_size_mm: u32,
    pub requires_professional_design: bool,
}

impl SizingResult {
    pub fn table_cell(&self) -> TableCell {
        match self.table_based_size_mm {
            Some(mm) => TableCell::Sized(mm),
            None => TableCell::ProfessionalDesignRequired,
        }
    }

    pub fn has_transport_bump(&self) -> bool {
        self.transport_adjusted_size_mm > self.base_size_mm
    }

    pub fn has_climate_uplift(&self) -> bool {
        self.climate_factor > 1.0
    }
}
