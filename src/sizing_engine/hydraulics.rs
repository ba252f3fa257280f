//! Hydraulic area sizing from trapezoidal channel measurements

use std::f64::consts::PI;

use super::{SizingError, StandardSizeCatalog};
use crate::types::StreamMeasurement;

/// Channel geometry and the area-based culvert size derived from it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HydraulicArea {
    pub average_top_width_m: f64,
    pub average_depth_m: f64,
    /// Trapezoidal channel cross-section (m²)
    pub cross_sectional_area_m2: f64,
    /// Required culvert end-opening area (m²)
    pub end_opening_area_m2: f64,
    /// Diameter of a circle with the end-opening area, ceiled to whole mm
    pub diameter_raw_mm: u32,
    /// `diameter_raw_mm` rounded up to the catalog
    pub area_based_size_mm: u32,
}

/// Diameter (mm, ceiled) of a circular opening with the given area (m²).
pub fn diameter_for_area(area_m2: f64) -> u32 {
    let radius_m = (area_m2 / PI).sqrt();
    let diameter_mm = (radius_m * 2.0 * 1000.0).ceil();
    // Channel areas are a few m² at most; the diameter is far below u32::MAX
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let diameter_mm = diameter_mm.max(0.0) as u32;
    diameter_mm
}

/// Compute areas and the area-based size for a validated measurement.
pub fn calculate_hydraulic_area(
    measurement: &StreamMeasurement,
    end_opening_multiplier: f64,
    catalog: &StandardSizeCatalog,
) -> Result<HydraulicArea, SizingError> {
    measurement.validate()?;

    let average_top_width_m = measurement.average_top_width();
    let average_depth_m = measurement.average_depth();

    let cross_sectional_area_m2 =
        ((average_top_width_m + measurement.bottom_width_m) / 2.0) * average_depth_m;
    let end_opening_area_m2 = cross_sectional_area_m2 * end_opening_multiplier;

    let diameter_raw_mm = diameter_for_area(end_opening_area_m2);
    let area_based_size_mm = catalog.round_up_to_standard(f64::from(diameter_raw_mm))?;

    Ok(HydraulicArea {
        average_top_width_m,
        average_depth_m,
        cross_sectional_area_m2,
        end_opening_area_m2,
        diameter_raw_mm,
        area_based_size_mm,
    })
}
