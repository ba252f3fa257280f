//! Site metadata and the persisted assessment record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{SizingInputs, SizingResult};
use crate::sizing_engine::SizingError;

/// GPS fix captured at the crossing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Horizontal accuracy reported by the receiver (m)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_m: Option<f64>,
}

impl GpsFix {
    pub fn validate(&self) -> Result<(), SizingError> {
        if !self.latitude.is_finite() || !(-90.0..=90.0).contains(&self.latitude) {
            return Err(SizingError::InvalidInput(format!(
                "latitude {} is outside -90..90",
                self.latitude
            )));
        }
        if !self.longitude.is_finite() || !(-180.0..=180.0).contains(&self.longitude) {
            return Err(SizingError::InvalidInput(format!(
                "longitude {} is outside -180..180",
                self.longitude
            )));
        }
        if let Some(acc) = self.accuracy_m {
            if !acc.is_finite() || acc < 0.0 {
                return Err(SizingError::InvalidInput(format!(
                    "GPS accuracy must be zero or greater, got {acc}"
                )));
            }
        }
        Ok(())
    }
}

/// Free-form description of the crossing site. Opaque to the sizing engine.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SiteMetadata {
    pub site_name: String,
    #[serde(default)]
    pub road_name: Option<String>,
    #[serde(default)]
    pub location_description: Option<String>,
    #[serde(default)]
    pub gps: Option<GpsFix>,
    /// Photo file references (paths or URIs managed by the caller)
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub assessor: Option<String>,
}

impl SiteMetadata {
    pub fn validate(&self) -> Result<(), SizingError> {
        if self.site_name.trim().is_empty() {
            return Err(SizingError::InvalidInput("site name is required".to_string()));
        }
        if let Some(gps) = &self.gps {
            gps.validate()?;
        }
        Ok(())
    }
}

/// A completed field assessment: site, inputs and the engine's result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentRecord {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub site: SiteMetadata,
    pub inputs: SizingInputs,
    pub result: SizingResult,
}

impl AssessmentRecord {
    /// Build a record with an id derived from the creation time.
    pub fn new(
        site: SiteMetadata,
        inputs: SizingInputs,
        result: SizingResult,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Self::generate_id(created_at),
            created_at,
            site,
            inputs,
            result,
        }
    }

    /// `CUL-20240612-143005123` style identifier (millisecond resolution).
    pub fn generate_id(at: DateTime<Utc>) -> String {
        format!("CUL-{}", at.format("%Y%m%d-%H%M%S%3f"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_generate_id_format() {
        let at = Utc.with_ymd_and_hms(2024, 6, 12, 14, 30, 5).unwrap();
        assert_eq!(AssessmentRecord::generate_id(at), "CUL-20240612-143005000");
    }

    #[test]
    fn test_gps_ranges() {
        let ok = GpsFix { latitude: 49.25, longitude: -123.1, accuracy_m: Some(4.0) };
        assert!(ok.validate().is_ok());
        let bad_lat = GpsFix { latitude: 91.0, ..ok };
        assert!(bad_lat.validate().is_err());
        let bad_lon = GpsFix { longitude: -181.0, ..ok };
        assert!(bad_lon.validate().is_err());
        let bad_acc = GpsFix { accuracy_m: Some(-1.0), ..ok };
        assert!(bad_acc.validate().is_err());
    }

    #[test]
    fn test_site_requires_name() {
        let site = SiteMetadata::default();
        assert!(site.validate().is_err());
        let site = SiteMetadata { site_name: "Km 12.4 crossing".into(), ..Default::default() };
        assert!(site.validate().is_ok());
    }
}
