//! Shared data structures for culvert sizing
//!
//! - StreamMeasurement: channel widths and depths from the field
//! - TransportParameters: debris rating, sediment wedge, log diameter
//! - ClimateScenario: projection tag or custom uplift factor
//! - SizingInputs / SizingResult: the engine's input and output records
//! - SiteMetadata / AssessmentRecord: what gets persisted and reported

mod measurement;
mod transport;
mod climate;
mod result;
mod assessment;

pub(crate) use measurement::check_positive;

pub use measurement::*;
pub use transport::*;
pub use climate::*;
pub use result::*;
pub use assessment::*;
