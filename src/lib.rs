//! Culvert Sizer: field culvert sizing for forest and resource roads
//!
//! Turns stream channel measurements, debris/sediment transport risk and a
//! climate projection into a recommended culvert diameter from the standard
//! catalog, flagging crossings that need professional engineering design.
//!
//! ## Architecture
//!
//! - **Sizing Engine**: pure, deterministic calculator (hydraulic area,
//!   California Method table, transport bump, climate uplift)
//! - **Config**: TOML-tunable catalog, coefficients and factors
//! - **Storage**: assessment records on sled, or in memory
//! - **Report**: Markdown / text / JSON renderings of an assessment

pub mod config;
pub mod types;
pub mod sizing_engine;
pub mod storage;
pub mod report;

// Re-export configuration
pub use config::SizingConfig;

// Re-export commonly used types
pub use types::{
    AssessmentRecord, ClimateScenario, ClimateScenarioTag, DebrisRating, GpsFix, SiteMetadata,
    SizingInputs, SizingResult, StreamMeasurement, TableCell, TransportParameters,
};

// Re-export the engine
pub use sizing_engine::{size_culvert, SizingEngine, SizingError, StandardSizeCatalog};

// Re-export storage
pub use storage::{AssessmentStore, InMemoryStore, SledAssessmentStore, StorageError};

// Re-export reporting
pub use report::{ReportError, ReportFormat};
