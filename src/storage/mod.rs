//! Assessment Storage
//!
//! Persists completed assessments (site metadata, inputs and the sizing
//! result) for offline field use. The sizing engine never touches storage;
//! callers hand it finished records.

mod assessments;
pub mod persistence;

pub use assessments::{SledAssessmentStore, StorageStats};
pub use persistence::{AssessmentStore, InMemoryStore, StorageError};
