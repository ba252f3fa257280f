//! Sizing Configuration Module
//!
//! Provides the sizing constants loaded from TOML files, so catalog sizes,
//! transport coefficients and climate factors can be tuned per jurisdiction
//! without rebuilding.
//!
//! ## Loading Order
//!
//! 1. `CULVERT_CONFIG` environment variable (path to TOML file)
//! 2. `culvert_config.toml` in the current working directory
//! 3. Built-in defaults (standard field-guide values)
//!
//! ## Usage
//!
//! The config is an explicit value handed to the engine, not a global:
//!
//! ```ignore
//! let engine = SizingEngine::new(SizingConfig::load())?;
//! let result = engine.size_culvert(&measurement, None, None)?;
//! ```

mod sizing_config;
pub mod defaults;
pub mod validation;

pub use sizing_config::*;
