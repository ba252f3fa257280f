//! System-wide default constants.
//!
//! Every tunable default in `SizingConfig` is defined here so the TOML
//! defaults, validation messages and tests agree on the same numbers.

// ============================================================================
// Config Loading
// ============================================================================

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "CULVERT_CONFIG";

/// Config file looked up in the current working directory.
pub const LOCAL_CONFIG_FILE: &str = "culvert_config.toml";

// ============================================================================
// Standard Size Catalog
// ============================================================================

/// Permitted culvert diameters (mm), ascending.
pub const STANDARD_SIZES_MM: [u32; 15] = [
    300, 400, 500, 600, 700, 800, 900, 1000, 1200, 1400, 1500, 1600, 1800, 1900, 2000,
];

/// Diameter at or above which licensed engineering review is mandatory (mm).
pub const PROFESSIONAL_THRESHOLD_MM: u32 = 2000;

// ============================================================================
// Hydraulics
// ============================================================================

/// End-opening area as a multiple of the channel cross-section.
pub const END_OPENING_MULTIPLIER: f64 = 3.0;

// ============================================================================
// Transport / Debris
// ============================================================================

/// Debris rating scores (low / medium / high).
pub const DEBRIS_SCORE_LOW: f64 = 1.0;
pub const DEBRIS_SCORE_MEDIUM: f64 = 2.0;
pub const DEBRIS_SCORE_HIGH: f64 = 3.0;

/// Index weight applied to the debris score.
pub const DEBRIS_WEIGHT: f64 = 1.0;

/// Index contribution per cm of sediment wedge.
pub const SEDIMENT_COEFFICIENT_PER_CM: f64 = 0.05;

/// Index contribution per m of log diameter.
pub const LOG_COEFFICIENT_PER_M: f64 = 5.0;

/// Transport index at or above which the pipe is bumped one catalog size.
pub const TRANSPORT_BUMP_THRESHOLD: f64 = 4.0;

pub const TRANSPORT_RECOMMENDATION: &str =
    "High debris/sediment transport potential: culvert upsized one standard size";

pub const TRANSPORT_TIPS: [&str; 4] = [
    "Bevel the inlet to improve debris passage",
    "Armour the outlet with a rock apron to control scour",
    "Install a debris rack or trash barrier upstream of the inlet",
    "Schedule inlet inspection and cleanout after each major storm",
];

// ============================================================================
// Climate Projection
// ============================================================================

/// Area uplift for the near-term (2050s) projection.
pub const NEAR_TERM_FACTOR: f64 = 1.10;

/// Area uplift for the long-term (2080s) projection.
pub const LONG_TERM_FACTOR: f64 = 1.20;

/// Above this a climate factor is legal but flagged as suspicious.
pub const CLIMATE_FACTOR_SUSPICIOUS: f64 = 2.0;

// ============================================================================
// Storage
// ============================================================================

/// Default sled database directory for saved assessments.
pub const DEFAULT_DB_PATH: &str = "./data/assessments";

/// Upper bound on records held by the in-memory store.
pub const IN_MEMORY_MAX_RECORDS: usize = 1000;
