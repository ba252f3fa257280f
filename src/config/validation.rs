//! Config validation: unknown-key detection with Levenshtein suggestions
//! and physical range checks for the sizing constants.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

use super::defaults;

/// A non-fatal config warning (typo, suspicious value).
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(ref s) = self.suggestion {
            write!(f, " (did you mean '{s}'?)")?;
        }
        Ok(())
    }
}

// ============================================================================
// Known Config Keys
// ============================================================================

/// Returns the complete set of valid dotted key paths for SizingConfig.
///
/// Maintained by hand to match the struct hierarchy in sizing_config.rs.
/// Any new field added to SizingConfig must be added here too.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [catalog]
        "catalog",
        "catalog.sizes_mm",
        "catalog.professional_threshold_mm",
        // [hydraulics]
        "hydraulics",
        "hydraulics.end_opening_multiplier",
        // [transport]
        "transport",
        "transport.debris_score_low",
        "transport.debris_score_medium",
        "transport.debris_score_high",
        "transport.debris_weight",
        "transport.sediment_coefficient_per_cm",
        "transport.log_coefficient_per_m",
        "transport.bump_threshold",
        // [climate]
        "climate",
        "climate.near_term_factor",
        "climate.long_term_factor",
        // [storage]
        "storage",
        "storage.db_path",
    ];
    keys.iter().copied().collect()
}

// ============================================================================
// TOML Key Walking
// ============================================================================

/// Recursively walks a `toml::Value` tree and collects all dotted key paths.
///
/// For example, a table `{ a = { b = 1, c = 2 } }` yields:
/// `["a", "a.b", "a.c"]`
pub fn walk_toml_keys(value: &toml::Value, prefix: &str) -> Vec<String> {
    let mut keys = Vec::new();
    if let Some(table) = value.as_table() {
        for (k, v) in table {
            let path = if prefix.is_empty() {
                k.clone()
            } else {
                format!("{prefix}.{k}")
            };
            keys.push(path.clone());
            if v.is_table() {
                keys.extend(walk_toml_keys(v, &path));
            }
        }
    }
    keys
}

// ============================================================================
// Levenshtein Distance
// ============================================================================

/// Edit distance between two strings, counted in chars.
fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b_chars.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diag = row[0];
        row[0] = i + 1;
        for (j, cb) in b_chars.iter().enumerate() {
            let above = row[j + 1];
            let substitution = diag + usize::from(ca != *cb);
            row[j + 1] = substitution.min(above + 1).min(row[j] + 1);
            diag = above;
        }
    }

    row[b_chars.len()]
}

/// Closest known key within edit distance 3, if any. Ties go to the
/// lexically smallest key so suggestions are stable.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|k| (levenshtein(unknown, k), *k))
        .filter(|(dist, _)| *dist <= 3)
        .min()
        .map(|(_, k)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// Unknown keys never fail the load; serde ignores them after the warning.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // serde reports the syntax error
    };

    let known = known_config_keys();
    let found = walk_toml_keys(&value, "");
    let mut warnings = Vec::new();

    for key in &found {
        if !known.contains(key.as_str()) {
            let suggestion = suggest_correction(key, &known);
            let message = format!("Unknown config key '{key}'");
            warnings.push(ValidationWarning {
                field: key.clone(),
                message,
                suggestion,
            });
        }
    }

    warnings
}

// ============================================================================
// Physical Range Validation
// ============================================================================

/// Validate physical ranges on a parsed SizingConfig.
///
/// Returns (errors, warnings): errors are impossible values that must
/// prevent use of the config; warnings are legal but unusual.
pub fn validate_physical_ranges(
    config: &super::SizingConfig,
) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    // Field culverts smaller than 100 mm or larger than 10 m are not pipes
    for &size in &config.catalog.sizes_mm {
        if !(100..=10_000).contains(&size) {
            errors.push(format!(
                "catalog.sizes_mm entry {size} is outside physical range (100-10000 mm)"
            ));
        }
    }

    if let Some(&largest) = config.catalog.sizes_mm.last() {
        if config.catalog.professional_threshold_mm > largest {
            warnings.push(ValidationWarning {
                field: "catalog.professional_threshold_mm".to_string(),
                message: format!(
                    "professional_threshold_mm = {} exceeds the largest catalog size ({largest} mm); \
                     only out-of-table fallbacks can reach it",
                    config.catalog.professional_threshold_mm
                ),
                suggestion: None,
            });
        }
    }

    let m = config.hydraulics.end_opening_multiplier;
    if m.is_finite() && !(1.0..=10.0).contains(&m) {
        warnings.push(ValidationWarning {
            field: "hydraulics.end_opening_multiplier".to_string(),
            message: format!("end_opening_multiplier = {m:.2} is outside typical range (1-10)"),
            suggestion: None,
        });
    }

    for (value, field) in [
        (config.climate.near_term_factor, "climate.near_term_factor"),
        (config.climate.long_term_factor, "climate.long_term_factor"),
    ] {
        if value.is_finite() && value > defaults::CLIMATE_FACTOR_SUSPICIOUS {
            warnings.push(ValidationWarning {
                field: field.to_string(),
                message: format!(
                    "{field} = {value:.2} more than doubles the design area (typical 1.0-{:.1})",
                    defaults::CLIMATE_FACTOR_SUSPICIOUS
                ),
                suggestion: None,
            });
        }
    }

    if config.climate.long_term_factor < config.climate.near_term_factor {
        warnings.push(ValidationWarning {
            field: "climate.long_term_factor".to_string(),
            message: format!(
                "long_term_factor ({:.2}) is smaller than near_term_factor ({:.2})",
                config.climate.long_term_factor, config.climate.near_term_factor
            ),
            suggestion: None,
        });
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================
