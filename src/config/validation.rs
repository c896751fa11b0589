//! Config validation: unknown-key detection with Levenshtein suggestions
//! and range checks.
//!
//! Two-pass parse approach: first deserialize raw TOML into `toml::Value`,
//! walk the key tree, compare against known field names, and emit warnings
//! with "did you mean?" suggestions. Then proceed with normal serde
//! deserialization. Warnings never break existing configs.

use std::collections::HashSet;

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

/// Returns the complete set of valid dotted key paths for ClosureConfig.
///
/// Maintained by hand to match the struct hierarchy in closure_config.rs.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [search]
        "search",
        "search.default_horizon_days",
        "search.default_max_subset_size",
        "search.time_limit_secs",
        "search.progress_step",
        // [approximation]
        "approximation",
        "approximation.top_n",
        "approximation.max_subset_size",
        // [data]
        "data",
        "data.path",
        "data.extra_well_columns",
        "data.extra_field_columns",
        "data.extra_flow_columns",
        "data.extra_profit_columns",
        // [server]
        "server",
        "server.addr",
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

/// Levenshtein edit distance, counted in characters.
fn levenshtein(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a.chars().count();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b_chars.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
///
/// Equal distances resolve to the alphabetically first key so the suggestion
/// does not depend on hash order.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|&k| (levenshtein(unknown, k), k))
        .filter(|&(dist, _)| dist <= 3)
        .min()
        .map(|(_, k)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// This does NOT fail on unknown keys; it only warns.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(), // parse errors are handled by serde later
    };

    let known = known_config_keys();
    let mut warnings = Vec::new();

    for key in walk_toml_keys(&value, "") {
        if !known.contains(key.as_str()) {
            let suggestion = suggest_correction(&key, &known);
            warnings.push(ValidationWarning {
                message: format!("Unknown config key '{key}'"),
                field: key,
                suggestion,
            });
        }
    }

    warnings
}

// ============================================================================
// Range Validation
// ============================================================================

/// Search-space size above which a default cap is flagged.
const LARGE_SUBSET_CAP: usize = 8;

/// Candidate count above which an approximation policy stops being cheap.
const LARGE_TOP_N: usize = 60;

/// Validate value ranges on a parsed ClosureConfig.
///
/// Returns (errors, warnings): errors are values that must prevent startup;
/// warnings are legal but likely to make searches slow or unbounded.
pub fn validate_ranges(config: &super::ClosureConfig) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let a = &config.approximation;
    if a.max_subset_size > a.top_n && a.top_n > 0 {
        errors.push(format!(
            "approximation.max_subset_size = {} cannot exceed approximation.top_n = {}",
            a.max_subset_size, a.top_n
        ));
    }

    let s = &config.search;
    if s.default_max_subset_size > LARGE_SUBSET_CAP {
        warnings.push(ValidationWarning {
            field: "search.default_max_subset_size".to_string(),
            message: format!(
                "search.default_max_subset_size = {} makes exhaustive searches grow very fast \
                 (typical range 1-{LARGE_SUBSET_CAP})",
                s.default_max_subset_size
            ),
            suggestion: None,
        });
    }
    if s.time_limit_secs == 0 {
        warnings.push(ValidationWarning {
            field: "search.time_limit_secs".to_string(),
            message: "search.time_limit_secs = 0 disables the time limit; large searches can run \
                      indefinitely"
                .to_string(),
            suggestion: None,
        });
    }
    if a.top_n > LARGE_TOP_N {
        warnings.push(ValidationWarning {
            field: "approximation.top_n".to_string(),
            message: format!(
                "approximation.top_n = {} is outside typical range (1-{LARGE_TOP_N})",
                a.top_n
            ),
            suggestion: None,
        });
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================
