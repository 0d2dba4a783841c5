//! Config validation: unknown-key detection with Levenshtein suggestions
//! and plausibility checks on the parsed values.
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

/// Returns the complete set of valid dotted key paths for DashboardConfig.
///
/// Maintained by hand to match the struct hierarchy in dashboard_config.rs.
pub fn known_config_keys() -> HashSet<&'static str> {
    let keys: &[&str] = &[
        // [data]
        "data",
        "data.infected_url",
        "data.deaths_url",
        "data.data_dir",
        "data.population_path",
        "data.day_zero_threshold",
        "data.min_observations",
        "data.refresh_interval_secs",
        "data.http_timeout_secs",
        "data.source_update_hour_utc",
        "data.source_update_minute_utc",
        // [forecast]
        "forecast",
        "forecast.day_of_control",
        "forecast.min_day_of_control",
        "forecast.max_day_of_control",
        "forecast.days_to_recover",
        "forecast.min_days_to_recover",
        "forecast.max_days_to_recover",
        "forecast.ratio_avg_days",
        "forecast.unrecorded_factor",
        "forecast.min_unrecorded_factor",
        "forecast.max_unrecorded_factor",
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

fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Suggest the closest known key for an unknown key, if within edit distance 3.
pub fn suggest_correction(unknown: &str, known: &HashSet<&str>) -> Option<String> {
    known
        .iter()
        .map(|k| (*k, levenshtein(unknown, k)))
        .filter(|(_, dist)| *dist <= 3)
        .min_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)))
        .map(|(k, _)| k.to_string())
}

// ============================================================================
// Unknown Key Validation (entry point)
// ============================================================================

/// Parse a raw TOML string and return warnings for any unknown config keys.
///
/// Only warns; parse errors are reported later by serde.
pub fn validate_unknown_keys(raw_toml: &str) -> Vec<ValidationWarning> {
    let value: toml::Value = match raw_toml.parse() {
        Ok(v) => v,
        Err(_) => return Vec::new(),
    };

    let known = known_config_keys();
    walk_toml_keys(&value, "")
        .into_iter()
        .filter(|key| !known.contains(key.as_str()))
        .map(|key| ValidationWarning {
            suggestion: suggest_correction(&key, &known),
            message: format!("Unknown config key '{key}'"),
            field: key,
        })
        .collect()
}

// ============================================================================
// Plausibility Ranges
// ============================================================================

/// Validate value ranges on a parsed DashboardConfig.
///
/// Returns (errors, warnings). Errors are values the model cannot run with;
/// warnings are legal but unusual.
pub fn validate_ranges(config: &super::DashboardConfig) -> (Vec<String>, Vec<ValidationWarning>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let f = &config.forecast;
    if f.min_day_of_control <= 0 {
        errors.push(format!(
            "forecast.min_day_of_control = {} must be > 0 (day zero is the first aligned day)",
            f.min_day_of_control
        ));
    }

    if config.data.population_path.as_os_str().is_empty() {
        errors.push("data.population_path must not be empty".to_string());
    }

    if config.server.addr.parse::<std::net::SocketAddr>().is_err() {
        errors.push(format!(
            "server.addr = '{}' is not a socket address (host:port)",
            config.server.addr
        ));
    }

    if config.data.day_zero_threshold == 0 {
        warnings.push(ValidationWarning {
            field: "data.day_zero_threshold".to_string(),
            message: "data.day_zero_threshold = 0 aligns every country on its first reported case"
                .to_string(),
            suggestion: None,
        });
    }

    if config.data.refresh_interval_secs < 60 {
        warnings.push(ValidationWarning {
            field: "data.refresh_interval_secs".to_string(),
            message: format!(
                "data.refresh_interval_secs = {} polls upstream more than once a minute",
                config.data.refresh_interval_secs
            ),
            suggestion: None,
        });
    }

    if f.ratio_avg_days > 30 {
        warnings.push(ValidationWarning {
            field: "forecast.ratio_avg_days".to_string(),
            message: format!(
                "forecast.ratio_avg_days = {} smooths over more than a month of growth",
                f.ratio_avg_days
            ),
            suggestion: None,
        });
    }

    (errors, warnings)
}

// ============================================================================
// Tests
// ============================================================================
