//! Dashboard Configuration - data sources, model defaults and server settings
//!
//! Each struct implements `Default` with the values in `config::defaults`, so
//! a missing or partial `epicast.toml` behaves exactly like the built-ins.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::defaults;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for a dashboard deployment.
///
/// Load with `DashboardConfig::load()` which searches:
/// 1. `$EPICAST_CONFIG` env var
/// 2. `./epicast.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Source data and refresh settings
    #[serde(default)]
    pub data: DataConfig,

    /// Forecast defaults and accepted request ranges
    #[serde(default)]
    pub forecast: ForecastConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

impl DashboardConfig {
    /// Load configuration using the standard search order:
    /// 1. `$EPICAST_CONFIG` environment variable
    /// 2. `./epicast.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var("EPICAST_CONFIG") {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded dashboard config from EPICAST_CONFIG");
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from EPICAST_CONFIG, falling back");
                    }
                }
            } else {
                warn!(path = %path, "EPICAST_CONFIG points to non-existent file, falling back");
            }
        }

        let local = PathBuf::from("epicast.toml");
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded dashboard config from ./epicast.toml");
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./epicast.toml, using defaults");
                }
            }
        }

        info!("No epicast.toml found, using built-in defaults");
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, err) => ConfigError::Parse(path.to_path_buf(), err),
            other => other,
        })
    }

    /// Parse and validate a TOML document. Unknown keys are logged, not fatal.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in &super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::from("<inline>"), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate ranges and internal consistency.
    ///
    /// Rules:
    /// - Request ranges must be ordered (min <= default <= max)
    /// - Intervals, spans and windows must be > 0
    /// - The daily update time must be a valid wall-clock time
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let d = &self.data;
        if d.min_observations == 0 {
            errors.push("data.min_observations must be > 0".to_string());
        }
        if d.refresh_interval_secs == 0 {
            errors.push("data.refresh_interval_secs must be > 0".to_string());
        }
        if d.http_timeout_secs == 0 {
            errors.push("data.http_timeout_secs must be > 0".to_string());
        }
        if d.source_update_hour_utc > 23 || d.source_update_minute_utc > 59 {
            errors.push(format!(
                "data.source_update time {:02}:{:02} is not a valid UTC time",
                d.source_update_hour_utc, d.source_update_minute_utc
            ));
        }

        let f = &self.forecast;
        if f.ratio_avg_days == 0 {
            errors.push("forecast.ratio_avg_days must be > 0".to_string());
        }
        Self::check_range(
            f.min_day_of_control as f64,
            f.day_of_control as f64,
            f.max_day_of_control as f64,
            "forecast.day_of_control",
            &mut errors,
        );
        Self::check_range(
            f.min_days_to_recover as f64,
            f.days_to_recover as f64,
            f.max_days_to_recover as f64,
            "forecast.days_to_recover",
            &mut errors,
        );
        if f.min_days_to_recover == 0 {
            errors.push("forecast.min_days_to_recover must be > 0".to_string());
        }
        Self::check_range(
            f.min_unrecorded_factor,
            f.unrecorded_factor,
            f.max_unrecorded_factor,
            "forecast.unrecorded_factor",
            &mut errors,
        );
        if f.min_unrecorded_factor <= 0.0 {
            errors.push("forecast.min_unrecorded_factor must be > 0".to_string());
        }

        let (range_errors, range_warnings) = super::validation::validate_ranges(self);
        errors.extend(range_errors);
        for w in &range_warnings {
            warn!("{}", w);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_range(min: f64, value: f64, max: f64, name: &str, errors: &mut Vec<String>) {
        if !min.is_finite() || !value.is_finite() || !max.is_finite() {
            errors.push(format!(
                "{name}: values must be finite (got min={min}, default={value}, max={max})"
            ));
            return;
        }
        if !(min <= value && value <= max) {
            errors.push(format!(
                "{name}: default ({value}) must lie within [{min}, {max}]"
            ));
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Data Config
// ============================================================================

/// Where the case data comes from and how it is shaped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Confirmed-cases CSV URL
    #[serde(default = "default_infected_url")]
    pub infected_url: String,

    /// Deaths CSV URL
    #[serde(default = "default_deaths_url")]
    pub deaths_url: String,

    /// Read the CSVs from this directory instead of downloading them
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Population table CSV
    #[serde(default = "default_population_path")]
    pub population_path: PathBuf,

    /// Day zero threshold (confirmed cases)
    #[serde(default = "default_day_zero_threshold")]
    pub day_zero_threshold: u64,

    /// Minimum observations from day zero onward
    #[serde(default = "default_min_observations")]
    pub min_observations: usize,

    /// Snapshot refresh period (seconds)
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,

    /// Download timeout (seconds)
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// Upstream daily publication time, hour (UTC)
    #[serde(default = "default_source_update_hour")]
    pub source_update_hour_utc: u32,

    /// Upstream daily publication time, minute (UTC)
    #[serde(default = "default_source_update_minute")]
    pub source_update_minute_utc: u32,
}

fn default_infected_url() -> String {
    defaults::INFECTED_SOURCE_GLOBAL.to_string()
}
fn default_deaths_url() -> String {
    defaults::DEATHS_SOURCE_GLOBAL.to_string()
}
fn default_population_path() -> PathBuf {
    PathBuf::from(defaults::POPULATION_PATH)
}
fn default_day_zero_threshold() -> u64 { defaults::DAY_ZERO_THRESHOLD }
fn default_min_observations() -> usize { defaults::MIN_ALIGNED_OBSERVATIONS }
fn default_refresh_interval() -> u64 { defaults::REFRESH_INTERVAL_SECS }
fn default_http_timeout() -> u64 { defaults::HTTP_TIMEOUT_SECS }
fn default_source_update_hour() -> u32 { defaults::SOURCE_UPDATE_HOUR_UTC }
fn default_source_update_minute() -> u32 { defaults::SOURCE_UPDATE_MINUTE_UTC }

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            infected_url: default_infected_url(),
            deaths_url: default_deaths_url(),
            data_dir: None,
            population_path: default_population_path(),
            day_zero_threshold: default_day_zero_threshold(),
            min_observations: default_min_observations(),
            refresh_interval_secs: default_refresh_interval(),
            http_timeout_secs: default_http_timeout(),
            source_update_hour_utc: default_source_update_hour(),
            source_update_minute_utc: default_source_update_minute(),
        }
    }
}

// ============================================================================
// Forecast Config
// ============================================================================

/// Defaults and accepted ranges for forecast requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    #[serde(default = "default_day_of_control")]
    pub day_of_control: i64,
    #[serde(default = "default_min_day_of_control")]
    pub min_day_of_control: i64,
    #[serde(default = "default_max_day_of_control")]
    pub max_day_of_control: i64,

    #[serde(default = "default_days_to_recover")]
    pub days_to_recover: usize,
    #[serde(default = "default_min_days_to_recover")]
    pub min_days_to_recover: usize,
    #[serde(default = "default_max_days_to_recover")]
    pub max_days_to_recover: usize,

    /// EWMA span for the initial growth ratio
    #[serde(default = "default_ratio_avg_days")]
    pub ratio_avg_days: usize,

    /// Real cases per confirmed case
    #[serde(default = "default_unrecorded_factor")]
    pub unrecorded_factor: f64,
    #[serde(default = "default_min_unrecorded_factor")]
    pub min_unrecorded_factor: f64,
    #[serde(default = "default_max_unrecorded_factor")]
    pub max_unrecorded_factor: f64,
}

fn default_day_of_control() -> i64 { defaults::API_DAY_OF_CONTROL }
fn default_min_day_of_control() -> i64 { defaults::API_DAY_OF_CONTROL_MIN }
fn default_max_day_of_control() -> i64 { defaults::API_DAY_OF_CONTROL_MAX }
fn default_days_to_recover() -> usize { defaults::API_DAYS_TO_RECOVER }
fn default_min_days_to_recover() -> usize { defaults::API_DAYS_TO_RECOVER_MIN }
fn default_max_days_to_recover() -> usize { defaults::API_DAYS_TO_RECOVER_MAX }
fn default_ratio_avg_days() -> usize { defaults::DEFAULT_RATIO_AVG_DAYS }
fn default_unrecorded_factor() -> f64 { defaults::API_UNRECORDED_FACTOR }
fn default_min_unrecorded_factor() -> f64 { defaults::API_UNRECORDED_FACTOR_MIN }
fn default_max_unrecorded_factor() -> f64 { defaults::API_UNRECORDED_FACTOR_MAX }

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            day_of_control: default_day_of_control(),
            min_day_of_control: default_min_day_of_control(),
            max_day_of_control: default_max_day_of_control(),
            days_to_recover: default_days_to_recover(),
            min_days_to_recover: default_min_days_to_recover(),
            max_days_to_recover: default_max_days_to_recover(),
            ratio_avg_days: default_ratio_avg_days(),
            unrecorded_factor: default_unrecorded_factor(),
            min_unrecorded_factor: default_min_unrecorded_factor(),
            max_unrecorded_factor: default_max_unrecorded_factor(),
        }
    }
}

// ============================================================================
// Server Config
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP API
    #[serde(default = "default_server_addr")]
    pub addr: String,
}

fn default_server_addr() -> String {
    defaults::SERVER_ADDR.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        assert!(DashboardConfig::default().validate().is_ok());
    }

    #[test]
    fn test_empty_toml_produces_defaults() {
        let config = DashboardConfig::from_toml_str("").unwrap();
        assert_eq!(config, DashboardConfig::default());
        assert_eq!(config.data.day_zero_threshold, 20);
        assert_eq!(config.forecast.day_of_control, 120);
    }

    #[test]
    fn test_partial_toml_override() {
        let config = DashboardConfig::from_toml_str(
            r#"
[data]
day_zero_threshold = 100
data_dir = "/var/lib/epicast"

[forecast]
unrecorded_factor = 2.0
"#,
        )
        .unwrap();
        assert_eq!(config.data.day_zero_threshold, 100);
        assert_eq!(config.data.data_dir, Some(PathBuf::from("/var/lib/epicast")));
        assert_eq!(config.data.min_observations, 5);
        assert!((config.forecast.unrecorded_factor - 2.0).abs() < f64::EPSILON);
        assert_eq!(config.server.addr, "0.0.0.0:8050");
    }

    #[test]
    fn test_validation_catches_default_outside_range() {
        let mut config = DashboardConfig::default();
        config.forecast.day_of_control = 200;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("forecast.day_of_control"));
    }

    #[test]
    fn test_validation_catches_zero_interval() {
        let mut config = DashboardConfig::default();
        config.data.refresh_interval_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_catches_bad_update_time() {
        let mut config = DashboardConfig::default();
        config.data.source_update_hour_utc = 24;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_catches_non_finite_factor() {
        let mut config = DashboardConfig::default();
        config.forecast.unrecorded_factor = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_roundtrip_toml() {
        let config = DashboardConfig::default();
        let text = config.to_toml().unwrap();
        let parsed = DashboardConfig::from_toml_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("epicast.toml");
        std::fs::write(&path, "[server]\naddr = \"127.0.0.1:9000\"\n").unwrap();
        let config = DashboardConfig::load_from_file(&path).unwrap();
        assert_eq!(config.server.addr, "127.0.0.1:9000");
    }

    #[test]
    fn test_load_from_missing_file_is_io_error() {
        let err = DashboardConfig::load_from_file(Path::new("/nonexistent/epicast.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_, _)));
    }
}
