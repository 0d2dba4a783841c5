//! System-wide default constants.
//!
//! Every `DashboardConfig` default reads from here, so the numbers live in
//! one place. Grouped by subsystem for easy discovery.

// ============================================================================
// Alignment
// ============================================================================

/// Day zero is the first day with strictly more confirmed cases than this.
pub const DAY_ZERO_THRESHOLD: u64 = 20;

/// Countries with fewer observations from day zero onward are dropped.
pub const MIN_ALIGNED_OBSERVATIONS: usize = 5;

// ============================================================================
// Forecast engine
// ============================================================================

/// Engine default recovery window (days).
pub const DEFAULT_DAYS_TO_RECOVER: usize = 14;

/// Engine default EWMA span for the initial growth ratio (days).
pub const DEFAULT_RATIO_AVG_DAYS: usize = 4;

// ============================================================================
// Forecast API (dashboard controls)
// ============================================================================

/// Day of control offered when the request does not name one.
pub const API_DAY_OF_CONTROL: i64 = 120;

pub const API_DAY_OF_CONTROL_MIN: i64 = 60;
pub const API_DAY_OF_CONTROL_MAX: i64 = 180;

/// Recovery window offered when the request does not name one (days).
pub const API_DAYS_TO_RECOVER: usize = 15;

pub const API_DAYS_TO_RECOVER_MIN: usize = 5;
pub const API_DAYS_TO_RECOVER_MAX: usize = 25;

/// Assumed ratio of real to confirmed cases.
pub const API_UNRECORDED_FACTOR: f64 = 3.0;

pub const API_UNRECORDED_FACTOR_MIN: f64 = 1.0;
pub const API_UNRECORDED_FACTOR_MAX: f64 = 5.0;

/// Per-capita figures are "per this many inhabitants".
pub const PER_CAPITA_BASE: f64 = 100_000.0;

/// Countries plotted when a request does not name any.
pub const DEFAULT_COUNTRIES: &[&str] = &["Norway", "Denmark"];

/// Upper end of the map colour scale (infected per 100 000).
pub const MAP_SCALE_MAX: f64 = 100.0;

// ============================================================================
// Data acquisition
// ============================================================================

pub const INFECTED_SOURCE_GLOBAL: &str = "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series/time_series_covid19_confirmed_global.csv";

pub const DEATHS_SOURCE_GLOBAL: &str = "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_time_series/time_series_covid19_deaths_global.csv";

/// File names looked up inside a local data directory.
pub const INFECTED_FILE_NAME: &str = "time_series_covid19_confirmed_global.csv";
pub const DEATHS_FILE_NAME: &str = "time_series_covid19_deaths_global.csv";

pub const POPULATION_PATH: &str = "resources/world_population.csv";

/// HTTP client timeout for source downloads (seconds).
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// How often the refresher rebuilds the snapshot (seconds). 600 = 10 minutes.
pub const REFRESH_INTERVAL_SECS: u64 = 600;

/// Upstream publishes once a day at this UTC time.
pub const SOURCE_UPDATE_HOUR_UTC: u32 = 1;
pub const SOURCE_UPDATE_MINUTE_UTC: u32 = 0;

// ============================================================================
// Server
// ============================================================================

pub const SERVER_ADDR: &str = "0.0.0.0:8050";
