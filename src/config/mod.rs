//! Dashboard Configuration Module
//!
//! Data sources, alignment threshold, forecast control ranges and the bind
//! address, loaded from TOML.
//!
//! ## Loading Order
//!
//! 1. `EPICAST_CONFIG` environment variable (path to TOML file)
//! 2. `epicast.toml` in the current working directory
//! 3. Built-in defaults
//!
//! ## Usage
//!
//! Call `config::init()` once at startup, then `config::get()` anywhere:
//!
//! ```ignore
//! // In main():
//! config::init(DashboardConfig::load());
//!
//! // Anywhere in the codebase:
//! let threshold = config::get().data.day_zero_threshold;
//! ```

mod dashboard_config;
pub mod defaults;
pub mod validation;

pub use dashboard_config::*;

use std::sync::OnceLock;

/// Global dashboard configuration, initialized once at startup.
static DASHBOARD_CONFIG: OnceLock<DashboardConfig> = OnceLock::new();

/// Initialize the global dashboard configuration.
///
/// Later calls are ignored with a warning.
pub fn init(config: DashboardConfig) {
    if DASHBOARD_CONFIG.set(config).is_err() {
        tracing::warn!("config::init() called more than once, ignoring");
    }
}

/// Get a reference to the global dashboard configuration.
///
/// Panics if `init()` has not been called: a missing config is a startup bug.
pub fn get() -> &'static DashboardConfig {
    DASHBOARD_CONFIG
        .get()
        .expect("config::get() called before config::init()")
}

/// Check whether the config has been initialized.
pub fn is_initialized() -> bool {
    DASHBOARD_CONFIG.get().is_some()
}
