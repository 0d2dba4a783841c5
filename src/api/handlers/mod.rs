//! API route handlers
//!
//! Request handling for the v2 endpoints:
//! - Liveness, snapshot status and the country list
//! - Aligned infected/deaths series, case fatality rate and the map frame
//! - Scenario forecasts

mod forecast;
mod series;
mod status;

pub use forecast::*;
pub use series::*;
pub use status::*;

use axum::response::Response;
use chrono::{DateTime, NaiveTime, Utc};
use std::sync::Arc;

use super::envelope::ApiErrorResponse;
use crate::config::{defaults, DashboardConfig, ForecastConfig};
use crate::snapshot::{DataSnapshot, SnapshotStore};

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers
#[derive(Clone)]
pub struct DashboardState {
    /// Current data snapshot, swapped by the refresher
    pub snapshots: Arc<SnapshotStore>,
    /// Forecast defaults and accepted ranges
    pub forecast: Arc<ForecastConfig>,
    /// Daily upstream publication time (UTC)
    pub source_update: NaiveTime,
    pub started_at: DateTime<Utc>,
}

impl DashboardState {
    pub fn new(snapshots: Arc<SnapshotStore>, config: &DashboardConfig) -> Self {
        let source_update = NaiveTime::from_hms_opt(
            config.data.source_update_hour_utc,
            config.data.source_update_minute_utc,
            0,
        )
        .or_else(|| {
            NaiveTime::from_hms_opt(
                defaults::SOURCE_UPDATE_HOUR_UTC,
                defaults::SOURCE_UPDATE_MINUTE_UTC,
                0,
            )
        })
        .unwrap_or_default();

        Self {
            snapshots,
            forecast: Arc::new(config.forecast.clone()),
            source_update,
            started_at: Utc::now(),
        }
    }

    /// The current snapshot, or the 503 response to send when there is none.
    pub(crate) fn snapshot(&self) -> Result<Arc<DataSnapshot>, Response> {
        self.snapshots
            .load()
            .ok_or_else(ApiErrorResponse::data_not_loaded)
    }
}

/// Parse `countries=A,B`, defaulting to the standard selection.
///
/// Unknown names are a 404.
pub(crate) fn select_countries(
    snapshot: &DataSnapshot,
    requested: Option<&str>,
) -> Result<Vec<String>, Response> {
    let names: Vec<String> = requested
        .map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    if names.is_empty() {
        return Ok(defaults::DEFAULT_COUNTRIES
            .iter()
            .filter(|c| snapshot.contains(c))
            .map(|c| c.to_string())
            .collect());
    }

    let unknown: Vec<&str> = names
        .iter()
        .map(String::as_str)
        .filter(|c| !snapshot.contains(c))
        .collect();
    if !unknown.is_empty() {
        return Err(ApiErrorResponse::not_found(format!(
            "Unknown or excluded countries: {}",
            unknown.join(", ")
        )));
    }
    Ok(names)
}
