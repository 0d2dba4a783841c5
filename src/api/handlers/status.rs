//! Health, status and country-list handlers.

use axum::extract::State;
use axum::response::Response;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use super::DashboardState;
use crate::api::envelope::ApiResponse;
use crate::snapshot::next_source_update;

/// `/api/v2/system/health`
#[derive(Debug, Serialize)]
pub struct HealthV2 {
    pub status: &'static str,
    pub data_loaded: bool,
    pub uptime_secs: i64,
}

/// `/api/v2/status`
#[derive(Debug, Serialize)]
pub struct StatusV2 {
    pub data_loaded: bool,
    pub built_at: Option<DateTime<Utc>>,
    pub snapshot_age_secs: Option<i64>,
    /// Last calendar date in the source data
    pub latest_date: Option<NaiveDate>,
    pub countries: usize,
    pub excluded: usize,
    pub day_zero_threshold: Option<u64>,
    pub next_source_update: DateTime<Utc>,
    pub until_next_update_secs: i64,
}

#[derive(Debug, Serialize)]
pub struct CountriesV2 {
    pub countries: Vec<String>,
}

/// GET /api/v2/system/health
pub async fn system_health(State(state): State<DashboardState>) -> Response {
    ApiResponse::ok(HealthV2 {
        status: "ok",
        data_loaded: state.snapshots.is_loaded(),
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
    })
}

/// GET /api/v2/status
pub async fn status(State(state): State<DashboardState>) -> Response {
    let now = Utc::now();
    let next = next_source_update(now, state.source_update);
    let snapshot = state.snapshots.load();

    ApiResponse::ok(StatusV2 {
        data_loaded: snapshot.is_some(),
        built_at: snapshot.as_ref().map(|s| s.built_at),
        snapshot_age_secs: snapshot.as_ref().map(|s| s.age(now).num_seconds()),
        latest_date: snapshot.as_ref().and_then(|s| s.latest_date()),
        countries: snapshot.as_ref().map_or(0, |s| s.infected.len()),
        excluded: snapshot.as_ref().map_or(0, |s| s.excluded.len()),
        day_zero_threshold: snapshot.as_ref().map(|s| s.options.day_zero_threshold),
        next_source_update: next,
        until_next_update_secs: (next - now).num_seconds(),
    })
}

/// GET /api/v2/countries
pub async fn countries(State(state): State<DashboardState>) -> Response {
    let snapshot = match state.snapshot() {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    ApiResponse::from_snapshot(
        CountriesV2 {
            countries: snapshot.countries().map(str::to_string).collect(),
        },
        snapshot.built_at,
    )
}
