//! Scenario forecast handler.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::DashboardState;
use crate::api::envelope::{ApiErrorResponse, ApiResponse};
use crate::config::ForecastConfig;
use crate::forecast::{create_forecast, ForecastParams};
use crate::types::{DayCount, DayPoint};

#[derive(Debug, Default, Deserialize)]
pub struct ForecastQuery {
    pub day_of_control: Option<i64>,
    pub days_to_recover: Option<usize>,
    pub unrecorded_factor: Option<f64>,
    pub ratio_avg_days: Option<usize>,
}

/// Request parameters after defaults and range checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScenarioV2 {
    pub day_of_control: i64,
    pub days_to_recover: usize,
    pub unrecorded_factor: f64,
    pub ratio_avg_days: usize,
}

#[derive(Debug, Serialize)]
pub struct ForecastV2 {
    pub country: String,
    pub scenario: ScenarioV2,
    pub initial_ratio: f64,
    pub anchor_day: i64,
    /// Observed cases, scaled by the unrecorded factor
    pub observed: Vec<DayPoint>,
    pub forecast: Vec<DayCount>,
    pub ill_population: Vec<DayCount>,
}

/// Fill in defaults and check each parameter against its configured range.
pub fn resolve_scenario(query: &ForecastQuery, cfg: &ForecastConfig) -> Result<ScenarioV2, String> {
    let day_of_control = query.day_of_control.unwrap_or(cfg.day_of_control);
    if !(cfg.min_day_of_control..=cfg.max_day_of_control).contains(&day_of_control) {
        return Err(format!(
            "day_of_control must be within {}..={} (got {})",
            cfg.min_day_of_control, cfg.max_day_of_control, day_of_control
        ));
    }

    let days_to_recover = query.days_to_recover.unwrap_or(cfg.days_to_recover);
    if !(cfg.min_days_to_recover..=cfg.max_days_to_recover).contains(&days_to_recover) {
        return Err(format!(
            "days_to_recover must be within {}..={} (got {})",
            cfg.min_days_to_recover, cfg.max_days_to_recover, days_to_recover
        ));
    }

    let unrecorded_factor = query.unrecorded_factor.unwrap_or(cfg.unrecorded_factor);
    if !unrecorded_factor.is_finite()
        || unrecorded_factor < cfg.min_unrecorded_factor
        || unrecorded_factor > cfg.max_unrecorded_factor
    {
        return Err(format!(
            "unrecorded_factor must be within {}..={} (got {})",
            cfg.min_unrecorded_factor, cfg.max_unrecorded_factor, unrecorded_factor
        ));
    }

    Ok(ScenarioV2 {
        day_of_control,
        days_to_recover,
        unrecorded_factor,
        ratio_avg_days: query.ratio_avg_days.unwrap_or(cfg.ratio_avg_days),
    })
}

/// GET /api/v2/forecast/:country
pub async fn forecast(
    State(state): State<DashboardState>,
    Path(country): Path<String>,
    query: Result<Query<ForecastQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return ApiErrorResponse::bad_request(e.body_text()),
    };
    let scenario = match resolve_scenario(&query, &state.forecast) {
        Ok(s) => s,
        Err(msg) => return ApiErrorResponse::bad_request(msg),
    };
    let snapshot = match state.snapshot() {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let Some(observed) = snapshot.infected_series(&country, false) else {
        return ApiErrorResponse::not_found(format!("Unknown or excluded country: {country}"));
    };

    let params = ForecastParams {
        forecast_start: None,
        days_to_recover: scenario.days_to_recover,
        ratio_avg_days: scenario.ratio_avg_days,
    };
    let result = match create_forecast(&observed, scenario.day_of_control, &params) {
        Ok(r) => r.scaled(scenario.unrecorded_factor),
        Err(e) => {
            debug!(country = %country, error = %e, "Forecast rejected");
            return ApiErrorResponse::bad_request(e.to_string());
        }
    };

    ApiResponse::from_snapshot(
        ForecastV2 {
            country,
            scenario,
            initial_ratio: result.initial_ratio,
            anchor_day: result.anchor_day,
            observed: result.observed.points().to_vec(),
            forecast: result.forecast,
            ill_population: result.ill_population,
        },
        snapshot.built_at,
    )
}
