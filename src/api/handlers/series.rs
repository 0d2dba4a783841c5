//! Plot series handlers: infected, deaths, case fatality rate and map.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::Response;
use serde::{Deserialize, Serialize};

use super::{select_countries, DashboardState};
use crate::api::envelope::{ApiErrorResponse, ApiResponse};
use crate::config::defaults::MAP_SCALE_MAX;
use crate::snapshot::{DataSnapshot, MapEntry};
use crate::types::{DayPoint, DaySeries};

#[derive(Debug, Deserialize)]
pub struct SeriesQuery {
    pub countries: Option<String>,
    /// Per 100 000 inhabitants; defaults to true
    pub per_capita: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CfrQuery {
    pub countries: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MapQuery {
    pub date_index: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct CountrySeries {
    pub country: String,
    pub points: Vec<DayPoint>,
}

#[derive(Debug, Serialize)]
pub struct SeriesV2 {
    /// What the values measure
    pub measure: &'static str,
    pub per_capita: bool,
    /// Day 0 is the first day above this many confirmed cases
    pub day_zero_threshold: u64,
    pub series: Vec<CountrySeries>,
}

#[derive(Debug, Serialize)]
pub struct MapV2 {
    pub date_index: usize,
    pub date: chrono::NaiveDate,
    /// Number of selectable dates
    pub date_count: usize,
    pub scale_max: f64,
    pub entries: Vec<MapEntry>,
}

fn build_series(
    snapshot: &DataSnapshot,
    countries: Vec<String>,
    measure: &'static str,
    per_capita: bool,
    lookup: impl Fn(&DataSnapshot, &str) -> Option<DaySeries>,
) -> SeriesV2 {
    let series = countries
        .into_iter()
        .map(|country| {
            let points = lookup(snapshot, &country)
                .map(|s| s.points().to_vec())
                .unwrap_or_default();
            CountrySeries { country, points }
        })
        .collect();
    SeriesV2 {
        measure,
        per_capita,
        day_zero_threshold: snapshot.options.day_zero_threshold,
        series,
    }
}

fn series_response(
    state: &DashboardState,
    query: Result<Query<SeriesQuery>, QueryRejection>,
    measure: &'static str,
    lookup: fn(&DataSnapshot, &str, bool) -> Option<DaySeries>,
) -> Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return ApiErrorResponse::bad_request(e.body_text()),
    };
    let snapshot = match state.snapshot() {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let countries = match select_countries(&snapshot, query.countries.as_deref()) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let per_capita = query.per_capita.unwrap_or(true);
    let body = build_series(&snapshot, countries, measure, per_capita, |s, c| {
        lookup(s, c, per_capita)
    });
    ApiResponse::from_snapshot(body, snapshot.built_at)
}

/// GET /api/v2/infected
pub async fn infected(
    State(state): State<DashboardState>,
    query: Result<Query<SeriesQuery>, QueryRejection>,
) -> Response {
    series_response(&state, query, "infected", DataSnapshot::infected_series)
}

/// GET /api/v2/deaths
pub async fn deaths(
    State(state): State<DashboardState>,
    query: Result<Query<SeriesQuery>, QueryRejection>,
) -> Response {
    series_response(&state, query, "deaths", DataSnapshot::deaths_series)
}

/// GET /api/v2/cfr
pub async fn case_fatality_rate(
    State(state): State<DashboardState>,
    query: Result<Query<CfrQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return ApiErrorResponse::bad_request(e.body_text()),
    };
    let snapshot = match state.snapshot() {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    let countries = match select_countries(&snapshot, query.countries.as_deref()) {
        Ok(c) => c,
        Err(resp) => return resp,
    };
    let body = build_series(&snapshot, countries, "deaths_per_infected", false, |s, c| {
        s.case_fatality_rate(c)
    });
    ApiResponse::from_snapshot(body, snapshot.built_at)
}

/// GET /api/v2/map
pub async fn map(
    State(state): State<DashboardState>,
    query: Result<Query<MapQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(e) => return ApiErrorResponse::bad_request(e.body_text()),
    };
    let snapshot = match state.snapshot() {
        Ok(s) => s,
        Err(resp) => return resp,
    };
    match snapshot.map_at(query.date_index) {
        Ok(frame) => ApiResponse::from_snapshot(
            MapV2 {
                date_index: frame.date_index,
                date: frame.date,
                date_count: snapshot.infected_raw.row_count(),
                scale_max: MAP_SCALE_MAX,
                entries: frame.entries,
            },
            snapshot.built_at,
        ),
        Err(e) => ApiErrorResponse::bad_request(e.to_string()),
    }
}
