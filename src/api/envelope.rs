//! Response envelope shared by every v2 endpoint.
//!
//! Success bodies are `{ "data": ..., "meta": { ... } }`, errors are
//! `{ "error": { "code", "message" }, "meta": { ... } }`. Responses computed
//! from a snapshot also carry `meta.data_as_of`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// API version reported in `meta.version`.
pub const API_VERSION: &str = "2";

/// Metadata included in every v2 response.
#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub timestamp: String,
    pub version: &'static str,
    /// Build time of the snapshot the data came from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_as_of: Option<String>,
}

impl Default for ResponseMeta {
    fn default() -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            version: API_VERSION,
            data_as_of: None,
        }
    }
}

/// Successful v2 response: `{ "data": T, "meta": { ... } }`
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Response {
        Self::respond(data, ResponseMeta::default())
    }

    /// Like [`ok`](Self::ok), stamping `meta.data_as_of` with `built_at`.
    pub fn from_snapshot(data: T, built_at: DateTime<Utc>) -> Response {
        let meta = ResponseMeta {
            data_as_of: Some(built_at.to_rfc3339()),
            ..ResponseMeta::default()
        };
        Self::respond(data, meta)
    }

    fn respond(data: T, meta: ResponseMeta) -> Response {
        (StatusCode::OK, axum::Json(Self { data, meta })).into_response()
    }
}

/// Error detail inside [`ApiErrorResponse`].
#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

/// Error v2 response: `{ "error": { "code": "...", "message": "..." }, "meta": { ... } }`
#[derive(Debug, Serialize)]
pub struct ApiErrorResponse {
    pub error: ErrorDetail,
    pub meta: ResponseMeta,
}

impl ApiErrorResponse {
    fn build(status: StatusCode, code: &str, msg: impl Into<String>) -> Response {
        let body = Self {
            error: ErrorDetail {
                code: code.to_string(),
                message: msg.into(),
            },
            meta: ResponseMeta::default(),
        };
        (status, axum::Json(body)).into_response()
    }

    pub fn not_found(msg: impl Into<String>) -> Response {
        Self::build(StatusCode::NOT_FOUND, "NOT_FOUND", msg)
    }

    pub fn bad_request(msg: impl Into<String>) -> Response {
        Self::build(StatusCode::BAD_REQUEST, "BAD_REQUEST", msg)
    }

    pub fn internal(msg: impl Into<String>) -> Response {
        Self::build(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg)
    }

    /// No snapshot has been published yet.
    pub fn data_not_loaded() -> Response {
        Self::build(
            StatusCode::SERVICE_UNAVAILABLE,
            "DATA_NOT_LOADED",
            "Case data has not been loaded yet, retry shortly",
        )
    }
}

/// Fallback for unmatched routes, so even 404s use the envelope.
pub async fn route_not_found(uri: axum::http::Uri) -> Response {
    ApiErrorResponse::not_found(format!("No route for {}", uri.path()))
}
