//! JSON envelope shared by the survey endpoints.
//!
//! Success bodies are `{"data": ..., "meta": ...}`, failures are
//! `{"error": {"code", "message"}, "meta": ...}`. The `meta` block carries
//! the server timestamp and API version so ingestion clients can correlate
//! solutions with server-side time. `/health` is the one bare exception.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use serde::Serialize;

const API_VERSION: &str = "1";

#[derive(Debug, Serialize)]
struct Meta {
    timestamp: String,
    version: &'static str,
}

impl Meta {
    fn now() -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            version: API_VERSION,
        }
    }
}

#[derive(Debug, Serialize)]
struct Envelope<T: Serialize> {
    data: T,
    meta: Meta,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
    meta: Meta,
}

/// Wrap a successful payload in the data envelope.
pub fn ok<T: Serialize>(data: T) -> Response {
    let body = Envelope {
        data,
        meta: Meta::now(),
    };
    (StatusCode::OK, axum::Json(body)).into_response()
}

fn fail(status: StatusCode, code: &'static str, message: impl Into<String>) -> Response {
    let body = ErrorEnvelope {
        error: ErrorDetail {
            code,
            message: message.into(),
        },
        meta: Meta::now(),
    };
    (status, axum::Json(body)).into_response()
}

pub fn bad_request(message: impl Into<String>) -> Response {
    fail(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
}

pub fn not_found(message: impl Into<String>) -> Response {
    fail(StatusCode::NOT_FOUND, "NOT_FOUND", message)
}

pub fn internal(message: impl Into<String>) -> Response {
    fail(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message)
}
