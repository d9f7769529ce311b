//! Error responses of the HTTP API

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use wbq_common::provider::FetchError;
use wbq_common::Error;

/// Errors surfaced to API clients as `{error, message}` JSON
#[derive(Debug)]
pub enum ApiError {
    /// Malformed query or respondent id (400)
    BadRequest(String),
    /// Statistics API failed (502)
    Upstream(FetchError),
    /// Section without a declared scale under the reject policy (422)
    UnknownSection(String),
    /// Anything else (500)
    Internal(String),
}

impl ApiError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg.clone()),
            ApiError::Upstream(e) => (StatusCode::BAD_GATEWAY, "upstream", e.to_string()),
            ApiError::UnknownSection(section) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "unknown_section",
                format!("No declared scale for section '{}'", section),
            ),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal", msg.clone()),
        }
    }
}

impl From<FetchError> for ApiError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::InvalidUserId(_) => ApiError::BadRequest(e.to_string()),
            other => ApiError::Upstream(other),
        }
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        match e {
            Error::Fetch(fetch) => fetch.into(),
            Error::UnknownSection(section) => ApiError::UnknownSection(section),
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = self.parts();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{}", message);
        }

        let body = Json(json!({
            "error": kind,
            "message": message,
        }));

        (status, body).into_response()
    }
}
