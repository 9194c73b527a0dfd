//! HTTP API handlers for cxm-ui

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cxm_common::Error;
use serde::Serialize;

pub mod checklist;
pub mod health;
pub mod session;
pub mod sse;
pub mod submissions;
pub mod users;

/// Error body returned to the presentation layer
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Wrapper mapping core errors onto HTTP responses
///
/// Every failure is scoped to the request that raised it; nothing maps to a
/// process-fatal condition.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Authentication(_) => StatusCode::UNAUTHORIZED,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let body = ErrorResponse {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
