//! Plain-text API errors

use axum::{
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::domain::DomainError;

pub const MISSING_LABEL_MESSAGE: &str = "Missing label_filter parameter";
pub const NOT_FOUND_MESSAGE: &str = "No config settings found";
pub const INTERNAL_MESSAGE: &str = "An error occurred";

/// API error with status code
///
/// Bodies are fixed strings; internal detail only goes to the log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: &'static str,
}

impl ApiError {
    pub fn new(status: StatusCode, message: &'static str) -> Self {
        Self { status, message }
    }

    pub fn missing_label() -> Self {
        Self::new(StatusCode::BAD_REQUEST, MISSING_LABEL_MESSAGE)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.message,
        )
            .into_response()
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation { .. } => Self::missing_label(),
            DomainError::NotFound { .. } => Self::not_found(),
            other => {
                error!(error = %other, "Request failed");
                Self::internal()
            }
        }
    }
}
