//! HTTP error mapping.
//!
//! DESIGN
//! ======
//! Services return their own `thiserror` enums. Each enum implements
//! [`ErrorCode`], which gives every variant a grepable `E_*` code and an
//! HTTP status. Route handlers return `Result<_, AppError>` and use `?`;
//! the blanket `From` impl turns any service error into the uniform body
//! `{"success": false, "code": ..., "message": ...}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};

/// Grepable error code and HTTP status for service errors.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn http_status(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Error returned by route handlers.
#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
}

impl AppError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self { status, code, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "E_VALIDATION", message)
    }
}

impl<E: ErrorCode> From<E> for AppError {
    fn from(err: E) -> Self {
        let status = err.http_status();
        if status.is_server_error() {
            tracing::error!(code = err.error_code(), error = %err, "request failed");
        }
        Self { status, code: err.error_code(), message: err.to_string() }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(serde_json::json!({
            "success": false,
            "code": self.code,
            "message": self.message,
        }));
        (self.status, body).into_response()
    }
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
