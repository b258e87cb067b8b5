//! API error envelope.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::{ErrorCode, ErrorPayload};

/// Standardised API error response.
///
/// Every error returned by the HTTP layer serialises as:
/// ```json
/// { "exit_code": 40, "error": { "code": "<code>", "message": "<message>" } }
/// ```
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: ApiErrorResponse,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiErrorResponse {
    pub exit_code: i32,
    pub error: ErrorPayload,
}

impl ApiError {
    pub fn new(
        status: StatusCode,
        exit_code: i32,
        code: ErrorCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            status,
            body: ApiErrorResponse {
                exit_code,
                error: ErrorPayload::new(code, message),
            },
        }
    }

    pub fn tool_not_found() -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            40,
            ErrorCode::ToolNotFound,
            "tool not found",
        )
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, 40, ErrorCode::InvalidInput, message)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, 40, ErrorCode::NotFound, "not found")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
