//! JSON response envelope.
//!
//! Success: `{"success": true, "data": ...}`.
//! Failure: `{"success": false, "error": {"code": ..., "message": ...}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bff_core::ErrorCode;
use serde::{Deserialize, Serialize};

/// Message sent with every generic internal error. Never carries details.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal server error";

#[derive(Debug, Serialize, Deserialize)]
pub struct SuccessResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: ErrorCode,
    pub message: String,
}

/// Writes a success envelope.
pub fn send_json<T: Serialize>(status: StatusCode, data: T) -> Response {
    (
        status,
        Json(SuccessResponse {
            success: true,
            data: Some(data),
        }),
    )
        .into_response()
}

/// Writes an error envelope.
pub fn send_error(status: StatusCode, code: ErrorCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: ErrorBody {
                code,
                message: message.into(),
            },
        }),
    )
        .into_response()
}
