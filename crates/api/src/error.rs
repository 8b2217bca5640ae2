use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bff_core::{AppError, ErrorCode};

use crate::response::{send_error, INTERNAL_ERROR_MESSAGE};

/// Error type returned by route handlers.
///
/// Wraps `anyhow::Error` so `?` works on any error. When the chain contains an
/// [`AppError`], its code and message are rendered. Anything else becomes a
/// generic 500 whose body never carries the underlying text.
#[derive(Debug)]
pub struct ApiError(pub anyhow::Error);

impl ApiError {
    /// First [`AppError`] found in the error chain.
    pub fn app_error(&self) -> Option<&AppError> {
        self.0.chain().find_map(|e| e.downcast_ref::<AppError>())
    }

    fn report(&self) -> ErrorReport {
        let detail = format!("{:#}", self.0);
        match self.app_error() {
            Some(app_error) => ErrorReport {
                status: StatusCode::from_u16(app_error.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                code: app_error.code(),
                message: app_error.message().to_string(),
                detail,
                unhandled: false,
            },
            None => ErrorReport {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                code: ErrorCode::InternalError,
                message: INTERNAL_ERROR_MESSAGE.to_string(),
                detail,
                unhandled: true,
            },
        }
    }
}

impl<E> From<E> for ApiError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// What went wrong in a handler, attached to the error response's extensions
/// so the error-translating layer can log it with request context.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub status: StatusCode,
    pub code: ErrorCode,
    /// Client-facing message.
    pub message: String,
    /// Full error chain, for logs only.
    pub detail: String,
    /// True when the error carried no [`AppError`].
    pub unhandled: bool,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let report = self.report();
        let mut response = send_error(report.status, report.code, report.message.clone());
        response.extensions_mut().insert(report);
        response
    }
}
