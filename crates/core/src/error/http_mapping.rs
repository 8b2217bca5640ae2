//! Pure functions for mapping error codes to HTTP status codes and log severities.

use super::ErrorCode;

/// Maps an [`ErrorCode`] to an HTTP status code.
///
/// - validation codes -> 400
/// - `UNAUTHORIZED`, `TOKEN_EXPIRED` -> 401
/// - `FORBIDDEN`, `ACCOUNT_LOCKED` -> 403
/// - `NOT_FOUND` -> 404
/// - `NOT_ACCEPTABLE` -> 406
/// - `CONFLICT`, `DUPLICATE_RECORD` -> 409
/// - `UNSUPPORTED_MEDIA_TYPE` -> 415
/// - `TOO_MANY_REQUESTS` -> 429
/// - `SERVICE_UNAVAILABLE` -> 503
/// - anything else -> 500
///
/// # Examples
///
/// ```
/// use bff_core::error::{error_code_to_status_code, ErrorCode};
///
/// assert_eq!(error_code_to_status_code(ErrorCode::Unauthorized), 401);
/// assert_eq!(error_code_to_status_code(ErrorCode::DbTimeout), 500);
/// ```
pub fn error_code_to_status_code(code: ErrorCode) -> u16 {
    match code {
        ErrorCode::InvalidInput
        | ErrorCode::MissingField
        | ErrorCode::InvalidFormat
        | ErrorCode::TooLarge
        | ErrorCode::OutOfRange => 400,
        ErrorCode::Unauthorized | ErrorCode::TokenExpired => 401,
        ErrorCode::Forbidden | ErrorCode::AccountLocked => 403,
        ErrorCode::NotFound => 404,
        ErrorCode::NotAcceptable => 406,
        ErrorCode::Conflict | ErrorCode::DuplicateRecord => 409,
        ErrorCode::UnsupportedMediaType => 415,
        ErrorCode::TooManyRequests => 429,
        ErrorCode::ServiceUnavailable => 503,
        // Unclassified codes land here until they get an explicit row.
        _ => 500,
    }
}

/// Log severity an error deserves, decided only by its HTTP status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Client-side failure (status below 500).
    Warn,
    /// Server-side failure (status 500 and above).
    Error,
}

impl Severity {
    pub fn from_status(status: u16) -> Self {
        if status >= 500 {
            Self::Error
        } else {
            Self::Warn
        }
    }
}
