use thiserror::Error;

use super::{error_code_to_status_code, ErrorCode, Severity};

/// Boxed error used as the cause of an [`AppError`].
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result type for operations that fail with an [`AppError`].
pub type Result<T> = std::result::Result<T, AppError>;

/// Typed application error.
///
/// Carries exactly one [`ErrorCode`], a client-safe message, and an optional
/// cause. The cause is diagnostic only: it never changes the code, the status
/// or the message sent to clients.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct AppError {
    code: ErrorCode,
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Wraps `cause` under a new code and message.
    pub fn wrap(code: ErrorCode, cause: impl Into<BoxError>, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(cause.into()),
        }
    }

    /// Like [`AppError::wrap`], but a missing cause produces no error at all.
    pub fn wrap_opt<E>(code: ErrorCode, cause: Option<E>, message: impl Into<String>) -> Option<Self>
    where
        E: Into<BoxError>,
    {
        cause.map(|cause| Self::wrap(code, cause, message))
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_code(&self) -> u16 {
        error_code_to_status_code(self.code)
    }

    pub fn severity(&self) -> Severity {
        Severity::from_status(self.status_code())
    }

    /// Renders the message followed by every cause, joined with `": "`.
    ///
    /// Meant for logs; never send this to a client.
    pub fn chain(&self) -> String {
        let mut rendered = self.message.clone();
        let mut next = std::error::Error::source(self);
        while let Some(cause) = next {
            rendered.push_str(": ");
            rendered.push_str(&cause.to_string());
            next = cause.source();
        }
        rendered
    }
}

/// Wraps the error side of a `Result` into an [`AppError`], passing `Ok` through.
pub trait ResultExt<T> {
    fn with_code(self, code: ErrorCode, message: impl Into<String>) -> Result<T>;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<BoxError>,
{
    fn with_code(self, code: ErrorCode, message: impl Into<String>) -> Result<T> {
        self.map_err(|cause| AppError::wrap(code, cause, message))
    }
}
