use serde::{Deserialize, Serialize};

/// Machine-readable error classification sent to clients in the error envelope.
///
/// The set is closed. Every code resolves to an HTTP status through
/// [`error_code_to_status_code`](super::error_code_to_status_code).
///
/// Adding a variant means updating [`ErrorCode::as_str`] and [`ErrorCode::ALL`]
/// too; the tests only cover codes listed in `ALL`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Validation
    InvalidInput,
    MissingField,
    InvalidFormat,
    TooLarge,
    OutOfRange,

    // Auth / access
    Unauthorized,
    Forbidden,
    TokenExpired,
    AccountLocked,

    // Resource
    NotFound,
    DuplicateRecord,
    Conflict,
    TooManyRequests,
    UnsupportedMediaType,
    NotAcceptable,

    // Server
    InternalError,
    ServiceUnavailable,
    GatewayTimeout,
    DependencyFailed,
    SerializationError,

    // Storage
    #[serde(rename = "DB_CONNECTION_FAILED")]
    DbConnection,
    DbTimeout,
    #[serde(rename = "DB_TRANSACTION_FAILED")]
    DbTransaction,
    RecordLocked,
    DataCorruption,

    // Network / external
    ConnectionFailed,
    #[serde(rename = "EXTERNAL_SERVICE_ERROR")]
    ExternalService,
    #[serde(rename = "DNS_RESOLUTION_FAILED")]
    DnsResolution,
    RequestTimeout,
}

impl ErrorCode {
    /// Wire representation of the code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "INVALID_INPUT",
            Self::MissingField => "MISSING_FIELD",
            Self::InvalidFormat => "INVALID_FORMAT",
            Self::TooLarge => "TOO_LARGE",
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::AccountLocked => "ACCOUNT_LOCKED",
            Self::NotFound => "NOT_FOUND",
            Self::DuplicateRecord => "DUPLICATE_RECORD",
            Self::Conflict => "CONFLICT",
            Self::TooManyRequests => "TOO_MANY_REQUESTS",
            Self::UnsupportedMediaType => "UNSUPPORTED_MEDIA_TYPE",
            Self::NotAcceptable => "NOT_ACCEPTABLE",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::GatewayTimeout => "GATEWAY_TIMEOUT",
            Self::DependencyFailed => "DEPENDENCY_FAILED",
            Self::SerializationError => "SERIALIZATION_ERROR",
            Self::DbConnection => "DB_CONNECTION_FAILED",
            Self::DbTimeout => "DB_TIMEOUT",
            Self::DbTransaction => "DB_TRANSACTION_FAILED",
            Self::RecordLocked => "RECORD_LOCKED",
            Self::DataCorruption => "DATA_CORRUPTION",
            Self::ConnectionFailed => "CONNECTION_FAILED",
            Self::ExternalService => "EXTERNAL_SERVICE_ERROR",
            Self::DnsResolution => "DNS_RESOLUTION_FAILED",
            Self::RequestTimeout => "REQUEST_TIMEOUT",
        }
    }

    /// Every code, in declaration order. Keep in sync with the enum.
    pub const ALL: [ErrorCode; 29] = [
        Self::InvalidInput,
        Self::MissingField,
        Self::InvalidFormat,
        Self::TooLarge,
        Self::OutOfRange,
        Self::Unauthorized,
        Self::Forbidden,
        Self::TokenExpired,
        Self::AccountLocked,
        Self::NotFound,
        Self::DuplicateRecord,
        Self::Conflict,
        Self::TooManyRequests,
        Self::UnsupportedMediaType,
        Self::NotAcceptable,
        Self::InternalError,
        Self::ServiceUnavailable,
        Self::GatewayTimeout,
        Self::DependencyFailed,
        Self::SerializationError,
        Self::DbConnection,
        Self::DbTimeout,
        Self::DbTransaction,
        Self::RecordLocked,
        Self::DataCorruption,
        Self::ConnectionFailed,
        Self::ExternalService,
        Self::DnsResolution,
        Self::RequestTimeout,
    ];
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
