mod app_error;
mod codes;
mod http_mapping;

pub use app_error::{AppError, BoxError, Result, ResultExt};
pub use codes::ErrorCode;
pub use http_mapping::{error_code_to_status_code, Severity};
