//! HTTP plumbing shared by every route of the gateway.
//!
//! This crate provides:
//! - the JSON response envelope
//! - [`ApiError`], the error type handlers return
//! - the middleware pipeline ([`middleware::Chain`]) and its layers

pub mod error;
pub mod middleware;
pub mod response;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

pub use error::{ApiError, ErrorReport};
pub use response::{send_error, send_json, ErrorBody, ErrorResponse, SuccessResponse};
