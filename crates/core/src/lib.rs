//! Functional core for the BFF gateway.
//!
//! - [`error`]: the application error taxonomy and its HTTP status table
//! - [`auth`]: OIDC domain types, provider capabilities, token generation

pub mod auth;
pub mod error;

pub use error::{AppError, ErrorCode, ResultExt, Severity};
