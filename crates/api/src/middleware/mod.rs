//! Reusable HTTP middleware.
//!
//! - [`panic_guard`]: turns a panicking request into a 500 envelope.
//! - [`request_logger`]: logs every request and response except preflights.
//! - [`protect_origin`]: CORS headers plus cross-origin request protection.
//! - [`require_json`]: JSON content negotiation on mutating methods.
//! - [`error_translator`]: logs handler errors with request context.
//!
//! Layers compose with [`Chain`]; the first one added is the outermost.
//!
//! ```ignore
//! let pipeline = Chain::new()
//!     .add(panic_guard())
//!     .add(from_fn(request_logger))
//!     .add(from_fn_with_state(OriginGuard::new("https://app.example.com")?, protect_origin))
//!     .add(from_fn(require_json));
//!
//! let app = pipeline.apply(router);
//! ```

mod chain;
mod cors;
mod error;
mod logging;
mod recover;
mod require_json;

pub use chain::Chain;
pub use cors::{protect_origin, OriginError, OriginGuard, ALLOWED_HEADERS, ALLOWED_METHODS};
pub use error::error_translator;
pub use logging::{request_logger, MAX_LOGGED_BODY_BYTES};
pub use recover::panic_guard;
pub use require_json::{require_json, NOT_ACCEPTABLE_MESSAGE, UNSUPPORTED_MEDIA_MESSAGE};
