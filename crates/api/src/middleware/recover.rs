use std::any::Any;

use axum::{http::StatusCode, response::Response};
use bff_core::ErrorCode;
use tower_http::catch_panic::CatchPanicLayer;

use crate::response::{send_error, INTERNAL_ERROR_MESSAGE};

type PanicHandler = fn(Box<dyn Any + Send + 'static>) -> Response;

/// Layer that turns a panicking request into a 500 envelope.
///
/// Register it first in the [`Chain`](super::Chain) so every other layer runs
/// inside it. The panic payload is logged, never sent to the client.
pub fn panic_guard() -> CatchPanicLayer<PanicHandler> {
    CatchPanicLayer::custom(handle_panic as PanicHandler)
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let payload = if let Some(s) = err.downcast_ref::<String>() {
        s.as_str()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s
    } else {
        "unknown panic payload"
    };

    tracing::error!(panic = %payload, "panic recovered");

    send_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorCode::InternalError,
        INTERNAL_ERROR_MESSAGE,
    )
}
