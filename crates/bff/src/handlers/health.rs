//! Health check endpoint for Kubernetes-style probes.

use axum::{http::StatusCode, response::Response};
use bff_api::send_json;

/// GET /livez - Basic liveness probe.
///
/// Returns 200 immediately. Used to check if the server is accepting connections.
#[axum::debug_handler]
pub async fn livez() -> Response {
    send_json(StatusCode::OK, serde_json::json!({ "status": "ok" }))
}
