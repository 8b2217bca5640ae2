use axum::{
    body::{to_bytes, Body},
    extract::Request,
    http::{Method, StatusCode},
    middleware::Next,
    response::Response,
};
use bff_core::ErrorCode;

use crate::response::send_error;

/// Largest request body the logger buffers.
pub const MAX_LOGGED_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Logs every request and its response, skipping CORS preflights.
///
/// The request body is buffered and handed back to downstream handlers, so
/// they can still read it. Logged fields:
///
/// - `incoming request`: `method`, `path`, `query`, `body`
/// - `response`: `method`, `path`, `status_code`, `body`
///
/// Use with [`axum::middleware::from_fn`].
pub async fn request_logger(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return next.run(request).await;
    }

    let (parts, body) = request.into_parts();
    let method = parts.method.clone();
    let path = parts.uri.path().to_string();

    let request_body = match to_bytes(body, MAX_LOGGED_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!(%method, %path, error = %err, "failed to read request body");
            return send_error(
                StatusCode::BAD_REQUEST,
                ErrorCode::InvalidInput,
                "failed to read request body",
            );
        }
    };

    tracing::info!(
        %method,
        %path,
        query = parts.uri.query().unwrap_or_default(),
        body = %String::from_utf8_lossy(&request_body),
        "incoming request"
    );

    let request = Request::from_parts(parts, Body::from(request_body));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let response_body = match to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::error!(%method, %path, error = %err, "failed to read response body");
            return Response::from_parts(parts, Body::empty());
        }
    };

    tracing::info!(
        %method,
        %path,
        status_code = parts.status.as_u16(),
        body = %String::from_utf8_lossy(&response_body).trim_end_matches('\n'),
        "response"
    );

    Response::from_parts(parts, Body::from(response_body))
}
