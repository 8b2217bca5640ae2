use axum::{extract::Request, middleware::Next, response::Response};
use bff_core::Severity;

use crate::error::ErrorReport;

/// Logs handler errors with the request they belong to.
///
/// Reads the [`ErrorReport`] that [`ApiError`](crate::ApiError) attaches to
/// its response. Successful responses pass through silently. Install with
/// `Router::route_layer(axum::middleware::from_fn(error_translator))`.
pub async fn error_translator(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let mut response = next.run(request).await;
    let Some(report) = response.extensions_mut().remove::<ErrorReport>() else {
        return response;
    };

    let status = report.status.as_u16();
    if report.unhandled {
        tracing::error!(%method, %path, error = %report.detail, "unhandled error");
        return response;
    }

    match Severity::from_status(status) {
        Severity::Warn => tracing::warn!(
            %method,
            %path,
            status,
            code = %report.code,
            msg = %report.message,
            "client error"
        ),
        Severity::Error => tracing::error!(
            %method,
            %path,
            status,
            code = %report.code,
            error = %report.detail,
            "backend error"
        ),
    }

    response
}
