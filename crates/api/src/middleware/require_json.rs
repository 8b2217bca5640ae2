use axum::{
    extract::Request,
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        Method, StatusCode,
    },
    middleware::Next,
    response::Response,
};
use bff_core::ErrorCode;

use crate::response::send_error;

pub const UNSUPPORTED_MEDIA_MESSAGE: &str = "Content-Type must be application/json";
pub const NOT_ACCEPTABLE_MESSAGE: &str = "Accept header must include application/json";

const JSON: &str = "application/json";

/// Rejects mutating requests that do not speak JSON.
///
/// GET, HEAD and OPTIONS pass untouched.
pub async fn require_json(request: Request, next: Next) -> Response {
    let method = request.method();
    if method == Method::GET || method == Method::HEAD || method == Method::OPTIONS {
        return next.run(request).await;
    }

    let headers = request.headers();
    let content_type = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok());
    if content_type != Some(JSON) {
        return send_error(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ErrorCode::UnsupportedMediaType,
            UNSUPPORTED_MEDIA_MESSAGE,
        );
    }

    if let Some(accept) = headers.get(ACCEPT) {
        let accept = accept.to_str().unwrap_or_default();
        if accept != JSON && accept != "*/*" {
            return send_error(
                StatusCode::NOT_ACCEPTABLE,
                ErrorCode::NotAcceptable,
                NOT_ACCEPTABLE_MESSAGE,
            );
        }
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::Chain;
    use axum::{
        body::{to_bytes, Body},
        middleware::from_fn,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    fn app() -> Router {
        let router = Router::new().route("/items", get(|| async { "list" }).post(|| async { "created" }));
        Chain::new().add(from_fn(require_json)).apply(router)
    }

    async fn send(method: &str, headers: &[(&str, &str)]) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri("/items");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        let response = app()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn wrong_content_type_is_415() {
        let (status, json) = send("POST", &[("content-type", "text/plain")]).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
        assert_eq!(json["error"]["code"], "UNSUPPORTED_MEDIA_TYPE");
        assert_eq!(json["error"]["message"], UNSUPPORTED_MEDIA_MESSAGE);

        let (status, _) = send("POST", &[]).await;
        assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn unacceptable_accept_is_406() {
        let (status, json) = send(
            "POST",
            &[("content-type", "application/json"), ("accept", "text/html")],
        )
        .await;
        assert_eq!(status, StatusCode::NOT_ACCEPTABLE);
        assert_eq!(json["error"]["code"], "NOT_ACCEPTABLE");
        assert_eq!(json["error"]["message"], NOT_ACCEPTABLE_MESSAGE);
    }

    #[tokio::test]
    async fn json_and_wildcard_accept_pass() {
        for accept in [None, Some("application/json"), Some("*/*")] {
            let mut headers = vec![("content-type", "application/json")];
            headers.extend(accept.map(|a| ("accept", a)));
            let (status, _) = send("POST", &headers).await;
            assert_eq!(status, StatusCode::OK, "accept: {accept:?}");
        }
    }

    #[tokio::test]
    async fn safe_methods_skip_negotiation() {
        let (status, _) = send("GET", &[("accept", "text/html")]).await;
        assert_eq!(status, StatusCode::OK);
    }
}
