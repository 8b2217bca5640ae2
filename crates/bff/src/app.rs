use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use bff_api::middleware::{
    error_translator, panic_guard, protect_origin, request_logger, require_json, Chain,
    OriginGuard,
};
use bff_auth::{auth_routes, AuthState};

use crate::handlers::health::livez;

/// Middleware wrapped around every route, outermost first.
pub fn middleware_chain(origin: OriginGuard) -> Chain {
    Chain::new()
        .add(panic_guard())
        .add(from_fn(request_logger))
        .add(from_fn_with_state(origin, protect_origin))
        .add(from_fn(require_json))
}

/// Application routes, each translating handler errors into envelopes.
pub fn routes(state: AuthState) -> Router {
    auth_routes()
        .route("/livez", get(livez))
        .route_layer(from_fn(error_translator))
        .with_state(state)
}

/// Create the application router with all routes and middleware.
pub fn create_app(state: AuthState, origin: OriginGuard) -> Router {
    middleware_chain(origin).apply(routes(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{
            header::{ACCESS_CONTROL_ALLOW_ORIGIN, LOCATION, SET_COOKIE},
            Request, StatusCode,
        },
        response::Response,
    };
    use bff_api::{testing::CapturedLogs, ApiError};
    use bff_auth::{
        AuthConfig, AuthFlow, InMemorySessionStore, MockProvider, OidcProviderConfig,
    };
    use bff_core::{AppError, ErrorCode};
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;
    use tracing::Level;
    use url::Url;

    const FRONTEND: &str = "http://localhost:3000";

    fn provider_config() -> OidcProviderConfig {
        OidcProviderConfig {
            base_url: Url::parse("http://keycloak:8080").unwrap(),
            realm: "app".to_string(),
            client_id: "bff".to_string(),
            client_secret: "secret".to_string(),
            callback_url: Url::parse("http://localhost:8000/auth/callback").unwrap(),
        }
    }

    fn auth_state() -> AuthState {
        let provider = Arc::new(MockProvider::new(&provider_config()).unwrap());
        AuthState::new(
            AuthFlow::from_provider(provider),
            Arc::new(InMemorySessionStore::new()),
            AuthConfig::new(&provider_config(), FRONTEND, false).unwrap(),
        )
    }

    fn app() -> Router {
        create_app(auth_state(), OriginGuard::new(FRONTEND).unwrap())
    }

    async fn failing() -> Result<&'static str, ApiError> {
        Err(AppError::new(ErrorCode::InternalError, "database exploded").into())
    }

    async fn panicking() -> &'static str {
        if true {
            panic!("secret panic detail");
        }
        "unreachable"
    }

    /// The real pipeline around extra routes that fail on purpose.
    fn app_with_failures() -> Router {
        let router = Router::new()
            .route("/fail", get(failing))
            .route("/panic", get(panicking))
            .route_layer(from_fn(error_translator))
            .merge(routes(auth_state()));
        middleware_chain(OriginGuard::new(FRONTEND).unwrap()).apply(router)
    }

    async fn send(app: &Router, request: Request<Body>) -> Response {
        app.clone().oneshot(request).await.unwrap()
    }

    fn get_request(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_livez() {
        let response = send(&app(), get_request("/livez")).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], FRONTEND);
        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["status"], "ok");
    }

    #[tokio::test]
    async fn test_login_round_trip() {
        let app = app();

        let login = send(&app, get_request("/auth/login?returnTo=/dashboard")).await;
        assert_eq!(login.status(), StatusCode::TEMPORARY_REDIRECT);

        // Replay the flow cookies the browser would send back.
        let cookie_header = login
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .map(|value| value.to_str().unwrap().split(';').next().unwrap().to_string())
            .collect::<Vec<_>>()
            .join("; ");
        assert!(cookie_header.contains("return_to=/dashboard"));
        let state = cookie_header
            .split("; ")
            .find_map(|pair| pair.strip_prefix("oauth_state="))
            .unwrap()
            .to_string();

        let callback = send(
            &app,
            Request::builder()
                .uri(format!("/auth/callback?state={state}&code=abc"))
                .header("cookie", cookie_header)
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(callback.status(), StatusCode::FOUND);
        assert_eq!(
            callback.headers()[LOCATION],
            "http://localhost:3000/dashboard"
        );
        assert!(callback
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .any(|value| value.to_str().unwrap().starts_with("session_token=")));
    }

    #[tokio::test]
    async fn test_requests_and_responses_are_logged() {
        let logs = CapturedLogs::default();
        let _guard = logs.install();

        send(&app(), get_request("/livez?probe=1")).await;

        let request_log = logs.with_message("incoming request").pop().unwrap();
        assert_eq!(request_log.field("path"), Some("/livez"));
        assert_eq!(request_log.field("query"), Some("probe=1"));
        let response_log = logs.with_message("response").pop().unwrap();
        assert_eq!(response_log.field("status_code"), Some("200"));
    }

    #[tokio::test]
    async fn test_non_json_post_is_rejected() {
        let response = send(
            &app(),
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header("content-type", "text/plain")
                .body(Body::from("hello"))
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "UNSUPPORTED_MEDIA_TYPE");
    }

    #[tokio::test]
    async fn test_cross_origin_write_is_forbidden() {
        let response = send(
            &app(),
            Request::builder()
                .method("POST")
                .uri("/auth/login")
                .header("origin", "https://evil.example")
                .header("content-type", "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(response.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], FRONTEND);
    }

    #[tokio::test]
    async fn test_preflight_is_answered() {
        let response = send(
            &app(),
            Request::builder()
                .method("OPTIONS")
                .uri("/auth/session")
                .header("origin", FRONTEND)
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_handler_error_is_rendered_and_logged() {
        let logs = CapturedLogs::default();
        let _guard = logs.install();

        let response = send(&app_with_failures(), get_request("/fail")).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "INTERNAL_ERROR");
        assert_eq!(json["error"]["message"], "database exploded");

        let event = logs.with_message("backend error").pop().unwrap();
        assert_eq!(event.level, Level::ERROR);
        assert_eq!(event.field("method"), Some("GET"));
        assert_eq!(event.field("path"), Some("/fail"));
    }

    #[tokio::test]
    async fn test_panic_is_contained() {
        let logs = CapturedLogs::default();
        let _guard = logs.install();
        let app = app_with_failures();

        let response = send(&app, get_request("/panic")).await;

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        assert_eq!(json["error"]["message"], "internal server error");
        assert!(!json.to_string().contains("secret panic detail"));
        assert_eq!(logs.with_message("panic recovered").len(), 1);

        let response = send(&app, get_request("/livez")).await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
