//! HTTP handlers for auth routes.

use anyhow::Context;
use axum::{
    extract::{RawQuery, State},
    http::{header::LOCATION, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use axum_extra::extract::CookieJar;
use bff_api::{send_json, ApiError};
use bff_core::{
    auth::{
        is_session_expired, validate_return_to, CompletedLogin, SessionId, DEFAULT_RETURN_TO,
    },
    AppError, ErrorCode,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cookies::{
    expired_cookie, flow_cookie, session_cookie, set_cookie_headers, ACCESS_TOKEN_COOKIE,
    RETURN_TO_COOKIE, SESSION_COOKIE, STATE_COOKIE,
};
use crate::AuthState;

/// First value of `key` in a raw query string.
///
/// Repeated keys and malformed escapes never fail the request; decoding is
/// lossy and later duplicates are ignored.
fn query_param(query: Option<&str>, key: &str) -> Option<String> {
    url::form_urlencoded::parse(query.unwrap_or_default().as_bytes())
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.into_owned())
}

/// Query parameters for the login endpoint.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct LoginQuery {
    /// Application path to land on after authentication.
    pub return_to: Option<String>,
}

impl LoginQuery {
    /// Reads `returnTo`, falling back to `return_to`.
    pub fn parse(query: Option<&str>) -> Self {
        Self {
            return_to: query_param(query, "returnTo").or_else(|| query_param(query, "return_to")),
        }
    }
}

/// Query parameters for the OIDC callback.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CallbackQuery {
    pub state: Option<String>,
    pub code: Option<String>,
}

impl CallbackQuery {
    pub fn parse(query: Option<&str>) -> Self {
        Self {
            state: query_param(query, "state"),
            code: query_param(query, "code"),
        }
    }
}

/// Body of `GET /auth/session`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStatus {
    pub authenticated: bool,
    pub expires_at: DateTime<Utc>,
}

/// Creates the auth router.
///
/// Routes:
/// - `GET /auth/login` - Start the OIDC flow
/// - `GET /auth/callback` - Finish the OIDC flow and issue session cookies
/// - `GET /auth/logout` - Hand the browser to the provider's logout endpoint
/// - `GET /auth/session` - Report whether the session cookie is valid
pub fn auth_routes() -> Router<AuthState> {
    Router::new()
        .route("/auth/login", get(login))
        .route("/auth/callback", get(callback))
        .route("/auth/logout", get(logout))
        .route("/auth/session", get(session))
}

/// 302 to `location`.
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(LOCATION, location)]).into_response()
}

async fn login(
    State(state): State<AuthState>,
    RawQuery(query): RawQuery,
) -> Result<Response, ApiError> {
    let return_to = LoginQuery::parse(query.as_deref())
        .return_to
        .as_deref()
        .and_then(validate_return_to)
        .unwrap_or(DEFAULT_RETURN_TO)
        .to_string();

    let redirect = state.flow.begin_login()?;

    let cookies = set_cookie_headers([
        flow_cookie(STATE_COOKIE, redirect.state, &state.config),
        flow_cookie(RETURN_TO_COOKIE, return_to, &state.config),
    ]);

    Ok((cookies, Redirect::temporary(redirect.authorization_url.as_str())).into_response())
}

async fn callback(
    State(state): State<AuthState>,
    RawQuery(query): RawQuery,
    jar: CookieJar,
) -> Response {
    let query = CallbackQuery::parse(query.as_deref());
    let return_to = jar
        .get(RETURN_TO_COOKIE)
        .and_then(|cookie| validate_return_to(cookie.value()))
        .unwrap_or(DEFAULT_RETURN_TO)
        .to_string();
    let expected_state = jar
        .get(STATE_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty());

    // The state is single-use whatever happens next.
    let mut cookies = vec![
        expired_cookie(STATE_COOKIE, &state.config),
        expired_cookie(RETURN_TO_COOKIE, &state.config),
    ];

    match complete_callback(&state, expected_state.as_deref(), query).await {
        Ok(login) => {
            cookies.push(session_cookie(
                SESSION_COOKIE,
                login.session_token.to_string(),
                &state.config,
            ));
            cookies.push(session_cookie(
                ACCESS_TOKEN_COOKIE,
                login.session.access_token,
                &state.config,
            ));
            (
                set_cookie_headers(cookies),
                found(&state.config.frontend_url(&return_to)),
            )
                .into_response()
        }
        Err(err) => (set_cookie_headers(cookies), err).into_response(),
    }
}

async fn complete_callback(
    state: &AuthState,
    expected_state: Option<&str>,
    query: CallbackQuery,
) -> Result<CompletedLogin, ApiError> {
    let expected_state = expected_state.ok_or_else(|| {
        AppError::new(
            ErrorCode::Unauthorized,
            format!("missing required cookie: {STATE_COOKIE}"),
        )
    })?;

    if query.state.as_deref() != Some(expected_state) {
        return Err(AppError::new(ErrorCode::Unauthorized, "state mismatch").into());
    }

    let code = query.code.filter(|code| !code.is_empty()).ok_or_else(|| {
        AppError::new(
            ErrorCode::MissingField,
            "missing required query parameter: code",
        )
    })?;

    let login = state
        .flow
        .complete_login(&code)
        .await
        .context("failed to authenticate user")?;

    state
        .sessions
        .put_session(&login.session_token, &login.session, state.config.session_ttl)
        .await
        .context("failed to persist session")?;

    tracing::info!(subject = %login.claims.subject, "user logged in");

    Ok(login)
}

async fn logout(State(state): State<AuthState>) -> Response {
    found(state.config.logout_url.as_str())
}

async fn session(State(state): State<AuthState>, jar: CookieJar) -> Result<Response, ApiError> {
    let token = jar
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::new(ErrorCode::Unauthorized, "not authenticated"))?;

    let session = state
        .sessions
        .get_session(&SessionId::new(token))
        .await?
        .filter(|session| !is_session_expired(session, Utc::now()))
        .ok_or_else(|| AppError::new(ErrorCode::Unauthorized, "session expired or unknown"))?;

    Ok(send_json(
        StatusCode::OK,
        SessionStatus {
            authenticated: true,
            expires_at: session.expires_at,
        },
    ))
}
