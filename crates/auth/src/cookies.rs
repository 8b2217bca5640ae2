//! Cookies set by the auth routes.

use std::time::Duration;

use axum::{
    http::{header::SET_COOKIE, HeaderName},
    response::AppendHeaders,
};
use axum_extra::extract::cookie::{Cookie, SameSite};

use crate::config::AuthConfig;

pub const STATE_COOKIE: &str = "oauth_state";
pub const RETURN_TO_COOKIE: &str = "return_to";
pub const SESSION_COOKIE: &str = "session_token";
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

fn build(name: &'static str, value: String, max_age: Duration, config: &AuthConfig) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .secure(config.use_https)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(max_age.as_secs() as i64))
        .build()
}

/// Short-lived cookie carrying login state to the callback.
pub fn flow_cookie(name: &'static str, value: String, config: &AuthConfig) -> Cookie<'static> {
    build(name, value, config.flow_cookie_ttl, config)
}

/// Cookie carrying the session or the access token.
pub fn session_cookie(name: &'static str, value: String, config: &AuthConfig) -> Cookie<'static> {
    build(name, value, config.session_ttl, config)
}

/// Empty cookie that makes the browser drop `name` immediately.
pub fn expired_cookie(name: &'static str, config: &AuthConfig) -> Cookie<'static> {
    build(name, String::new(), Duration::ZERO, config)
}

/// `Set-Cookie` headers carrying each value verbatim.
///
/// `CookieJar` percent-encodes on write, so `/dashboard` would reach the
/// browser as `%2Fdashboard`. Values written here are base64url tokens,
/// provider tokens, or paths accepted by `validate_return_to`.
pub fn set_cookie_headers(
    cookies: impl IntoIterator<Item = Cookie<'static>>,
) -> AppendHeaders<Vec<(HeaderName, String)>> {
    AppendHeaders(
        cookies
            .into_iter()
            .map(|cookie| (SET_COOKIE, cookie.to_string()))
            .collect(),
    )
}
