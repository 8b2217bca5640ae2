use axum::{
    extract::{Request, State},
    http::{
        header::{
            ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS,
            ACCESS_CONTROL_ALLOW_METHODS, ACCESS_CONTROL_ALLOW_ORIGIN, HOST, ORIGIN,
        },
        HeaderMap, HeaderName, HeaderValue, Method, StatusCode,
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use bff_core::ErrorCode;
use url::Url;

use crate::response::send_error;

pub const ALLOWED_METHODS: &str = "GET, POST, PUT, PATCH, DELETE, OPTIONS";
pub const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

const DENIED_MESSAGE: &str = "CORS origin not allowed";
const SEC_FETCH_SITE: HeaderName = HeaderName::from_static("sec-fetch-site");

#[derive(Debug, thiserror::Error)]
pub enum OriginError {
    #[error("invalid trusted origin {origin:?}: {reason}")]
    Invalid { origin: String, reason: &'static str },
}

/// Allow-listed origin plus the cross-origin rules applied to every request.
#[derive(Debug, Clone)]
pub struct OriginGuard {
    origin: String,
    origin_header: HeaderValue,
}

impl OriginGuard {
    /// Accepts only `http`/`https` origins such as `https://app.example.com:8443`.
    pub fn new(trusted_origin: &str) -> Result<Self, OriginError> {
        let invalid = |reason| OriginError::Invalid {
            origin: trusted_origin.to_string(),
            reason,
        };

        let url = Url::parse(trusted_origin).map_err(|_| invalid("not an absolute URL"))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(invalid("scheme must be http or https"));
        }
        if url.host_str().is_none() {
            return Err(invalid("missing host"));
        }
        if !url.username().is_empty() || url.password().is_some() {
            return Err(invalid("credentials are not allowed"));
        }
        if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
            return Err(invalid("path, query and fragment are not allowed"));
        }

        let origin = url.origin().ascii_serialization();
        let origin_header =
            HeaderValue::from_str(&origin).map_err(|_| invalid("not a valid header value"))?;

        Ok(Self {
            origin,
            origin_header,
        })
    }

    pub fn trusted_origin(&self) -> &str {
        &self.origin
    }

    /// Returns the denial reason when the request must not reach the handler.
    pub fn check(&self, method: &Method, headers: &HeaderMap) -> Result<(), &'static str> {
        if method == Method::GET || method == Method::HEAD {
            return Ok(());
        }

        let origin = headers.get(ORIGIN).and_then(|v| v.to_str().ok());

        if let Some(site) = headers.get(SEC_FETCH_SITE) {
            let site = site.to_str().unwrap_or_default();
            if site == "same-origin" || site == "none" {
                return Ok(());
            }
            return match origin {
                Some(origin) if origin == self.origin => Ok(()),
                _ => Err("cross-site request from untrusted origin"),
            };
        }

        let Some(origin) = origin else {
            // Non-browser clients send neither header.
            return Ok(());
        };

        if origin == self.origin {
            return Ok(());
        }

        let host = headers.get(HOST).and_then(|v| v.to_str().ok());
        match (origin_authority(origin), host) {
            (Some(authority), Some(host)) if authority.eq_ignore_ascii_case(host) => Ok(()),
            _ => Err("origin does not match host or trusted origin"),
        }
    }

    /// Sets the CORS response headers.
    pub fn apply_headers(&self, headers: &mut HeaderMap) {
        headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, self.origin_header.clone());
        headers.insert(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        );
        headers.insert(
            ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
    }
}

/// `host[:port]` of an origin, as a browser would send it in `Host`.
fn origin_authority(origin: &str) -> Option<String> {
    let url = Url::parse(origin).ok()?;
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

/// Answers preflights, rejects untrusted cross-origin writes and sets CORS
/// headers on everything else.
///
/// Use with [`axum::middleware::from_fn_with_state`].
pub async fn protect_origin(
    State(guard): State<OriginGuard>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else if let Err(reason) = guard.check(request.method(), request.headers()) {
        tracing::warn!(
            method = %request.method(),
            path = %request.uri().path(),
            origin = request
                .headers()
                .get(ORIGIN)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default(),
            reason,
            "cross-origin request denied"
        );
        send_error(StatusCode::FORBIDDEN, ErrorCode::Forbidden, DENIED_MESSAGE)
    } else {
        next.run(request).await
    };

    guard.apply_headers(response.headers_mut());
    response
}
