//! Authentication pass-through.
//!
//! # Responsibility
//! - Hand every `/api/auth/*` request to an external `AuthHandler`.
//! - Mirror the handler's status, headers and body back to the caller.
//!
//! # Invariants
//! - No authentication decision is made here.
//! - Any relay failure becomes `500 {"error":..., "code":"AUTH_FAILURE"}`.
//! - Hop-by-hop headers are not forwarded in either direction.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body, Bytes},
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use log::{debug, error};

use crate::AppState;

/// Largest request body relayed to the auth handler.
pub const MAX_AUTH_BODY_BYTES: usize = 1024 * 1024;
const RELAY_TIMEOUT: Duration = Duration::from_secs(10);

/// Request as seen by the external handler.
#[derive(Debug, Clone)]
pub struct AuthRequest {
    pub method: Method,
    /// Original path and query, e.g. `/api/auth/sign-in/email?redirect=1`.
    pub path_and_query: String,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Response relayed back verbatim.
#[derive(Debug, Clone)]
pub struct AuthResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

#[derive(Debug)]
pub enum AuthRelayError {
    /// Incoming body could not be read or exceeded `MAX_AUTH_BODY_BYTES`.
    RequestBody(axum::Error),
    /// Upstream could not be reached or answered unreadably.
    Upstream(reqwest::Error),
    /// Handler-specific failure.
    Handler(String),
}

impl Display for AuthRelayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RequestBody(err) => write!(f, "failed to read auth request body: {err}"),
            Self::Upstream(err) => write!(f, "auth upstream failed: {err}"),
            Self::Handler(message) => write!(f, "auth handler failed: {message}"),
        }
    }
}

impl Error for AuthRelayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::RequestBody(err) => Some(err),
            Self::Upstream(err) => Some(err),
            Self::Handler(_) => None,
        }
    }
}

impl From<reqwest::Error> for AuthRelayError {
    fn from(value: reqwest::Error) -> Self {
        Self::Upstream(value)
    }
}

/// External authentication handler.
#[async_trait]
pub trait AuthHandler: Send + Sync {
    async fn handle(&self, request: AuthRequest) -> Result<AuthResponse, AuthRelayError>;
}

/// Forwards auth traffic to an HTTP service (e.g. a dedicated auth server).
pub struct UpstreamAuthHandler {
    client: reqwest::Client,
    base_url: String,
}

impl UpstreamAuthHandler {
    /// `base_url` is joined with the original path, so
    /// `http://auth:4000` + `/api/auth/session` -> `http://auth:4000/api/auth/session`.
    pub fn new(base_url: impl Into<String>) -> Result<Self, AuthRelayError> {
        let client = reqwest::Client::builder()
            .timeout(RELAY_TIMEOUT)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl AuthHandler for UpstreamAuthHandler {
    async fn handle(&self, request: AuthRequest) -> Result<AuthResponse, AuthRelayError> {
        let url = format!("{}{}", self.base_url, request.path_and_query);
        let response = self
            .client
            .request(request.method, url)
            .headers(strip_hop_by_hop(request.headers))
            .body(request.body)
            .send()
            .await?;

        let status = response.status();
        let headers = strip_hop_by_hop(response.headers().clone());
        let body = response.bytes().await?;
        Ok(AuthResponse {
            status,
            headers,
            body,
        })
    }
}

/// `GET|POST /api/auth/*` handler.
pub async fn auth_relay(State(state): State<Arc<AppState>>, request: Request) -> Response {
    match relay(state.auth.as_ref(), request).await {
        Ok(response) => response,
        Err(err) => {
            error!("event=auth_relay module=server status=error error={err}");
            auth_failure()
        }
    }
}

async fn relay(handler: &dyn AuthHandler, request: Request) -> Result<Response, AuthRelayError> {
    let (parts, body) = request.into_parts();
    let body = to_bytes(body, MAX_AUTH_BODY_BYTES)
        .await
        .map_err(AuthRelayError::RequestBody)?;
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|value| value.as_str().to_string())
        .unwrap_or_else(|| parts.uri.path().to_string());

    let method = parts.method.clone();
    let relayed = handler
        .handle(AuthRequest {
            method: parts.method,
            path_and_query,
            headers: parts.headers,
            body,
        })
        .await?;

    debug!(
        "event=auth_relay module=server status=ok method={} upstream_status={}",
        method,
        relayed.status.as_u16()
    );

    let mut response = Response::new(Body::from(relayed.body));
    *response.status_mut() = relayed.status;
    *response.headers_mut() = strip_hop_by_hop(relayed.headers);
    Ok(response)
}

/// The fixed payload for any relay failure.
pub fn auth_failure() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({
            "error": "Internal authentication error",
            "code": "AUTH_FAILURE",
        })),
    )
        .into_response()
}

fn strip_hop_by_hop(mut headers: HeaderMap) -> HeaderMap {
    let hop_by_hop: [HeaderName; 5] = [
        header::HOST,
        header::CONNECTION,
        header::CONTENT_LENGTH,
        header::TRANSFER_ENCODING,
        header::UPGRADE,
    ];
    for name in &hop_by_hop {
        headers.remove(name);
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_hop_by_hop_keeps_end_to_end_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "localhost".parse().unwrap());
        headers.insert(header::CONTENT_LENGTH, "12".parse().unwrap());
        headers.insert(header::SET_COOKIE, "session=abc".parse().unwrap());
        headers.insert(header::CONTENT_TYPE, "application/json".parse().unwrap());

        let stripped = strip_hop_by_hop(headers);
        assert!(stripped.get(header::HOST).is_none());
        assert!(stripped.get(header::CONTENT_LENGTH).is_none());
        assert_eq!(stripped[header::SET_COOKIE], "session=abc");
        assert_eq!(stripped.len(), 2);
    }

    #[test]
    fn upstream_base_url_drops_trailing_slash() {
        let handler = UpstreamAuthHandler::new("http://auth.internal:4000/").unwrap();
        assert_eq!(handler.base_url(), "http://auth.internal:4000");
    }
}
