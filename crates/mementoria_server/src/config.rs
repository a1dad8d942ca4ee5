//! Environment-driven server settings.
//!
//! # Responsibility
//! - Read `PORT`, `CLIENT_ORIGIN`, `DATABASE_URL`, `AUTH_UPSTREAM_URL`,
//!   `LOG_LEVEL` and `LOG_DIR` with documented defaults.
//! - Reject malformed values before the server binds.

use axum::http::HeaderValue;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::{Ipv4Addr, SocketAddr};

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CLIENT_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_DATABASE_URL: &str = "mementoria.sqlite3";
pub const DEFAULT_AUTH_UPSTREAM_URL: &str = "http://127.0.0.1:4000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidPort(String),
    InvalidOrigin(String),
    InvalidUpstreamUrl(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPort(value) => write!(f, "PORT must be a number in 1..=65535, got `{value}`"),
            Self::InvalidOrigin(value) => {
                write!(f, "CLIENT_ORIGIN must be an http(s) origin, got `{value}`")
            }
            Self::InvalidUpstreamUrl(value) => {
                write!(f, "AUTH_UPSTREAM_URL must be an http(s) url, got `{value}`")
            }
        }
    }
}

impl Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// Single origin allowed by CORS, with credentials.
    pub client_origin: HeaderValue,
    pub database_url: String,
    pub auth_upstream_url: String,
    pub log_level: String,
    /// Absolute directory for rolling logs; `None` logs to stderr.
    pub log_dir: Option<String>,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from any key lookup; unset or blank keys use defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let port = match get("PORT") {
            Some(raw) => match raw.parse::<u16>() {
                Ok(port) if port > 0 => port,
                _ => return Err(ConfigError::InvalidPort(raw)),
            },
            None => DEFAULT_PORT,
        };

        let origin = get("CLIENT_ORIGIN").unwrap_or_else(|| DEFAULT_CLIENT_ORIGIN.to_string());
        if !is_http_url(&origin) {
            return Err(ConfigError::InvalidOrigin(origin));
        }
        let client_origin = HeaderValue::from_str(origin.trim_end_matches('/'))
            .map_err(|_| ConfigError::InvalidOrigin(origin.clone()))?;

        let auth_upstream_url =
            get("AUTH_UPSTREAM_URL").unwrap_or_else(|| DEFAULT_AUTH_UPSTREAM_URL.to_string());
        if !is_http_url(&auth_upstream_url) {
            return Err(ConfigError::InvalidUpstreamUrl(auth_upstream_url));
        }

        Ok(Self {
            port,
            client_origin,
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            auth_upstream_url,
            log_level: get("LOG_LEVEL")
                .unwrap_or_else(|| mementoria_core::default_log_level().to_string()),
            log_dir: get("LOG_DIR"),
        })
    }

    /// All interfaces on the configured port.
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}

fn is_http_url(value: &str) -> bool {
    let rest = value
        .strip_prefix("http://")
        .or_else(|| value.strip_prefix("https://"));
    matches!(rest, Some(host) if !host.is_empty())
}
