//! Mementoria HTTP server.
//!
//! Serves the liveness check and relays authentication traffic to an
//! external handler. Scrapbook data never crosses this surface.

pub mod auth;
pub mod config;
pub mod health;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    http::{header, HeaderValue, Method},
    routing::get,
    Router,
};
use log::info;
use mementoria_core::db::{migrations::current_user_version, open_target, DbResult, DbTarget};
use tower_http::cors::CorsLayer;

use crate::auth::AuthHandler;

/// Shared application state.
pub struct AppState {
    pub auth: Arc<dyn AuthHandler>,
    /// The one browser origin allowed to call the API with credentials.
    pub client_origin: HeaderValue,
}

impl AppState {
    pub fn new(auth: Arc<dyn AuthHandler>, client_origin: HeaderValue) -> Self {
        Self {
            auth,
            client_origin,
        }
    }
}

/// Create the API router.
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(state.client_origin.clone())
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::COOKIE]);

    Router::new()
        .route("/health", get(health::health))
        .route("/api/health", get(health::health))
        // A catch-all does not match an empty tail, so the bare prefix is routed too.
        .route("/api/auth", get(auth::auth_relay).post(auth::auth_relay))
        .route("/api/auth/", get(auth::auth_relay).post(auth::auth_relay))
        .route(
            "/api/auth/{*path}",
            get(auth::auth_relay).post(auth::auth_relay),
        )
        .layer(cors)
        .with_state(state)
}

/// Opens (and migrates) the library database named by `database_url`.
///
/// Returns the schema version on success. Callers treat failure as
/// non-fatal: the HTTP surface does not depend on the database.
pub fn prepare_database(database_url: &str) -> DbResult<u32> {
    let target = DbTarget::parse(database_url)?;
    let conn = open_target(&target)?;
    current_user_version(&conn)
}

/// Start the server.
pub async fn serve(addr: SocketAddr, state: Arc<AppState>) -> std::io::Result<()> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        "event=server_listen module=server status=ok addr={}",
        listener.local_addr()?
    );
    axum::serve(listener, app).await
}
