//! Mementoria server binary.

use std::sync::Arc;

use log::{error, info, warn};
use mementoria_server::auth::UpstreamAuthHandler;
use mementoria_server::config::ServerConfig;
use mementoria_server::{prepare_database, serve, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;

    let logging = match config.log_dir.as_deref() {
        Some(dir) => mementoria_core::init_logging(&config.log_level, dir),
        None => mementoria_core::init_stderr_logging(&config.log_level),
    };
    if let Err(err) = logging {
        eprintln!("mementoria-server: logging disabled: {err}");
    }

    let database_url = config.database_url.clone();
    match tokio::task::spawn_blocking(move || prepare_database(&database_url)).await {
        Ok(Ok(version)) => {
            info!("event=db_ready module=server status=ok schema_version={version}")
        }
        Ok(Err(err)) => {
            error!("event=db_ready module=server status=error error={err}; continuing without database")
        }
        Err(err) => warn!("event=db_ready module=server status=error error={err}"),
    }

    let auth = UpstreamAuthHandler::new(config.auth_upstream_url.as_str())?;
    info!(
        "event=auth_relay_config module=server status=ok upstream={}",
        auth.base_url()
    );
    let state = Arc::new(AppState::new(Arc::new(auth), config.client_origin.clone()));

    serve(config.bind_addr(), state).await?;
    Ok(())
}
