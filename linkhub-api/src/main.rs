mod auth;
mod context;
mod error;
mod geoip;
mod repository;
mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use linkhub_core::config::CoreConfig;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::auth::AuthKeys;
use crate::geoip::GeoResolver;
use crate::repository::HubRepository;
use crate::routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(err) = linkhub_core::logging::init_tracing(None) {
        eprintln!("⚠️ failed to initialise tracing: {err}");
    }

    let config = CoreConfig::from_env().context("failed to load configuration")?;
    let bind_addr: SocketAddr = config
        .http_bind
        .clone()
        .unwrap_or_else(|| "0.0.0.0:8080".to_string())
        .parse()
        .context("invalid bind address")?;

    let repository = HubRepository::from_config(&config).await?;

    let geo = match config.geoip_db.as_deref() {
        Some(path) => GeoResolver::open(path)?,
        None => {
            warn!("HUB_GEOIP_DB not set; visitor countries will not resolve");
            GeoResolver::disabled()
        }
    };

    let jwt_secret = match config.jwt_secret.clone() {
        Some(secret) => secret,
        None if config.is_production() => {
            anyhow::bail!("HUB_JWT_SECRET is required in production")
        }
        None => {
            warn!("HUB_JWT_SECRET not set; using the development secret");
            "linkhub-dev-secret".to_string()
        }
    };

    let state = AppState {
        repository,
        auth: AuthKeys::new(&jwt_secret),
        geo: Arc::new(geo),
        trust_forwarded: config.trust_forwarded,
    };

    let app = routes::router(state);

    let listener = TcpListener::bind(bind_addr)
        .await
        .context("failed to bind TCP listener")?;
    let actual_addr = listener
        .local_addr()
        .context("failed to read socket address")?;
    info!(%actual_addr, "starting linkhub-api service");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server terminated with error")?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sigterm) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sigterm.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
