use std::sync::Arc;

use anyhow::Context;
use axum::{extract::Request, ServiceExt};

use crate::app::{self, AppState};
use crate::auth::TokenVerifier;
use crate::config::AppConfig;

pub async fn handle(config: AppConfig) -> anyhow::Result<()> {
    if config.uses_default_secret() {
        if config.is_production() {
            tracing::warn!("JWT_SECRET is not set; production is running with the development secret");
        } else {
            tracing::info!("Using development JWT secret");
        }
    }

    let (manager, store) = super::prepare_store(&config).await?;

    let state = AppState::new(Arc::new(store), TokenVerifier::new(&config.security.jwt_secret));
    let service = app::service(state, &config.security.cors_origins);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("tasks-service listening on http://{}", bind_addr);

    axum::serve(listener, ServiceExt::<Request>::into_make_service(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    manager.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
