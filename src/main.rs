use std::sync::Arc;

use anyhow::Context;
use chat_relay::{config::RelayConfig, routes, state::AppState};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,chat_relay=debug,tower_http=info".into()),
        )
        .init();

    let config = RelayConfig::from_env().context("loading relay configuration")?;
    info!(?config, "starting chat relay");

    let bind_addr = config.bind_addr.clone();
    let state = Arc::new(AppState::new(config).context("building upstream client")?);

    let app = routes::create_router().with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {bind_addr}"))?;

    info!(addr = %listener.local_addr()?, "chat relay listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("chat relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}
