/// Process startup shared by the `tasks-web` and `files-web` binaries

use anyhow::Context;
use tokio::net::TcpListener;

use crate::{
    app::{build_files_app, build_tasks_app, WebState},
    config::{Config, Frontend},
};

/// Loads configuration for `frontend` and serves it until shutdown
pub async fn run(frontend: Frontend) -> anyhow::Result<()> {
    let config = Config::from_env(frontend)?;
    tracing::info!(
        frontend = %frontend,
        api = %config.api_base_url,
        version = env!("CARGO_PKG_VERSION"),
        "Starting web frontend"
    );

    let bind_address = config.bind_address();
    let state = WebState::new(config).context("Failed to build API client")?;
    let app = match frontend {
        Frontend::Tasks => build_tasks_app(state),
        Frontend::Files => build_files_app(state),
    };

    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    tracing::info!("Frontend listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Frontend stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received");
}
