/// Process startup shared by the `tasks-api` and `files-api` binaries
///
/// Order: config, database pool, migrations, demo users, blob store (files
/// only), router, then serve until Ctrl-C.

use anyhow::Context;
use taskfiles_shared::{
    db::{
        migrations::run_migrations,
        pool::{close_pool, create_pool, DatabaseConfig},
    },
    models::user::seed_demo_users,
    storage,
};
use tokio::net::TcpListener;

use crate::{
    app::{build_files_router, build_tasks_router, AppState},
    config::{Config, Service},
};

/// Loads configuration for `service` and serves it until shutdown
pub async fn run(service: Service) -> anyhow::Result<()> {
    let config = Config::from_env(service)?;
    tracing::info!(
        service = %service,
        version = env!("CARGO_PKG_VERSION"),
        "Starting API server"
    );

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await
    .context("Failed to connect to database")?;

    if config.run_migrations {
        run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;
    }

    if config.seed_demo_users {
        let created = seed_demo_users(&pool)
            .await
            .context("Failed to provision demo users")?;
        tracing::info!(created, "Demo users provisioned");
    }

    let bind_address = config.bind_address();
    let app = match service {
        Service::Tasks => build_tasks_router(AppState::new(pool.clone(), config)),
        Service::Files => {
            let blobs = storage::connect(&config.blob).await?;
            if config.blob.create_container && blobs.create_container_if_missing().await? {
                tracing::info!(container = %blobs.container(), "Created blob container");
            }
            build_files_router(AppState::new(pool.clone(), config).with_blob_store(blobs))
        }
    };

    let listener = TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    tracing::info!("Shutdown signal received, draining connections");
}
