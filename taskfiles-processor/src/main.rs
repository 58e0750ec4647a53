//! # Taskfiles File Processor
//!
//! Renames every unprocessed blob in the files container to
//! `{name}-processed-{yyyyMMddHHmmss}{ext}` and updates its metadata row,
//! then exits. Any failure exits non-zero.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskfiles-processor --bin file-processor
//! ```

use std::sync::Arc;

use taskfiles_processor::{
    catalog::PgCatalog,
    config::ProcessorConfig,
    processor::{FileProcessor, ProcessingSummary},
};
use taskfiles_shared::{
    db::pool::{close_pool, create_pool, DatabaseConfig},
    storage,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskfiles_processor=info,taskfiles_shared=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "File processor v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    match run().await {
        Ok(summary) => {
            tracing::info!(
                processed = summary.processed,
                skipped = summary.skipped,
                "File processor finished"
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "File processing failed");
            Err(e)
        }
    }
}

async fn run() -> anyhow::Result<ProcessingSummary> {
    let config = ProcessorConfig::from_env()?;

    let pool = create_pool(DatabaseConfig::single_connection(&config.database_url)).await?;
    let blobs = storage::connect(&config.blob).await?;

    let processor = FileProcessor::new(
        blobs,
        Arc::new(PgCatalog::new(pool.clone())),
        config.processed_marker,
    );
    let result = processor.run().await;

    close_pool(pool).await;
    Ok(result?)
}
