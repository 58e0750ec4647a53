//! # Files API Server
//!
//! REST backend for files. See `taskfiles_api::config` for the
//! environment variables it reads.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskfiles-api --bin files-api
//! ```

use taskfiles_api::{config::Service, server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "taskfiles_api=debug,taskfiles_shared=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    server::run(Service::Files).await
}
