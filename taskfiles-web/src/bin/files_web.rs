//! # Files Web Frontend
//!
//! Server-rendered UI for the files API. Requires `API_BASE_URL`; see
//! `taskfiles_web::config` for the other variables.
//!
//! ## Usage
//!
//! ```bash
//! API_BASE_URL=http://localhost:8081 cargo run -p taskfiles-web --bin files-web
//! ```

use taskfiles_web::{config::Frontend, server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskfiles_web=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    server::run(Frontend::Files).await
}
