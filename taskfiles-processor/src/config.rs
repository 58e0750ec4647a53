/// Configuration for the file processor
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `PROCESSED_MARKER`: Substring marking processed keys (default: -processed)
/// - `BLOB_*`: Blob storage, see `taskfiles_shared::storage::BlobStoreConfig`

use std::env;

use anyhow::Context;
use taskfiles_shared::storage::{BlobStoreConfig, DEFAULT_PROCESSED_MARKER};

#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    /// PostgreSQL connection URL
    pub database_url: String,

    pub blob: BlobStoreConfig,

    /// Keys containing this are skipped; renamed keys get it inserted
    pub processed_marker: String,
}

impl ProcessorConfig {
    /// Loads configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let processed_marker = env::var("PROCESSED_MARKER")
            .ok()
            .filter(|marker| !marker.is_empty())
            .unwrap_or_else(|| DEFAULT_PROCESSED_MARKER.to_string());

        let blob = BlobStoreConfig::from_env().context("Invalid blob storage configuration")?;

        Ok(Self {
            database_url,
            blob,
            processed_marker,
        })
    }
}
