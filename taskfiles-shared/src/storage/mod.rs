/// Blob storage abstraction
///
/// The files API and the batch processor only talk to blob storage through
/// the [`BlobStore`] trait. Two backends exist:
///
/// - [`s3::S3BlobStore`]: any S3-compatible service (AWS, MinIO, LocalStack)
/// - [`memory::MemoryBlobStore`]: process-local map for tests and local runs
///
/// A store is bound to one container (bucket) at construction time.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use taskfiles_shared::storage::{memory::MemoryBlobStore, upload_key, BlobStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MemoryBlobStore::new("files");
/// let key = upload_key("report.pdf");
///
/// store.upload(&key, Bytes::from_static(b"%PDF"), "application/pdf").await?;
/// let object = store.download(&key).await?;
/// assert_eq!(object.content_type, "application/pdf");
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod s3;

use std::{env, sync::Arc};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::models::file_metadata::MAX_FILE_NAME_CHARS;

/// Content type used when nothing better is known
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Marker inserted into keys by the batch processor
pub const DEFAULT_PROCESSED_MARKER: &str = "-processed";

/// Error type for blob storage operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No object with this key
    #[error("Blob not found: {0}")]
    NotFound(String),

    /// The container (bucket) does not exist
    #[error("Container not found: {0}")]
    ContainerNotFound(String),

    /// Invalid backend configuration
    #[error("Invalid storage configuration: {0}")]
    Config(String),

    /// Any other backend failure
    #[error("Storage backend error: {0}")]
    Backend(String),
}

/// One entry of a container listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobItem {
    pub key: String,
    /// Size in bytes, if the backend reported it
    pub size: Option<i64>,
}

/// A downloaded object
#[derive(Debug, Clone)]
pub struct BlobObject {
    pub data: Bytes,
    pub content_type: String,
}

/// Key-addressed object storage bound to a single container
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Name of the container this store operates on
    fn container(&self) -> &str;

    /// Whether the container exists
    async fn container_exists(&self) -> Result<bool, StorageError>;

    /// Creates the container unless it already exists
    ///
    /// Returns `true` if it was created by this call.
    async fn create_container_if_missing(&self) -> Result<bool, StorageError>;

    /// Stores `data` under `key`, replacing any existing object
    async fn upload(&self, key: &str, data: Bytes, content_type: &str)
        -> Result<(), StorageError>;

    /// Fetches an object
    ///
    /// # Errors
    ///
    /// `StorageError::NotFound` if there is no object under `key`.
    async fn download(&self, key: &str) -> Result<BlobObject, StorageError>;

    /// Deletes an object if present
    ///
    /// Returns `true` if something was deleted. A missing object is not an
    /// error.
    async fn delete_if_exists(&self, key: &str) -> Result<bool, StorageError>;

    /// Lists every object in the container
    async fn list(&self) -> Result<Vec<BlobItem>, StorageError>;

    /// Copies `source` to `destination` within the container
    async fn copy(&self, source: &str, destination: &str) -> Result<(), StorageError>;
}

/// Which [`BlobStore`] implementation to build
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobBackend {
    S3,
    Memory,
}

impl std::str::FromStr for BlobBackend {
    type Err = StorageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s3" => Ok(BlobBackend::S3),
            "memory" => Ok(BlobBackend::Memory),
            other => Err(StorageError::Config(format!(
                "unknown BLOB_BACKEND '{}' (expected 's3' or 'memory')",
                other
            ))),
        }
    }
}

/// Blob storage settings shared by the files API and the processor
#[derive(Debug, Clone)]
pub struct BlobStoreConfig {
    pub backend: BlobBackend,

    /// Container (bucket) name
    pub container: String,

    /// Custom S3 endpoint, e.g. `http://localhost:9000` for MinIO
    pub endpoint_url: Option<String>,

    pub region: String,

    /// Whether services should create the container on startup
    pub create_container: bool,
}

impl Default for BlobStoreConfig {
    fn default() -> Self {
        Self {
            backend: BlobBackend::S3,
            container: "files".to_string(),
            endpoint_url: None,
            region: "us-east-1".to_string(),
            create_container: true,
        }
    }
}

impl BlobStoreConfig {
    /// Reads `BLOB_*` environment variables
    pub fn from_env() -> Result<Self, StorageError> {
        let defaults = Self::default();

        let backend = match env::var("BLOB_BACKEND") {
            Ok(value) => value.parse()?,
            Err(_) => defaults.backend,
        };

        let container = env::var("BLOB_CONTAINER")
            .ok()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(defaults.container);

        let endpoint_url = env::var("BLOB_ENDPOINT_URL")
            .ok()
            .filter(|u| !u.trim().is_empty());

        let region = env::var("BLOB_REGION").unwrap_or(defaults.region);

        let create_container = match env::var("BLOB_CREATE_CONTAINER") {
            Ok(value) => value.parse::<bool>().map_err(|_| {
                StorageError::Config(format!("BLOB_CREATE_CONTAINER must be true or false, got '{}'", value))
            })?,
            Err(_) => defaults.create_container,
        };

        Ok(Self {
            backend,
            container,
            endpoint_url,
            region,
            create_container,
        })
    }
}

/// Builds the configured blob store
pub async fn connect(config: &BlobStoreConfig) -> Result<Arc<dyn BlobStore>, StorageError> {
    info!(
        backend = ?config.backend,
        container = %config.container,
        "Connecting to blob storage"
    );

    let store: Arc<dyn BlobStore> = match config.backend {
        BlobBackend::S3 => Arc::new(s3::S3BlobStore::from_config(config).await),
        BlobBackend::Memory => Arc::new(memory::MemoryBlobStore::new(&config.container)),
    };

    Ok(store)
}

/// Characters [`upload_key`] puts in front of the name
const UPLOAD_KEY_PREFIX_CHARS: usize = 37;

/// Characters of the `-{yyyyMMddHHmmss}` part of a processed key
const PROCESSED_TIMESTAMP_CHARS: usize = 15;

/// Longest upload name accepted by the files API
///
/// The processor stores the whole processed key in `file_name`, so the
/// upload prefix, the default marker and the timestamp must fit as well.
pub const MAX_UPLOAD_NAME_CHARS: usize = MAX_FILE_NAME_CHARS
    - UPLOAD_KEY_PREFIX_CHARS
    - DEFAULT_PROCESSED_MARKER.len()
    - PROCESSED_TIMESTAMP_CHARS;

/// Key for a new upload: `{uuid}_{file_name}`
pub fn upload_key(file_name: &str) -> String {
    format!("{}_{}", Uuid::new_v4(), file_name)
}

/// Whether the batch processor already renamed this key
pub fn is_processed(key: &str, marker: &str) -> bool {
    key.contains(marker)
}

/// Key a processed blob is moved to: `{stem}{marker}-{yyyyMMddHHmmss}{ext}`
///
/// Any directory prefix is kept. The extension starts at the last `.` of the
/// final path segment; a segment that only starts with a dot has none.
pub fn processed_key(key: &str, marker: &str, processed_at: DateTime<Utc>) -> String {
    let (dir, name) = match key.rfind('/') {
        Some(idx) => key.split_at(idx + 1),
        None => ("", key),
    };

    let (stem, ext) = match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    };

    format!(
        "{}{}{}-{}{}",
        dir,
        stem,
        marker,
        processed_at.format("%Y%m%d%H%M%S"),
        ext
    )
}
