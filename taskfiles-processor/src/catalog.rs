/// Metadata rows the processor rewrites
///
/// The processor only needs one operation: point the row that references a
/// blob key at its new key. [`PgCatalog`] does that against `file_metadata`;
/// [`MemoryCatalog`] keeps rows in memory for tests and dry runs.

use std::sync::Mutex;

use async_trait::async_trait;
use sqlx::PgPool;
use taskfiles_shared::models::file_metadata::FileMetadata;

/// Store of blob references
#[async_trait]
pub trait MetadataCatalog: Send + Sync {
    /// Rewrites the first row whose blob key is `old_key`
    ///
    /// Both the blob key and the display name become `new_key`. Returns the
    /// updated row's id, or None when no row referenced `old_key`.
    async fn rename_blob(&self, old_key: &str, new_key: &str) -> Result<Option<i64>, sqlx::Error>;
}

/// [`MetadataCatalog`] over the `file_metadata` table
#[derive(Debug, Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MetadataCatalog for PgCatalog {
    async fn rename_blob(&self, old_key: &str, new_key: &str) -> Result<Option<i64>, sqlx::Error> {
        let row = FileMetadata::rename_blob(&self.pool, old_key, new_key).await?;
        Ok(row.map(|file| file.id))
    }
}

/// A row as seen by [`MemoryCatalog`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub id: i64,
    pub file_name: String,
    pub blob_name: String,
}

/// In-memory [`MetadataCatalog`]
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    entries: Mutex<Vec<CatalogEntry>>,
}

impl MemoryCatalog {
    /// Adds a row and returns its id
    pub fn insert(&self, file_name: &str, blob_name: &str) -> i64 {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let id = entries.iter().map(|e| e.id).max().unwrap_or(0) + 1;
        entries.push(CatalogEntry {
            id,
            file_name: file_name.to_string(),
            blob_name: blob_name.to_string(),
        });
        id
    }

    /// Snapshot of all rows in id order
    pub fn entries(&self) -> Vec<CatalogEntry> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl MetadataCatalog for MemoryCatalog {
    async fn rename_blob(&self, old_key: &str, new_key: &str) -> Result<Option<i64>, sqlx::Error> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        Ok(entries
            .iter_mut()
            .find(|entry| entry.blob_name == old_key)
            .map(|entry| {
                entry.blob_name = new_key.to_string();
                entry.file_name = new_key.to_string();
                entry.id
            }))
    }
}
