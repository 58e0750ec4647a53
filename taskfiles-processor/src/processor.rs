/// The file processing pass
///
/// For every object in the container, in listing order:
///
/// 1. Keys containing the processed marker are skipped.
/// 2. Otherwise the object is copied to [`processed_key`], the original is
///    deleted, and the first metadata row referencing the old key is
///    rewritten to the new key.
///
/// The listing is taken once before anything is renamed, so objects created
/// by this pass are never revisited. Nothing is rolled back: a failure
/// aborts the pass, and a blob renamed without a matching row only produces
/// a warning.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use taskfiles_shared::storage::{is_processed, processed_key, BlobStore, StorageError};
use tracing::{info, warn};

use crate::catalog::MetadataCatalog;

/// Error type for a processing pass
#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Metadata update failed: {0}")]
    Catalog(#[from] sqlx::Error),
}

/// Counts reported at the end of a pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessingSummary {
    /// Objects renamed by this pass
    pub processed: usize,

    /// Objects already carrying the marker
    pub skipped: usize,

    /// Renamed objects with no metadata row to update
    pub missing_metadata: usize,

    /// The container did not exist, so nothing was looked at
    pub container_missing: bool,
}

/// Run-once blob renamer
pub struct FileProcessor {
    blobs: Arc<dyn BlobStore>,
    catalog: Arc<dyn MetadataCatalog>,
    marker: String,
    clock: fn() -> DateTime<Utc>,
}

impl FileProcessor {
    pub fn new(
        blobs: Arc<dyn BlobStore>,
        catalog: Arc<dyn MetadataCatalog>,
        marker: impl Into<String>,
    ) -> Self {
        Self {
            blobs,
            catalog,
            marker: marker.into(),
            clock: Utc::now,
        }
    }

    /// Replaces the timestamp source used for new keys
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Processes every object in the container once
    ///
    /// # Errors
    ///
    /// The first storage or database failure ends the pass; objects handled
    /// before it stay renamed.
    pub async fn run(&self) -> Result<ProcessingSummary, ProcessorError> {
        let container = self.blobs.container();
        let mut summary = ProcessingSummary::default();

        info!(container = %container, "Starting file processing");

        if !self.blobs.container_exists().await? {
            warn!(container = %container, "Container does not exist, nothing to process");
            summary.container_missing = true;
            return Ok(summary);
        }

        let items = self.blobs.list().await?;
        info!(count = items.len(), "Listed blobs");

        for item in items {
            info!(blob_key = %item.key, size = ?item.size, "Found blob");

            if is_processed(&item.key, &self.marker) {
                info!(blob_key = %item.key, "Already processed, skipping");
                summary.skipped += 1;
                continue;
            }

            let new_key = processed_key(&item.key, &self.marker, (self.clock)());

            self.blobs.copy(&item.key, &new_key).await?;
            if !self.blobs.delete_if_exists(&item.key).await? {
                warn!(blob_key = %item.key, "Original blob vanished before delete");
            }

            match self.catalog.rename_blob(&item.key, &new_key).await? {
                Some(file_id) => {
                    info!(
                        file_id,
                        from = %item.key,
                        to = %new_key,
                        "Blob processed and metadata updated"
                    );
                }
                None => {
                    warn!(
                        from = %item.key,
                        to = %new_key,
                        "Blob processed but no metadata row references it"
                    );
                    summary.missing_metadata += 1;
                }
            }

            summary.processed += 1;
        }

        info!(
            processed = summary.processed,
            skipped = summary.skipped,
            missing_metadata = summary.missing_metadata,
            "File processing completed"
        );

        Ok(summary)
    }
}
