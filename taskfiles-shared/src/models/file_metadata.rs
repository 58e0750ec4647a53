/// File metadata model and database operations
///
/// One row per uploaded blob. The files API creates and deletes rows; the
/// batch processor rewrites `blob_name` and `file_name` after renaming a
/// blob. Nothing ties a row to its blob transactionally, so a row may point
/// at a key that no longer exists.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE file_metadata (
///     id BIGSERIAL PRIMARY KEY,
///     file_name VARCHAR(255) NOT NULL,
///     blob_name VARCHAR(500) NOT NULL,
///     file_size BIGINT NOT NULL,
///     content_type VARCHAR(100) NOT NULL DEFAULT 'application/octet-stream',
///     uploaded_by VARCHAR(100) NOT NULL,
///     uploaded_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// Width of the `file_name` column, in characters
pub const MAX_FILE_NAME_CHARS: usize = 255;

/// Width of the `content_type` column, in characters
pub const MAX_CONTENT_TYPE_CHARS: usize = 100;

/// Metadata for an uploaded file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct FileMetadata {
    /// Unique file ID
    pub id: i64,

    /// Display name (original upload name until processed)
    pub file_name: String,

    /// Key of the backing object in the blob container
    pub blob_name: String,

    /// Size in bytes
    pub file_size: i64,

    /// MIME type served on download
    pub content_type: String,

    /// Username of the uploader
    pub uploaded_by: String,

    /// Upload time
    pub uploaded_at: DateTime<Utc>,
}

/// Input for recording an upload
#[derive(Debug, Clone)]
pub struct CreateFileMetadata {
    pub file_name: String,
    pub blob_name: String,
    pub file_size: i64,
    pub content_type: String,
    pub uploaded_by: String,
}

impl FileMetadata {
    /// Inserts a metadata row
    pub async fn create(pool: &PgPool, data: CreateFileMetadata) -> Result<Self, sqlx::Error> {
        let file = sqlx::query_as::<_, FileMetadata>(
            r#"
            INSERT INTO file_metadata (file_name, blob_name, file_size, content_type, uploaded_by)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, file_name, blob_name, file_size, content_type, uploaded_by, uploaded_at
            "#,
        )
        .bind(data.file_name)
        .bind(data.blob_name)
        .bind(data.file_size)
        .bind(data.content_type)
        .bind(data.uploaded_by)
        .fetch_one(pool)
        .await?;

        Ok(file)
    }

    /// Finds a metadata row by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let file = sqlx::query_as::<_, FileMetadata>(
            r#"
            SELECT id, file_name, blob_name, file_size, content_type, uploaded_by, uploaded_at
            FROM file_metadata
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(file)
    }

    /// Lists all metadata rows ordered by ID
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let files = sqlx::query_as::<_, FileMetadata>(
            r#"
            SELECT id, file_name, blob_name, file_size, content_type, uploaded_by, uploaded_at
            FROM file_metadata
            ORDER BY id
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(files)
    }

    /// Deletes a metadata row
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM file_metadata WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Points the first row referencing `old_blob_name` at `new_blob_name`
    ///
    /// Both `blob_name` and `file_name` take the new key. Only the
    /// lowest-ID match is touched if several rows share the old key. Returns
    /// the updated row, or None if nothing referenced the old key.
    pub async fn rename_blob(
        pool: &PgPool,
        old_blob_name: &str,
        new_blob_name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let file = sqlx::query_as::<_, FileMetadata>(
            r#"
            UPDATE file_metadata
            SET blob_name = $2,
                file_name = $2
            WHERE id = (
                SELECT id FROM file_metadata
                WHERE blob_name = $1
                ORDER BY id
                LIMIT 1
            )
            RETURNING id, file_name, blob_name, file_size, content_type, uploaded_by, uploaded_at
            "#,
        )
        .bind(old_blob_name)
        .bind(new_blob_name)
        .fetch_optional(pool)
        .await?;

        Ok(file)
    }
}
