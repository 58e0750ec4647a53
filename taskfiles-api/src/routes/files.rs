/// File endpoints
///
/// Bytes live in the blob store under `{uuid}_{file name}`; a
/// `file_metadata` row points at each blob. The two are written one after
/// the other without a transaction.
///
/// # Endpoints
///
/// - `GET    /api/files`              - List metadata
/// - `POST   /api/files/upload`       - Upload (multipart field `file`)
/// - `GET    /api/files/:id`          - Fetch metadata
/// - `GET    /api/files/:id/download` - Download the bytes
/// - `DELETE /api/files/:id`          - Delete blob and metadata

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use taskfiles_shared::{
    auth::middleware::AuthContext,
    models::file_metadata::{CreateFileMetadata, FileMetadata, MAX_CONTENT_TYPE_CHARS},
    storage::{upload_key, MAX_UPLOAD_NAME_CHARS},
};

/// Multipart field carrying the upload
pub const FILE_FIELD: &str = "file";

struct UploadedFile {
    file_name: String,
    content_type: String,
    data: Bytes,
}

fn file_not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("File {} not found", id))
}

fn no_file_uploaded() -> ApiError {
    ApiError::BadRequest("No file uploaded".to_string())
}

/// Strips any client-side directory from an upload name
fn base_name(file_name: &str) -> &str {
    file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
        .trim()
}

/// Safe `Content-Disposition` value for a download
///
/// The quoted `filename` is plain visible ASCII: control characters are
/// dropped, quotes, backslashes and non-ASCII characters become `_`. Any
/// name that needed this also gets the exact name as an RFC 5987 `filename*`.
fn content_disposition(file_name: &str) -> String {
    let sanitized: String = file_name
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| match c {
            '"' | '\\' => '_',
            c if !c.is_ascii() => '_',
            _ => c,
        })
        .collect();

    if sanitized == file_name && file_name.is_ascii() {
        return format!("attachment; filename=\"{}\"", file_name);
    }

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitized,
        urlencoding::encode(file_name)
    )
}

/// Rejects uploads whose metadata row would not fit the table
fn check_upload_limits(upload: &UploadedFile) -> ApiResult<()> {
    if upload.file_name.chars().count() > MAX_UPLOAD_NAME_CHARS {
        return Err(ApiError::BadRequest(format!(
            "File name must be at most {} characters",
            MAX_UPLOAD_NAME_CHARS
        )));
    }
    if upload.content_type.chars().count() > MAX_CONTENT_TYPE_CHARS {
        return Err(ApiError::BadRequest(format!(
            "Content type must be at most {} characters",
            MAX_CONTENT_TYPE_CHARS
        )));
    }
    Ok(())
}

/// Reads the `file` field, ignoring any other parts
async fn read_upload(mut multipart: Multipart) -> ApiResult<Option<UploadedFile>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = base_name(field.file_name().unwrap_or_default()).to_string();
        let declared_type = field.content_type().map(str::to_string);
        let data = field.bytes().await?;

        if file_name.is_empty() || data.is_empty() {
            return Ok(None);
        }

        let content_type = declared_type
            .filter(|ct| !ct.is_empty())
            .unwrap_or_else(|| {
                mime_guess::from_path(&file_name)
                    .first_or_octet_stream()
                    .to_string()
            });

        return Ok(Some(UploadedFile {
            file_name,
            content_type,
            data,
        }));
    }

    Ok(None)
}

/// List all file metadata ordered by id
pub async fn list_files(State(state): State<AppState>) -> ApiResult<Json<Vec<FileMetadata>>> {
    let files = FileMetadata::list(&state.db).await?;
    Ok(Json(files))
}

/// Fetch one metadata row
pub async fn get_file(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<FileMetadata>> {
    FileMetadata::find_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| file_not_found(id))
}

/// Upload a file
///
/// # Endpoint
///
/// ```text
/// POST /api/files/upload
/// Content-Type: multipart/form-data; boundary=...
/// ```
///
/// # Response
///
/// `201 Created` with `Location: /api/files/{id}` and the metadata row.
///
/// # Errors
///
/// - `400 Bad Request`: No `file` part, it is empty, or its name or content
///   type is too long
/// - `500 Internal Server Error`: Blob or database failure
pub async fn upload_file(
    State(state): State<AppState>,
    auth: AuthContext,
    multipart: Multipart,
) -> ApiResult<impl IntoResponse> {
    let blobs = state.blob_store()?;
    let upload = read_upload(multipart).await?.ok_or_else(no_file_uploaded)?;
    check_upload_limits(&upload)?;

    let blob_name = upload_key(&upload.file_name);
    let file_size = i64::try_from(upload.data.len())
        .map_err(|_| ApiError::BadRequest("File too large".to_string()))?;

    blobs
        .upload(&blob_name, upload.data, &upload.content_type)
        .await?;

    let file = FileMetadata::create(
        &state.db,
        CreateFileMetadata {
            file_name: upload.file_name,
            blob_name,
            file_size,
            content_type: upload.content_type,
            uploaded_by: auth.username,
        },
    )
    .await?;

    tracing::info!(
        file_id = file.id,
        blob_key = %file.blob_name,
        size = file.file_size,
        uploaded_by = %file.uploaded_by,
        "File uploaded"
    );

    let location = format!("/api/files/{}", file.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(file)))
}

/// Download a file's bytes
///
/// # Errors
///
/// - `404 Not Found`: No metadata row with this id
/// - `500 Internal Server Error`: The blob can't be read (including a row
///   whose blob is gone)
pub async fn download_file(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Response> {
    let blobs = state.blob_store()?;
    let file = FileMetadata::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| file_not_found(id))?;

    let object = blobs.download(&file.blob_name).await?;

    Response::builder()
        .header(header::CONTENT_TYPE, &object.content_type)
        .header(header::CONTENT_DISPOSITION, content_disposition(&file.file_name))
        .header(header::CONTENT_LENGTH, object.data.len())
        .body(Body::from(object.data))
        .map_err(|e| ApiError::InternalError(format!("Failed to build response: {}", e)))
}

/// Delete a file
///
/// The blob goes first; a blob that is already gone doesn't stop the row
/// from being removed.
///
/// # Errors
///
/// - `404 Not Found`: No metadata row with this id
/// - `500 Internal Server Error`: Blob or database failure
pub async fn delete_file(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let blobs = state.blob_store()?;
    let file = FileMetadata::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| file_not_found(id))?;

    let removed = blobs.delete_if_exists(&file.blob_name).await?;
    if !removed {
        tracing::warn!(file_id = id, blob_key = %file.blob_name, "Blob already missing");
    }

    FileMetadata::delete(&state.db, id).await?;

    tracing::info!(file_id = id, blob_key = %file.blob_name, "File deleted");
    Ok(StatusCode::NO_CONTENT)
}
