/// File list, upload, download and delete

use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
    Extension,
};
use bytes::Bytes;
use tower_sessions::Session;

use super::{done, expire_session, fail};
use crate::{
    app::WebState,
    error::{WebError, WebResult},
    session::{self, SignedIn},
    views,
};

const LIST: &str = "/files";

/// Multipart field carrying the upload
const FILE_FIELD: &str = "file";

/// A file chosen in the upload form
#[derive(Debug)]
struct Upload {
    file_name: String,
    content_type: String,
    data: Bytes,
}

/// GET / and GET /files
pub async fn index(
    State(state): State<WebState>,
    session: Session,
    Extension(user): Extension<SignedIn>,
) -> WebResult<Response> {
    let mut flash = session::take_flash(&session).await?;

    let files = match state.api.list_files(&user.token).await {
        Ok(files) => files,
        Err(WebError::Unauthorized) => return expire_session(&session).await,
        Err(err) => {
            tracing::warn!(error = %err, "Failed to load files");
            flash.error = Some(format!("Could not load files: {}", err.user_message()));
            Vec::new()
        }
    };

    Ok(views::files_page(&user.username, &flash, &files).into_response())
}

/// POST /files/upload
pub async fn upload(
    State(state): State<WebState>,
    session: Session,
    Extension(user): Extension<SignedIn>,
    multipart: Multipart,
) -> WebResult<Response> {
    let Some(upload) = read_upload(multipart).await? else {
        session::flash_error(&session, "Please choose a file to upload").await?;
        return Ok(Redirect::to(LIST).into_response());
    };

    match state
        .api
        .upload_file(&user.token, &upload.file_name, &upload.content_type, upload.data)
        .await
    {
        Ok(file) => {
            tracing::info!(file_id = file.id, file_name = %file.file_name, "File uploaded");
            done(&session, format!("Uploaded \"{}\"", file.file_name), LIST).await
        }
        Err(err) => fail(&session, err, LIST).await,
    }
}

/// GET /files/{id}/download
///
/// Streams the API's response body back with its content headers.
pub async fn download(
    State(state): State<WebState>,
    session: Session,
    Extension(user): Extension<SignedIn>,
    Path(id): Path<i64>,
) -> WebResult<Response> {
    let download = match state.api.download_file(&user.token, id).await {
        Ok(download) => download,
        Err(err) => return fail(&session, err, LIST).await,
    };

    let disposition = download
        .content_disposition
        .unwrap_or_else(|| format!("attachment; filename=\"file-{}\"", id));

    Ok((
        [
            (header::CONTENT_TYPE, download.content_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        download.data,
    )
        .into_response())
}

/// POST /files/{id}/delete
pub async fn delete(
    State(state): State<WebState>,
    session: Session,
    Extension(user): Extension<SignedIn>,
    Path(id): Path<i64>,
) -> WebResult<Response> {
    match state.api.delete_file(&user.token, id).await {
        Ok(true) => done(&session, "File deleted".to_string(), LIST).await,
        Ok(false) => {
            session::flash_error(&session, "File not found").await?;
            Ok(Redirect::to(LIST).into_response())
        }
        Err(err) => fail(&session, err, LIST).await,
    }
}

/// Reads the `file` field; None when it is absent, unnamed or empty
async fn read_upload(mut multipart: Multipart) -> WebResult<Option<Upload>> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let data = field.bytes().await?;

        if file_name.is_empty() || data.is_empty() {
            return Ok(None);
        }

        return Ok(Some(Upload {
            file_name,
            content_type,
            data,
        }));
    }

    Ok(None)
}
