/// HTTP client for the tasks and files APIs
///
/// The client holds no credentials. Every authenticated call takes the
/// bearer token from the caller's session, so one client can be shared by
/// all requests.

use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use reqwest::{header, multipart, Response, StatusCode};
use serde::{Deserialize, Serialize};
use taskfiles_shared::models::{
    file_metadata::FileMetadata,
    task_item::{TaskItem, UpdateTaskItem},
};

use crate::error::{WebError, WebResult};

/// Default timeout for a single API call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Successful login as returned by `POST /api/auth/login`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub username: String,
    pub role: String,
    pub expires_at: DateTime<Utc>,
}

/// Body for creating or updating a task
#[derive(Debug, Clone, Serialize)]
pub struct TaskPayload {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub is_completed: bool,
}

impl From<UpdateTaskItem> for TaskPayload {
    fn from(update: UpdateTaskItem) -> Self {
        Self {
            title: update.title,
            description: update.description,
            is_completed: update.is_completed,
        }
    }
}

/// File contents streamed back from the download endpoint
#[derive(Debug, Clone)]
pub struct Download {
    pub content_type: String,

    /// The API's `Content-Disposition`, passed through unchanged
    pub content_disposition: Option<String>,

    pub data: Bytes,
}

/// Error body produced by the APIs
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Creates a client for the API at `base_url`
    pub fn new(base_url: &str) -> WebResult<Self> {
        let http = reqwest::Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Exchanges credentials for a bearer token
    ///
    /// Wrong credentials come back as [`WebError::Unauthorized`].
    pub async fn login(&self, username: &str, password: &str) -> WebResult<LoginResponse> {
        let response = self
            .http
            .post(self.url("/api/auth/login"))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    pub async fn list_tasks(&self, token: &str) -> WebResult<Vec<TaskItem>> {
        let response = self
            .http
            .get(self.url("/api/tasks"))
            .bearer_auth(token)
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    /// Fetches one task; None when the API answers 404
    pub async fn get_task(&self, token: &str, id: i64) -> WebResult<Option<TaskItem>> {
        let response = self
            .http
            .get(self.url(&format!("/api/tasks/{}", id)))
            .bearer_auth(token)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(check(response).await?.json().await?))
    }

    pub async fn create_task(&self, token: &str, task: &TaskPayload) -> WebResult<TaskItem> {
        let response = self
            .http
            .post(self.url("/api/tasks"))
            .bearer_auth(token)
            .json(task)
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    /// Replaces a task; false when it no longer exists
    pub async fn update_task(&self, token: &str, id: i64, task: &TaskPayload) -> WebResult<bool> {
        let response = self
            .http
            .put(self.url(&format!("/api/tasks/{}", id)))
            .bearer_auth(token)
            .json(task)
            .send()
            .await?;

        found(response).await
    }

    /// Deletes a task; false when it no longer exists
    pub async fn delete_task(&self, token: &str, id: i64) -> WebResult<bool> {
        let response = self
            .http
            .delete(self.url(&format!("/api/tasks/{}", id)))
            .bearer_auth(token)
            .send()
            .await?;

        found(response).await
    }

    pub async fn list_files(&self, token: &str) -> WebResult<Vec<FileMetadata>> {
        let response = self
            .http
            .get(self.url("/api/files"))
            .bearer_auth(token)
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    /// Uploads `data` as the multipart field `file`
    pub async fn upload_file(
        &self,
        token: &str,
        file_name: &str,
        content_type: &str,
        data: Bytes,
    ) -> WebResult<FileMetadata> {
        let part = multipart::Part::bytes(data.to_vec())
            .file_name(file_name.to_string())
            .mime_str(content_type)?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(self.url("/api/files/upload"))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    pub async fn download_file(&self, token: &str, id: i64) -> WebResult<Download> {
        let response = self
            .http
            .get(self.url(&format!("/api/files/{}/download", id)))
            .bearer_auth(token)
            .send()
            .await?;
        let response = check(response).await?;

        let header_value = |name: header::HeaderName| {
            response.headers().get(name).and_then(header_text)
        };
        let content_type = header_value(header::CONTENT_TYPE)
            .unwrap_or_else(|| "application/octet-stream".to_string());
        let content_disposition = header_value(header::CONTENT_DISPOSITION);

        Ok(Download {
            content_type,
            content_disposition,
            data: response.bytes().await?,
        })
    }

    /// Deletes a file and its blob; false when it no longer exists
    pub async fn delete_file(&self, token: &str, id: i64) -> WebResult<bool> {
        let response = self
            .http
            .delete(self.url(&format!("/api/files/{}", id)))
            .bearer_auth(token)
            .send()
            .await?;

        found(response).await
    }
}

/// Passes success responses through and turns the rest into errors
async fn check(response: Response) -> WebResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(WebError::Unauthorized);
    }

    let fallback = status.canonical_reason().unwrap_or("Request failed").to_string();
    let message = match response.json::<ApiErrorBody>().await {
        Ok(body) => body.message,
        Err(_) => fallback,
    };

    tracing::warn!(status = status.as_u16(), message = %message, "API call failed");
    Err(WebError::Api {
        status: status.as_u16(),
        message,
    })
}

/// Maps 404 to `false` for endpoints that answer 204 on success
async fn found(response: Response) -> WebResult<bool> {
    if response.status() == StatusCode::NOT_FOUND {
        return Ok(false);
    }
    check(response).await?;
    Ok(true)
}

/// Header text, keeping UTF-8 that `to_str` would reject
fn header_text(value: &header::HeaderValue) -> Option<String> {
    std::str::from_utf8(value.as_bytes()).ok().map(str::to_string)
}
