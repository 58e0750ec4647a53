//! Common test utilities for the web frontends
//!
//! [`spawn_mock_api`] serves a small in-memory stand-in for the tasks and
//! files APIs on `127.0.0.1:0`; [`Browser`] drives a frontend router and
//! carries its session cookie between requests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex, MutexGuard};

use axum::{
    body::Body,
    extract::{Multipart, Path, State},
    http::{header, HeaderMap, Request, Response, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use taskfiles_shared::models::{file_metadata::FileMetadata, task_item::TaskItem};
use taskfiles_web::{
    app::{build_files_app, build_tasks_app, WebState},
    config::{Config, Frontend},
};
use tokio::net::TcpListener;
use tower::ServiceExt;

pub const USERNAME: &str = "user";
pub const PASSWORD: &str = "user123";
pub const TOKEN: &str = "mock-token-user";

const BOUNDARY: &str = "taskfiles-web-test-boundary";

#[derive(Default)]
pub struct MockData {
    pub tasks: Vec<TaskItem>,
    pub files: Vec<(FileMetadata, Bytes)>,
    pub next_id: i64,
    /// Reject every token, as if it had expired
    pub revoked: bool,
}

impl MockData {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// In-memory API double
#[derive(Clone, Default)]
pub struct MockApi {
    data: Arc<Mutex<MockData>>,
}

impl MockApi {
    pub fn data(&self) -> MutexGuard<'_, MockData> {
        self.data.lock().unwrap()
    }

    pub fn add_task(&self, title: &str) -> i64 {
        let mut data = self.data();
        let id = data.next_id();
        data.tasks.push(TaskItem {
            id,
            title: title.to_string(),
            description: None,
            is_completed: false,
            created_by: USERNAME.to_string(),
            created_at: Utc::now(),
            completed_at: None,
        });
        id
    }

    pub fn add_file(&self, file_name: &str, content_type: &str, data: &'static [u8]) -> i64 {
        let mut state = self.data();
        let id = state.next_id();
        state.files.push((
            FileMetadata {
                id,
                file_name: file_name.to_string(),
                blob_name: format!("{}_{}", id, file_name),
                file_size: data.len() as i64,
                content_type: content_type.to_string(),
                uploaded_by: USERNAME.to_string(),
                uploaded_at: Utc::now(),
            },
            Bytes::from_static(data),
        ));
        id
    }

    fn router(&self) -> Router {
        Router::new()
            .route("/api/auth/login", post(login))
            .route("/api/tasks", get(list_tasks).post(create_task))
            .route(
                "/api/tasks/:id",
                get(get_task).put(update_task).delete(delete_task),
            )
            .route("/api/files", get(list_files))
            .route("/api/files/upload", post(upload_file))
            .route("/api/files/:id", axum::routing::delete(delete_file))
            .route("/api/files/:id/download", get(download_file))
            .with_state(self.clone())
    }
}

/// Starts the mock API and returns its base URL
pub async fn spawn_mock_api() -> (String, MockApi) {
    let api = MockApi::default();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = api.router();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (format!("http://{}", addr), api)
}

fn error(status: StatusCode, message: &str) -> axum::response::Response {
    (status, Json(json!({ "error": "mock", "message": message }))).into_response()
}

fn authorize(api: &MockApi, headers: &HeaderMap) -> Result<(), axum::response::Response> {
    let expected = format!("Bearer {}", TOKEN);
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    if presented == Some(expected.as_str()) && !api.data().revoked {
        Ok(())
    } else {
        Err(error(StatusCode::UNAUTHORIZED, "Invalid token"))
    }
}

#[derive(Deserialize)]
struct LoginBody {
    username: String,
    password: String,
}

async fn login(Json(body): Json<LoginBody>) -> axum::response::Response {
    if body.username != USERNAME || body.password != PASSWORD {
        return error(StatusCode::UNAUTHORIZED, "Invalid credentials");
    }
    Json(json!({
        "token": TOKEN,
        "username": USERNAME,
        "role": "User",
        "expires_at": "2030-01-01T00:00:00Z",
    }))
    .into_response()
}

#[derive(Deserialize)]
struct TaskBody {
    title: String,
    description: Option<String>,
    #[serde(default)]
    is_completed: bool,
}

async fn list_tasks(State(api): State<MockApi>, headers: HeaderMap) -> axum::response::Response {
    if let Err(rejection) = authorize(&api, &headers) {
        return rejection;
    }
    Json(api.data().tasks.clone()).into_response()
}

async fn get_task(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> axum::response::Response {
    if let Err(rejection) = authorize(&api, &headers) {
        return rejection;
    }
    match api.data().tasks.iter().find(|t| t.id == id) {
        Some(task) => Json(task.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "Task not found"),
    }
}

async fn create_task(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Json(body): Json<TaskBody>,
) -> axum::response::Response {
    if let Err(rejection) = authorize(&api, &headers) {
        return rejection;
    }
    let mut data = api.data();
    let id = data.next_id();
    let task = TaskItem {
        id,
        title: body.title,
        description: body.description,
        is_completed: body.is_completed,
        created_by: USERNAME.to_string(),
        created_at: Utc::now(),
        completed_at: body.is_completed.then(Utc::now),
    };
    data.tasks.push(task.clone());
    (StatusCode::CREATED, Json(task)).into_response()
}

async fn update_task(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Path(id): Path<i64>,
    Json(body): Json<TaskBody>,
) -> axum::response::Response {
    if let Err(rejection) = authorize(&api, &headers) {
        return rejection;
    }
    let mut data = api.data();
    let Some(task) = data.tasks.iter_mut().find(|t| t.id == id) else {
        return error(StatusCode::NOT_FOUND, "Task not found");
    };
    task.title = body.title;
    task.description = body.description;
    task.completed_at = body.is_completed.then(Utc::now);
    task.is_completed = body.is_completed;
    StatusCode::NO_CONTENT.into_response()
}

async fn delete_task(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> axum::response::Response {
    if let Err(rejection) = authorize(&api, &headers) {
        return rejection;
    }
    let mut data = api.data();
    let before = data.tasks.len();
    data.tasks.retain(|t| t.id != id);
    if data.tasks.len() == before {
        return error(StatusCode::NOT_FOUND, "Task not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn list_files(State(api): State<MockApi>, headers: HeaderMap) -> axum::response::Response {
    if let Err(rejection) = authorize(&api, &headers) {
        return rejection;
    }
    let files: Vec<FileMetadata> = api.data().files.iter().map(|(f, _)| f.clone()).collect();
    Json(files).into_response()
}

async fn upload_file(
    State(api): State<MockApi>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> axum::response::Response {
    if let Err(rejection) = authorize(&api, &headers) {
        return rejection;
    }

    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().unwrap_or_default().to_string();
        let data = field.bytes().await.unwrap();
        if data.is_empty() {
            break;
        }

        let mut state = api.data();
        let id = state.next_id();
        let file = FileMetadata {
            id,
            file_name: file_name.clone(),
            blob_name: format!("{}_{}", id, file_name),
            file_size: data.len() as i64,
            content_type,
            uploaded_by: USERNAME.to_string(),
            uploaded_at: Utc::now(),
        };
        state.files.push((file.clone(), data));
        return (StatusCode::CREATED, Json(file)).into_response();
    }

    error(StatusCode::BAD_REQUEST, "No file uploaded")
}

async fn download_file(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> axum::response::Response {
    if let Err(rejection) = authorize(&api, &headers) {
        return rejection;
    }
    let data = api.data();
    match data.files.iter().find(|(f, _)| f.id == id) {
        Some((file, bytes)) => (
            [
                (header::CONTENT_TYPE, file.content_type.clone()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", file.file_name),
                ),
            ],
            bytes.clone(),
        )
            .into_response(),
        None => error(StatusCode::NOT_FOUND, "File not found"),
    }
}

async fn delete_file(
    State(api): State<MockApi>,
    headers: HeaderMap,
    Path(id): Path<i64>,
) -> axum::response::Response {
    if let Err(rejection) = authorize(&api, &headers) {
        return rejection;
    }
    let mut data = api.data();
    let before = data.files.len();
    data.files.retain(|(f, _)| f.id != id);
    if data.files.len() == before {
        return error(StatusCode::NOT_FOUND, "File not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

/// Builds a frontend router pointed at `api_base_url`
pub fn web_app(frontend: Frontend, api_base_url: &str) -> Router {
    let state = WebState::new(Config::new(frontend, api_base_url)).unwrap();
    match frontend {
        Frontend::Tasks => build_tasks_app(state),
        Frontend::Files => build_files_app(state),
    }
}

/// Sends requests to a frontend router, replaying its session cookie
pub struct Browser {
    app: Router,
    cookie: Option<String>,
}

impl Browser {
    pub fn new(app: Router) -> Self {
        Self { app, cookie: None }
    }

    pub async fn send(&mut self, mut request: Request<Body>) -> Response<Body> {
        if let Some(cookie) = &self.cookie {
            request
                .headers_mut()
                .insert(header::COOKIE, cookie.parse().unwrap());
        }

        let response = self.app.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE) {
            let pair = set_cookie.to_str().unwrap().split(';').next().unwrap();
            self.cookie = Some(pair.to_string());
        }
        response
    }

    pub async fn get(&mut self, uri: &str) -> Response<Body> {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post_form(&mut self, uri: &str, form: &str) -> Response<Body> {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form.to_string()))
            .unwrap();
        self.send(request).await
    }

    pub async fn post_file(
        &mut self,
        uri: &str,
        file_name: &str,
        content_type: &str,
        content: &[u8],
    ) -> Response<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
                file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    /// Signs in with the mock API's credentials
    pub async fn sign_in(&mut self) {
        let response = self
            .post_form(
                "/account/login",
                &format!("username={}&password={}", USERNAME, PASSWORD),
            )
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
    }
}

pub fn location(response: &Response<Body>) -> &str {
    response
        .headers()
        .get(header::LOCATION)
        .map(|value| value.to_str().unwrap())
        .unwrap_or_default()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
