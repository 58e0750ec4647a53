/// Task item endpoints
///
/// All routes require a bearer token; the caller's username is recorded as
/// `created_by` on new items.
///
/// # Endpoints
///
/// - `GET    /api/tasks`      - List task items
/// - `POST   /api/tasks`      - Create a task item
/// - `GET    /api/tasks/:id`  - Fetch one task item
/// - `PUT    /api/tasks/:id`  - Replace a task item
/// - `DELETE /api/tasks/:id`  - Delete a task item

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use taskfiles_shared::{
    auth::middleware::AuthContext,
    models::task_item::{CreateTaskItem, TaskItem, UpdateTaskItem},
};
use validator::Validate;

/// Create task request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskRequest {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    #[serde(default)]
    pub is_completed: bool,
}

/// Update task request
///
/// `id` is optional; when present it must match the path.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    pub id: Option<i64>,

    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    pub is_completed: bool,
}

fn task_not_found(id: i64) -> ApiError {
    ApiError::NotFound(format!("Task {} not found", id))
}

/// List all task items ordered by id
pub async fn list_tasks(State(state): State<AppState>) -> ApiResult<Json<Vec<TaskItem>>> {
    let tasks = TaskItem::list(&state.db).await?;
    Ok(Json(tasks))
}

/// Fetch one task item
///
/// # Errors
///
/// - `404 Not Found`: No task with this id
pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<TaskItem>> {
    TaskItem::find_by_id(&state.db, id)
        .await?
        .map(Json)
        .ok_or_else(|| task_not_found(id))
}

/// Create a task item
///
/// # Response
///
/// `201 Created` with `Location: /api/tasks/{id}` and the stored item.
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<CreateTaskRequest>,
) -> ApiResult<impl IntoResponse> {
    req.validate()?;

    let task = TaskItem::create(
        &state.db,
        CreateTaskItem {
            title: req.title,
            description: req.description,
            is_completed: req.is_completed,
            created_by: auth.username,
        },
    )
    .await?;

    tracing::info!(task_id = task.id, created_by = %task.created_by, "Task created");

    let location = format!("/api/tasks/{}", task.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(task)))
}

/// Replace a task item
///
/// # Errors
///
/// - `400 Bad Request`: Body id differs from the path id
/// - `404 Not Found`: No task with this id
pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateTaskRequest>,
) -> ApiResult<StatusCode> {
    if let Some(body_id) = req.id {
        if body_id != id {
            return Err(ApiError::BadRequest(format!(
                "Body id {} does not match path id {}",
                body_id, id
            )));
        }
    }

    req.validate()?;

    let updated = TaskItem::update(
        &state.db,
        id,
        UpdateTaskItem {
            title: req.title,
            description: req.description,
            is_completed: req.is_completed,
        },
    )
    .await?
    .ok_or_else(|| task_not_found(id))?;

    tracing::info!(
        task_id = id,
        is_completed = updated.is_completed,
        "Task updated"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Delete a task item
///
/// # Errors
///
/// - `404 Not Found`: No task with this id
pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    if !TaskItem::delete(&state.db, id).await? {
        return Err(task_not_found(id));
    }

    tracing::info!(task_id = id, "Task deleted");
    Ok(StatusCode::NO_CONTENT)
}
