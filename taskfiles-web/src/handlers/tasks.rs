/// Task list and task forms

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Extension, Form,
};
use serde::Deserialize;
use tower_sessions::Session;

use super::{done, expire_session, fail};
use crate::{
    app::WebState,
    client::TaskPayload,
    error::{WebError, WebResult},
    session::{self, SignedIn},
    views,
};

const LIST: &str = "/tasks";

/// Fields posted by the create and edit forms
#[derive(Debug, Deserialize)]
pub struct TaskForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Present only when the checkbox is ticked
    pub is_completed: Option<String>,
}

impl TaskForm {
    /// Payload for the API, or None when the title is blank
    fn payload(&self) -> Option<TaskPayload> {
        let title = self.title.trim();
        if title.is_empty() {
            return None;
        }

        let description = self.description.trim();
        Some(TaskPayload {
            title: title.to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            is_completed: self.is_completed.is_some(),
        })
    }
}

/// GET / and GET /tasks
pub async fn index(
    State(state): State<WebState>,
    session: Session,
    Extension(user): Extension<SignedIn>,
) -> WebResult<Response> {
    let mut flash = session::take_flash(&session).await?;

    let tasks = match state.api.list_tasks(&user.token).await {
        Ok(tasks) => tasks,
        Err(WebError::Unauthorized) => return expire_session(&session).await,
        Err(err) => {
            tracing::warn!(error = %err, "Failed to load tasks");
            flash.error = Some(format!("Could not load tasks: {}", err.user_message()));
            Vec::new()
        }
    };

    Ok(views::tasks_page(&user.username, &flash, &tasks).into_response())
}

/// POST /tasks/create
pub async fn create(
    State(state): State<WebState>,
    session: Session,
    Extension(user): Extension<SignedIn>,
    Form(form): Form<TaskForm>,
) -> WebResult<Response> {
    let Some(payload) = form.payload() else {
        session::flash_error(&session, "Title is required").await?;
        return Ok(Redirect::to(LIST).into_response());
    };

    match state.api.create_task(&user.token, &payload).await {
        Ok(task) => done(&session, format!("Created \"{}\"", task.title), LIST).await,
        Err(err) => fail(&session, err, LIST).await,
    }
}

/// POST /tasks/{id}/update
pub async fn update(
    State(state): State<WebState>,
    session: Session,
    Extension(user): Extension<SignedIn>,
    Path(id): Path<i64>,
    Form(form): Form<TaskForm>,
) -> WebResult<Response> {
    let Some(payload) = form.payload() else {
        session::flash_error(&session, "Title is required").await?;
        return Ok(Redirect::to(LIST).into_response());
    };

    save(&state, &session, &user, id, payload, "Task updated").await
}

/// POST /tasks/{id}/toggle
pub async fn toggle(
    State(state): State<WebState>,
    session: Session,
    Extension(user): Extension<SignedIn>,
    Path(id): Path<i64>,
) -> WebResult<Response> {
    let task = match state.api.get_task(&user.token, id).await {
        Ok(Some(task)) => task,
        Ok(None) => return not_found(&session).await,
        Err(err) => return fail(&session, err, LIST).await,
    };

    let message = if task.is_completed {
        "Task reopened"
    } else {
        "Task completed"
    };
    save(&state, &session, &user, id, task.toggled().into(), message).await
}

/// POST /tasks/{id}/delete
pub async fn delete(
    State(state): State<WebState>,
    session: Session,
    Extension(user): Extension<SignedIn>,
    Path(id): Path<i64>,
) -> WebResult<Response> {
    match state.api.delete_task(&user.token, id).await {
        Ok(true) => done(&session, "Task deleted".to_string(), LIST).await,
        Ok(false) => not_found(&session).await,
        Err(err) => fail(&session, err, LIST).await,
    }
}

async fn save(
    state: &WebState,
    session: &Session,
    user: &SignedIn,
    id: i64,
    payload: TaskPayload,
    message: &str,
) -> WebResult<Response> {
    match state.api.update_task(&user.token, id, &payload).await {
        Ok(true) => done(session, message.to_string(), LIST).await,
        Ok(false) => not_found(session).await,
        Err(err) => fail(session, err, LIST).await,
    }
}

async fn not_found(session: &Session) -> WebResult<Response> {
    session::flash_error(session, "Task not found").await?;
    Ok(Redirect::to(LIST).into_response())
}
