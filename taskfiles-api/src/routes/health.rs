/// Health check endpoint
///
/// Answers without touching the database, so it reports process liveness
/// only.
///
/// # Endpoint
///
/// ```text
/// GET /api/auth/health
/// ```
///
/// # Response
///
/// ```json
/// { "status": "healthy", "service": "TasksApi" }
/// ```

use crate::app::AppState;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always "healthy" while the process serves requests
    pub status: String,

    /// Service name ("TasksApi" or "FilesApi")
    pub service: String,
}

/// Health check handler
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        service: state.config.service.name().to_string(),
    })
}
