/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/login` - Exchange username and password for a bearer token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use taskfiles_shared::{
    auth::{jwt, password},
    models::user::User,
};
use validator::Validate;

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 50, message = "Username is required"))]
    pub username: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token
    pub token: String,

    pub username: String,

    pub role: String,

    /// When the token stops being accepted
    pub expires_at: DateTime<Utc>,
}

fn invalid_credentials() -> ApiError {
    ApiError::Unauthorized("Invalid credentials".to_string())
}

/// Login with username and password
///
/// # Endpoint
///
/// ```text
/// POST /api/auth/login
/// Content-Type: application/json
///
/// { "username": "admin", "password": "admin123" }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "token": "eyJ...",
///   "username": "admin",
///   "role": "Admin",
///   "expires_at": "2025-01-08T12:00:00Z"
/// }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Empty username or password
/// - `401 Unauthorized`: Unknown user or wrong password
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    let user = match User::find_by_username(&state.db, &req.username).await? {
        Some(user) => user,
        None => {
            tracing::info!(username = %req.username, "Login failed: unknown user");
            return Err(invalid_credentials());
        }
    };

    let verified = match password::verify_password(&req.password, &user.password_hash) {
        Ok(verified) => verified,
        Err(e) => {
            // An unusable stored hash can never match
            tracing::warn!(username = %user.username, error = %e, "Stored password hash is invalid");
            false
        }
    };

    if !verified {
        tracing::info!(username = %user.username, "Login failed: wrong password");
        return Err(invalid_credentials());
    }

    let claims = jwt::Claims::new(user.id, &user.username, &user.email, &user.role, &state.jwt);
    let token = jwt::create_token(&claims, &state.jwt)?;

    tracing::info!(username = %user.username, role = %user.role, "User logged in");

    Ok(Json(LoginResponse {
        token,
        username: user.username,
        role: user.role,
        expires_at: claims.expires_at(),
    }))
}
