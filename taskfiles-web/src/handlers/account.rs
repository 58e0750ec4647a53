/// Sign-in and sign-out

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::{
    app::{WebState, LOGIN_PATH},
    error::{WebError, WebResult},
    session::{self, Flash},
    views,
};

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// GET /account/login
pub async fn login_page(State(state): State<WebState>, session: Session) -> WebResult<Response> {
    if session::signed_in(&session).await?.is_some() {
        return Ok(Redirect::to("/").into_response());
    }

    let flash = session::take_flash(&session).await?;
    Ok(views::login_page(state.frontend(), &flash, "").into_response())
}

/// POST /account/login
pub async fn login(
    State(state): State<WebState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> WebResult<Response> {
    let username = form.username.trim();
    let frontend = state.frontend();

    if username.is_empty() || form.password.is_empty() {
        let flash = Flash::error("Username and password are required");
        return Ok(views::login_page(frontend, &flash, username).into_response());
    }

    match state.api.login(username, &form.password).await {
        Ok(login) => {
            tracing::info!(username = %login.username, role = %login.role, "User signed in");
            session::sign_in(&session, &login.token, &login.username).await?;
            session::flash_success(&session, format!("Welcome, {}", login.username)).await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(WebError::Unauthorized) => {
            tracing::info!(username = %username, "Sign in rejected");
            let flash = Flash::error("Invalid username or password");
            Ok(views::login_page(frontend, &flash, username).into_response())
        }
        Err(err) => {
            tracing::warn!(error = %err, "Sign in failed");
            let flash = Flash::error(err.user_message());
            Ok(views::login_page(frontend, &flash, username).into_response())
        }
    }
}

/// POST /account/logout
pub async fn logout(session: Session) -> WebResult<Response> {
    session::sign_out(&session).await?;
    session::flash_success(&session, "You have been signed out").await?;
    Ok(Redirect::to(LOGIN_PATH).into_response())
}
