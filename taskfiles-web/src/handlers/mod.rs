/// Page and form handlers
///
/// Form handlers follow post/redirect/get: they report the outcome through a
/// flash message and redirect to the app's list page.

pub mod account;
pub mod files;
pub mod tasks;

use axum::response::{IntoResponse, Redirect, Response};
use tower_sessions::Session;

use crate::{
    app::LOGIN_PATH,
    error::{WebError, WebResult},
    session,
};

/// Drops the session token and sends the visitor back to the login page
pub(crate) async fn expire_session(session: &Session) -> WebResult<Response> {
    tracing::info!("API rejected the session token, signing out");
    session::sign_out(session).await?;
    session::flash_error(session, WebError::Unauthorized.user_message()).await?;
    Ok(Redirect::to(LOGIN_PATH).into_response())
}

/// Reports a failed API call and redirects to `back_to`
///
/// A 401 from the API ends the session instead.
pub(crate) async fn fail(session: &Session, err: WebError, back_to: &str) -> WebResult<Response> {
    if matches!(err, WebError::Unauthorized) {
        return expire_session(session).await;
    }

    tracing::warn!(error = %err, "API call failed");
    session::flash_error(session, err.user_message()).await?;
    Ok(Redirect::to(back_to).into_response())
}

/// Records a success message and redirects to `back_to`
pub(crate) async fn done(session: &Session, message: String, back_to: &str) -> WebResult<Response> {
    session::flash_success(session, message).await?;
    Ok(Redirect::to(back_to).into_response())
}
