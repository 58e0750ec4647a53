/// Frontend error type
///
/// Handlers rarely let these escape: most failures become a flash message
/// and a redirect. [`WebError::Unauthorized`] is special-cased by callers to
/// drop the session token.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// Result type for API client calls and handlers
pub type WebResult<T> = Result<T, WebError>;

#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// The API rejected the bearer token (or the login credentials)
    #[error("Not authorized by the API")]
    Unauthorized,

    /// The API answered with a non-success status
    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The API could not be reached or its response could not be read
    #[error("API request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Session store failure
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Request could not be read (e.g. a broken multipart body)
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl WebError {
    /// Message suitable for a flash banner
    pub fn user_message(&self) -> String {
        match self {
            WebError::Unauthorized => "Your session has expired, please sign in again".to_string(),
            WebError::Api { message, .. } => message.clone(),
            WebError::Http(_) => "The API could not be reached".to_string(),
            WebError::Session(_) => "Session storage failed".to_string(),
            WebError::BadRequest(message) => message.clone(),
        }
    }
}

impl From<axum::extract::multipart::MultipartError> for WebError {
    fn from(err: axum::extract::multipart::MultipartError) -> Self {
        WebError::BadRequest(err.body_text())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebError::Unauthorized => StatusCode::UNAUTHORIZED,
            WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WebError::Api { .. } | WebError::Http(_) => StatusCode::BAD_GATEWAY,
            WebError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }

        (status, self.user_message()).into_response()
    }
}
