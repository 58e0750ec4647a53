/// Session keys and helpers
///
/// A signed-in session holds the API bearer token and the username it was
/// issued for. Flash messages live in the same session and are removed the
/// first time they are read.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::error::WebResult;

pub const TOKEN_KEY: &str = "auth_token";
pub const USERNAME_KEY: &str = "username";
pub const FLASH_SUCCESS_KEY: &str = "flash_success";
pub const FLASH_ERROR_KEY: &str = "flash_error";

/// Identity of a signed-in visitor, inserted into request extensions by
/// the login middleware
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedIn {
    pub token: String,
    pub username: String,
}

/// One-shot messages shown on the next rendered page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flash {
    pub success: Option<String>,
    pub error: Option<String>,
}

impl Flash {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: None,
            error: Some(message.into()),
        }
    }
}

/// Returns the stored identity, if both the token and username are present
pub async fn signed_in(session: &Session) -> WebResult<Option<SignedIn>> {
    let token = session.get::<String>(TOKEN_KEY).await?;
    let username = session.get::<String>(USERNAME_KEY).await?;

    Ok(match (token, username) {
        (Some(token), Some(username)) if !token.is_empty() => Some(SignedIn { token, username }),
        _ => None,
    })
}

pub async fn sign_in(session: &Session, token: &str, username: &str) -> WebResult<()> {
    session.insert(TOKEN_KEY, token).await?;
    session.insert(USERNAME_KEY, username).await?;
    Ok(())
}

/// Forgets the token; pending flash messages survive
pub async fn sign_out(session: &Session) -> WebResult<()> {
    session.remove::<String>(TOKEN_KEY).await?;
    session.remove::<String>(USERNAME_KEY).await?;
    Ok(())
}

pub async fn flash_success(session: &Session, message: impl Into<String>) -> WebResult<()> {
    session.insert(FLASH_SUCCESS_KEY, message.into()).await?;
    Ok(())
}

pub async fn flash_error(session: &Session, message: impl Into<String>) -> WebResult<()> {
    session.insert(FLASH_ERROR_KEY, message.into()).await?;
    Ok(())
}

/// Reads and clears both flash messages
pub async fn take_flash(session: &Session) -> WebResult<Flash> {
    Ok(Flash {
        success: session.remove::<String>(FLASH_SUCCESS_KEY).await?,
        error: session.remove::<String>(FLASH_ERROR_KEY).await?,
    })
}
