/// Router builders for the two frontends
///
/// Both apps share the account routes and the login middleware; each adds
/// its own pages. Everything sits behind an in-memory session layer.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Request},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tower_sessions::{cookie::SameSite, MemoryStore, Session, SessionManagerLayer};

use crate::{
    client::ApiClient,
    config::{Config, Frontend},
    error::WebResult,
    handlers::{account, files, tasks},
    session,
};

/// Where unauthenticated visitors are sent
pub const LOGIN_PATH: &str = "/account/login";

/// Shared state for frontend handlers
#[derive(Clone)]
pub struct WebState {
    pub config: Arc<Config>,
    pub api: ApiClient,
}

impl WebState {
    pub fn new(config: Config) -> WebResult<Self> {
        let api = ApiClient::new(&config.api_base_url)?;
        Ok(Self {
            config: Arc::new(config),
            api,
        })
    }

    pub fn frontend(&self) -> Frontend {
        self.config.frontend
    }
}

/// Builds the tasks frontend
pub fn build_tasks_app(state: WebState) -> Router {
    let pages = Router::new()
        .route("/", get(tasks::index))
        .route("/tasks", get(tasks::index))
        .route("/tasks/create", post(tasks::create))
        .route("/tasks/:id/update", post(tasks::update))
        .route("/tasks/:id/delete", post(tasks::delete))
        .route("/tasks/:id/toggle", post(tasks::toggle))
        .route_layer(middleware::from_fn(require_login));

    finish(pages, state)
}

/// Builds the files frontend
pub fn build_files_app(state: WebState) -> Router {
    let pages = Router::new()
        .route("/", get(files::index))
        .route("/files", get(files::index))
        .route(
            "/files/upload",
            post(files::upload).layer(DefaultBodyLimit::max(state.config.max_upload_bytes)),
        )
        .route("/files/:id/download", get(files::download))
        .route("/files/:id/delete", post(files::delete))
        .route_layer(middleware::from_fn(require_login));

    finish(pages, state)
}

fn finish(pages: Router<WebState>, state: WebState) -> Router {
    let frontend = state.frontend();
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(state.config.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_name(frontend.cookie_name());

    Router::new()
        .route(LOGIN_PATH, get(account::login_page).post(account::login))
        .route("/account/logout", post(account::logout))
        .merge(pages)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Lets signed-in visitors through with their [`session::SignedIn`] in the
/// request extensions; everyone else is redirected to the login page
async fn require_login(session: Session, mut req: Request, next: Next) -> Response {
    match session::signed_in(&session).await {
        Ok(Some(user)) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Ok(None) => Redirect::to(LOGIN_PATH).into_response(),
        Err(e) => e.into_response(),
    }
}
