/// Application state and router builders
///
/// One [`AppState`] type serves both APIs; the tasks API simply never
/// touches the blob store.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskfiles_api::{app::{build_files_router, AppState}, config::{Config, Service}};
/// use taskfiles_shared::storage::memory::MemoryBlobStore;
/// use sqlx::PgPool;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env(Service::Files)?;
/// let pool = PgPool::connect(&config.database.url).await?;
/// let blobs = Arc::new(MemoryBlobStore::new(&config.blob.container));
/// let state = AppState::new(pool, config).with_blob_store(blobs);
/// let app = build_files_router(state);
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use taskfiles_shared::{
    auth::{jwt::JwtSettings, middleware::authenticate},
    storage::BlobStore,
};
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::{
    config::Config,
    error::{ApiError, ApiResult},
    routes,
};

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Application configuration
    pub config: Arc<Config>,

    /// Token settings derived from `config.jwt`
    pub jwt: Arc<JwtSettings>,

    /// Blob store (files API only)
    pub blobs: Option<Arc<dyn BlobStore>>,
}

impl AppState {
    /// Creates new application state without a blob store
    pub fn new(db: PgPool, config: Config) -> Self {
        let jwt = Arc::new(config.jwt.settings());
        Self {
            db,
            config: Arc::new(config),
            jwt,
            blobs: None,
        }
    }

    /// Attaches the blob store used by the files routes
    pub fn with_blob_store(mut self, blobs: Arc<dyn BlobStore>) -> Self {
        self.blobs = Some(blobs);
        self
    }

    /// The blob store, or a 500 if this process was started without one
    pub fn blob_store(&self) -> ApiResult<&Arc<dyn BlobStore>> {
        self.blobs
            .as_ref()
            .ok_or_else(|| ApiError::InternalError("Blob storage is not configured".to_string()))
    }
}

/// Public routes mounted by both APIs
///
/// ```text
/// /api/auth/
/// ├── POST /login     # Issue a bearer token
/// └── GET  /health    # Liveness
/// ```
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(routes::auth::login))
        .route("/api/auth/health", get(routes::health::health_check))
}

/// Builds the tasks API router
///
/// ```text
/// /api/tasks
/// ├── GET    /        # List
/// ├── POST   /        # Create
/// ├── GET    /:id     # Fetch one
/// ├── PUT    /:id     # Replace
/// └── DELETE /:id     # Delete
/// ```
pub fn build_tasks_router(state: AppState) -> Router {
    let task_routes = Router::new()
        .route(
            "/api/tasks",
            get(routes::tasks::list_tasks).post(routes::tasks::create_task),
        )
        .route(
            "/api/tasks/:id",
            get(routes::tasks::get_task)
                .put(routes::tasks::update_task)
                .delete(routes::tasks::delete_task),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ));

    finish(auth_routes().merge(task_routes), state)
}

/// Builds the files API router
///
/// ```text
/// /api/files
/// ├── GET    /               # List
/// ├── POST   /upload         # Multipart upload (field "file")
/// ├── GET    /:id            # Fetch metadata
/// ├── GET    /:id/download   # Stream the blob
/// └── DELETE /:id            # Delete blob and row
/// ```
pub fn build_files_router(state: AppState) -> Router {
    let max_upload_bytes = state.config.api.max_upload_bytes;

    let file_routes = Router::new()
        .route("/api/files", get(routes::files::list_files))
        .route("/api/files/upload", post(routes::files::upload_file))
        .route(
            "/api/files/:id",
            get(routes::files::get_file).delete(routes::files::delete_file),
        )
        .route("/api/files/:id/download", get(routes::files::download_file))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_layer,
        ))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(max_upload_bytes));

    finish(auth_routes().merge(file_routes), state)
}

/// Adds the shared middleware stack and state
fn finish(router: Router<AppState>, state: AppState) -> Router {
    let cors = cors_layer(&state.config.api.cors_origins);

    router
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|origin| origin == "*") {
        // Development mode: permissive CORS
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600))
}

/// JWT authentication middleware layer
///
/// Validates the bearer token and injects the caller's `AuthContext` into
/// request extensions.
async fn jwt_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_context = authenticate(req.headers(), &state.jwt)?;

    tracing::debug!(username = %auth_context.username, "Authenticated request");
    req.extensions_mut().insert(auth_context);

    Ok(next.run(req).await)
}
