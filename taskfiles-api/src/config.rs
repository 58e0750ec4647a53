/// Configuration management for the API servers
///
/// Both binaries share this loader; [`Service`] supplies the per-service
/// defaults (port, token issuer/audience).
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080 tasks, 8081 files)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: HS256 signing key, at least 32 characters (required)
/// - `JWT_ISSUER` / `JWT_AUDIENCE`: Token claims (default: per service)
/// - `JWT_EXPIRATION_HOURS`: Token lifetime (default: 168)
/// - `CORS_ORIGINS`: Comma separated origins or `*` (default: *)
/// - `MAX_UPLOAD_BYTES`: Request body limit for uploads (default: 100 MiB)
/// - `SEED_DEMO_USERS`: Provision demo accounts on startup (default: true)
/// - `RUN_MIGRATIONS`: Apply embedded migrations on startup (default: true)
/// - `BLOB_*`: Blob storage, see `taskfiles_shared::storage::BlobStoreConfig`
///
/// # Example
///
/// ```no_run
/// use taskfiles_api::config::{Config, Service};
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env(Service::Files)?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::{env, fmt, str::FromStr};

use anyhow::Context;
use chrono::Duration;
use taskfiles_shared::{
    auth::jwt::{JwtSettings, DEFAULT_EXPIRATION_HOURS},
    storage::BlobStoreConfig,
};

/// Default request body limit for uploads (100 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Which API a process is serving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Tasks,
    Files,
}

impl Service {
    /// Service name, also the default token issuer
    pub fn name(&self) -> &'static str {
        match self {
            Service::Tasks => "TasksApi",
            Service::Files => "FilesApi",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Service::Tasks => 8080,
            Service::Files => 8081,
        }
    }

    /// Default token audience: the web app consuming this API
    pub fn default_audience(&self) -> &'static str {
        match self {
            Service::Tasks => "TasksWebApp",
            Service::Files => "FilesWebApp",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub service: Service,

    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// JWT configuration
    pub jwt: JwtConfig,

    /// Blob storage (only used by the files API)
    pub blob: BlobStoreConfig,

    /// Provision demo accounts on startup
    pub seed_demo_users: bool,

    /// Apply embedded migrations on startup
    pub run_migrations: bool,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,

    /// Request body limit for uploads
    pub max_upload_bytes: usize,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// Secret key for JWT signing
    ///
    /// Must be at least 32 bytes. Generate with: `openssl rand -hex 32`
    pub secret: String,

    pub issuer: String,

    pub audience: String,

    /// Lifetime of issued tokens in hours
    pub expiration_hours: i64,
}

impl JwtConfig {
    /// Token settings for issuing and validating tokens
    pub fn settings(&self) -> JwtSettings {
        JwtSettings::new(&self.secret, &self.issuer, &self.audience)
            .with_expiration(Duration::hours(self.expiration_hours))
    }
}

fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value: '{}'", key, value)),
        Err(_) => Ok(default),
    }
}

fn required(key: &str) -> anyhow::Result<String> {
    env::var(key).map_err(|_| anyhow::anyhow!("{} environment variable is required", key))
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `DATABASE_URL` or `JWT_SECRET` is missing
    /// - `JWT_SECRET` is shorter than 32 characters
    /// - A numeric or boolean variable doesn't parse
    pub fn from_env(service: Service) -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env_or("API_PORT", service.default_port())?;

        let cors_origins = env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let max_upload_bytes = env_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;

        let database_url = required("DATABASE_URL")?;
        let max_connections = env_or("DATABASE_MAX_CONNECTIONS", 10u32)?;

        let jwt_secret = required("JWT_SECRET")?;
        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let issuer = env::var("JWT_ISSUER").unwrap_or_else(|_| service.name().to_string());
        let audience =
            env::var("JWT_AUDIENCE").unwrap_or_else(|_| service.default_audience().to_string());
        let expiration_hours = env_or("JWT_EXPIRATION_HOURS", DEFAULT_EXPIRATION_HOURS)?;
        if expiration_hours <= 0 {
            anyhow::bail!("JWT_EXPIRATION_HOURS must be positive");
        }

        let blob = BlobStoreConfig::from_env().context("Invalid blob storage configuration")?;

        Ok(Self {
            service,
            api: ApiConfig {
                host,
                port,
                cors_origins,
                max_upload_bytes,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                issuer,
                audience,
                expiration_hours,
            },
            blob,
            seed_demo_users: env_or("SEED_DEMO_USERS", true)?,
            run_migrations: env_or("RUN_MIGRATIONS", true)?,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}
