/// Configuration management for the web frontends
///
/// # Environment Variables
///
/// - `WEB_HOST`: Host to bind to (default: 0.0.0.0)
/// - `WEB_PORT`: Port to bind to (default: 5000 tasks, 5001 files)
/// - `API_BASE_URL`: Base URL of the API this frontend consumes (required)
/// - `SECURE_COOKIES`: Mark the session cookie `Secure` (default: false)
/// - `MAX_UPLOAD_BYTES`: Request body limit for uploads (default: 100 MiB)

use std::{env, fmt, str::FromStr};

use anyhow::Context;

/// Default request body limit for uploads (100 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 100 * 1024 * 1024;

/// Which frontend a process is serving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frontend {
    Tasks,
    Files,
}

impl Frontend {
    /// Title shown in the page header
    pub fn title(&self) -> &'static str {
        match self {
            Frontend::Tasks => "Tasks",
            Frontend::Files => "Files",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            Frontend::Tasks => 5000,
            Frontend::Files => 5001,
        }
    }

    /// Session cookie name, distinct per app so both can share a host
    pub fn cookie_name(&self) -> &'static str {
        match self {
            Frontend::Tasks => "tasks_session",
            Frontend::Files => "files_session",
        }
    }

    /// Path of the list page every form posts back to
    pub fn home_path(&self) -> &'static str {
        match self {
            Frontend::Tasks => "/tasks",
            Frontend::Files => "/files",
        }
    }
}

impl fmt::Display for Frontend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frontend::Tasks => f.write_str("TasksWeb"),
            Frontend::Files => f.write_str("FilesWeb"),
        }
    }
}

/// Frontend configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub frontend: Frontend,

    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// API base URL without a trailing slash
    pub api_base_url: String,

    /// Send the session cookie over HTTPS only
    pub secure_cookies: bool,

    /// Request body limit for uploads
    pub max_upload_bytes: usize,
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

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `API_BASE_URL` is missing or a numeric or boolean
    /// variable doesn't parse.
    pub fn from_env(frontend: Frontend) -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let api_base_url = env::var("API_BASE_URL")
            .map_err(|_| anyhow::anyhow!("API_BASE_URL environment variable is required"))?;

        Ok(Self {
            frontend,
            host: env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_or("WEB_PORT", frontend.default_port())?,
            api_base_url: normalize_base_url(&api_base_url),
            secure_cookies: env_or("SECURE_COOKIES", false)?,
            max_upload_bytes: env_or("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }

    /// Configuration for tests and embedding, with defaults for everything
    /// except the API location
    pub fn new(frontend: Frontend, api_base_url: &str) -> Self {
        Self {
            frontend,
            host: "127.0.0.1".to_string(),
            port: frontend.default_port(),
            api_base_url: normalize_base_url(api_base_url),
            secure_cookies: false,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
