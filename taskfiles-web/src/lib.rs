//! # Taskfiles Web Frontends
//!
//! Server-rendered UIs for the tasks and files APIs. Each app keeps the
//! caller's bearer token in a server-side session and forwards it on every
//! API call.
//!
//! ## Modules
//!
//! - `app`: Router builders and login middleware
//! - `client`: HTTP client for the REST APIs
//! - `config`: Configuration management
//! - `error`: Frontend error type
//! - `handlers`: Page and form handlers
//! - `server`: Process startup shared by both binaries
//! - `session`: Token and flash message storage
//! - `views`: HTML templates

pub mod app;
pub mod client;
pub mod config;
pub mod error;
pub mod handlers;
pub mod server;
pub mod session;
pub mod views;
