//! # Taskfiles API Server Library
//!
//! Router builders and handlers for the two REST backends:
//!
//! - **tasks API** (`tasks-api` binary): task item CRUD
//! - **files API** (`files-api` binary): file upload/download backed by blob
//!   storage
//!
//! Both mount `POST /api/auth/login` and `GET /api/auth/health`.
//!
//! ## Modules
//!
//! - `app`: Application state and router builders
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers
//! - `server`: Process startup shared by both binaries

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
pub mod server;
