//! # Taskfiles Shared Library
//!
//! Types and data access shared by the tasks/files APIs, the batch file
//! processor and the web frontends.
//!
//! ## Module Organization
//!
//! - `db`: Connection pool and embedded migrations
//! - `auth`: Password hashing, JWT issuing/validation, request auth context
//! - `models`: Database models and their queries
//! - `storage`: Blob storage abstraction (S3 and in-memory backends)

pub mod auth;
pub mod db;
pub mod models;
pub mod storage;

/// Current version of the taskfiles shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
