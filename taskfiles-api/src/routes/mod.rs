/// API route handlers
///
/// - `health`: Liveness endpoint
/// - `auth`: Login
/// - `tasks`: Task item CRUD (tasks API)
/// - `files`: Upload, download and delete (files API)

pub mod auth;
pub mod files;
pub mod health;
pub mod tasks;
