/// User model and database operations
///
/// Users are provisioned at startup (see [`seed_demo_users`]) and are
/// read-only afterwards; the APIs only look them up during login.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     username VARCHAR(50) NOT NULL UNIQUE,
///     email VARCHAR(100) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     role VARCHAR(20) NOT NULL DEFAULT 'User',
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{debug, info};

use crate::auth::password::{hash_password, PasswordError};

/// A login-capable account
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: i64,

    /// Login name, unique
    pub username: String,

    /// Email address, unique
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Role name ("Admin" or "User")
    pub role: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub username: String,
    pub email: String,
    /// Argon2id hash, never the plaintext password
    pub password_hash: String,
    pub role: String,
}

/// Accounts provisioned when `SEED_DEMO_USERS` is enabled
///
/// `(username, email, password, role)`
pub const DEMO_USERS: &[(&str, &str, &str, &str)] = &[
    ("admin", "admin@example.com", "admin123", "Admin"),
    ("user", "user@example.com", "user123", "User"),
    ("demo", "demo@example.com", "demo123", "User"),
];

/// Error type for user provisioning
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Password(#[from] PasswordError),
}

impl User {
    /// Inserts a new user
    ///
    /// # Errors
    ///
    /// Fails on a duplicate username or email (unique constraint violation).
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, username, email, password_hash, role, created_at
            "#,
        )
        .bind(data.username)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.role)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Inserts the user unless the username or email is already taken
    ///
    /// Returns `true` if a row was inserted.
    pub async fn create_if_missing(pool: &PgPool, data: CreateUser) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(data.username)
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.role)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by username (exact match)
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }
}

/// Provisions [`DEMO_USERS`], leaving existing accounts untouched
///
/// Returns the number of accounts created. Hashing only happens for
/// usernames that don't exist yet, so restarts stay fast.
pub async fn seed_demo_users(pool: &PgPool) -> Result<usize, SeedError> {
    let mut created = 0;

    for (username, email, password, role) in DEMO_USERS {
        if User::find_by_username(pool, username).await?.is_some() {
            debug!(username = %username, "Demo user already exists");
            continue;
        }

        let inserted = User::create_if_missing(
            pool,
            CreateUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash: hash_password(password)?,
                role: role.to_string(),
            },
        )
        .await?;

        if inserted {
            info!(username = %username, role = %role, "Created demo user");
            created += 1;
        }
    }

    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_users_are_unique() {
        let mut names: Vec<_> = DEMO_USERS.iter().map(|u| u.0).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), DEMO_USERS.len());

        assert!(DEMO_USERS
            .iter()
            .any(|(name, _, _, role)| *name == "admin" && *role == "Admin"));
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User {
            id: 1,
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            password_hash: "$argon2id$secret".to_string(),
            role: "Admin".to_string(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("secret"));
    }
}
