/// Task item model and database operations
///
/// `completed_at` tracks `is_completed`: it is stamped when an item becomes
/// completed, kept while it stays completed, and cleared when it is reopened.
/// The rule is applied in SQL so concurrent updates can't disagree about it.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE task_items (
///     id BIGSERIAL PRIMARY KEY,
///     title VARCHAR(200) NOT NULL,
///     description VARCHAR(1000),
///     is_completed BOOLEAN NOT NULL DEFAULT FALSE,
///     created_by VARCHAR(100) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     completed_at TIMESTAMPTZ
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// A to-do item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskItem {
    /// Unique task ID
    pub id: i64,

    /// Short title (max 200 chars)
    pub title: String,

    /// Optional free text (max 1000 chars)
    pub description: Option<String>,

    /// Completion flag
    pub is_completed: bool,

    /// Username of the creator
    pub created_by: String,

    /// When the item was created
    pub created_at: DateTime<Utc>,

    /// When the item was last marked completed; None while open
    pub completed_at: Option<DateTime<Utc>>,
}

/// Input for creating a task item
#[derive(Debug, Clone)]
pub struct CreateTaskItem {
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
    pub created_by: String,
}

/// Full replacement of the editable fields
#[derive(Debug, Clone)]
pub struct UpdateTaskItem {
    pub title: String,
    pub description: Option<String>,
    pub is_completed: bool,
}

impl TaskItem {
    /// Inserts a new task item
    ///
    /// `completed_at` is set only when the item is created already completed.
    pub async fn create(pool: &PgPool, data: CreateTaskItem) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, TaskItem>(
            r#"
            INSERT INTO task_items (title, description, is_completed, created_by, completed_at)
            VALUES ($1, $2, $3, $4, CASE WHEN $3 THEN NOW() ELSE NULL END)
            RETURNING id, title, description, is_completed, created_by, created_at, completed_at
            "#,
        )
        .bind(data.title)
        .bind(data.description)
        .bind(data.is_completed)
        .bind(data.created_by)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Finds a task item by ID
    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, TaskItem>(
            r#"
            SELECT id, title, description, is_completed, created_by, created_at, completed_at
            FROM task_items
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Lists all task items ordered by ID
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, TaskItem>(
            r#"
            SELECT id, title, description, is_completed, created_by, created_at, completed_at
            FROM task_items
            ORDER BY id
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }

    /// Replaces the editable fields of a task item
    ///
    /// Returns the updated row, or None if no item has this ID.
    pub async fn update(
        pool: &PgPool,
        id: i64,
        data: UpdateTaskItem,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, TaskItem>(
            r#"
            UPDATE task_items
            SET title = $2,
                description = $3,
                is_completed = $4,
                completed_at = CASE WHEN $4 THEN COALESCE(completed_at, NOW()) ELSE NULL END
            WHERE id = $1
            RETURNING id, title, description, is_completed, created_by, created_at, completed_at
            "#,
        )
        .bind(id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.is_completed)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task item
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM task_items WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Copy of this item with the completion flag flipped
    ///
    /// Used by the web frontend's toggle action, which sends the result back
    /// as a full update.
    pub fn toggled(&self) -> UpdateTaskItem {
        UpdateTaskItem {
            title: self.title.clone(),
            description: self.description.clone(),
            is_completed: !self.is_completed,
        }
    }
}
