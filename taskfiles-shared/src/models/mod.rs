/// Database models for taskfiles
///
/// Each model owns its queries as associated functions taking a `&PgPool`.
///
/// # Models
///
/// - `user`: Accounts that can log in to the APIs
/// - `task_item`: To-do items managed by the tasks API
/// - `file_metadata`: Rows describing uploaded blobs, managed by the files
///   API and rewritten by the batch processor
///
/// # Example
///
/// ```no_run
/// use taskfiles_shared::models::task_item::{CreateTaskItem, TaskItem};
/// use taskfiles_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let task = TaskItem::create(
///     &pool,
///     CreateTaskItem {
///         title: "Write report".to_string(),
///         description: None,
///         is_completed: false,
///         created_by: "admin".to_string(),
///     },
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```

pub mod file_metadata;
pub mod task_item;
pub mod user;
