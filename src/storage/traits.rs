//! Abstract storage interfaces for pluggable backends
//!
//! Handlers talk to persistence exclusively through these traits. Lookups
//! return `Ok(None)` for absent records; mutations of absent records fail
//! with `NotFound`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::user::Role;
use crate::error::Result;

/// Persisted user account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUser {
    pub id: i64,
    pub name: String,
    /// Unique, stored lowercased
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields required to create a user; the store assigns the id
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub verified: bool,
}

/// Task lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
    /// Overdue and not finished
    Backlog,
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Todo
    }
}

/// Persisted task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTask {
    pub id: i64,
    pub title: String,
    pub due_date: DateTime<Utc>,
    pub status: TaskStatus,
    /// Owner
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

impl StoredTask {
    /// Unfinished tasks whose due date has passed
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.status != TaskStatus::Done && self.due_date < now
    }
}

/// Fields required to create a task; the store assigns the id
#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub due_date: DateTime<Utc>,
    pub user_id: i64,
}

/// User data storage interface
#[async_trait]
pub trait UserStorage: Send + Sync {
    /// Create a new user, failing with a conflict if the email is taken
    async fn create_user(&self, user: NewUser) -> Result<StoredUser>;

    /// Get user by ID
    async fn find_user_by_id(&self, user_id: i64) -> Result<Option<StoredUser>>;

    /// Get user by (lowercased) email
    async fn find_user_by_email(&self, email: &str) -> Result<Option<StoredUser>>;

    /// List all users ordered by id
    async fn list_users(&self) -> Result<Vec<StoredUser>>;

    /// Replace a user's record
    async fn update_user(&self, user: StoredUser) -> Result<StoredUser>;

    /// Delete a user
    async fn delete_user(&self, user_id: i64) -> Result<()>;
}

/// Task storage interface
#[async_trait]
pub trait TaskStorage: Send + Sync {
    /// Create a new task
    async fn create_task(&self, task: NewTask) -> Result<StoredTask>;

    /// Get task by ID
    async fn find_task_by_id(&self, task_id: i64) -> Result<Option<StoredTask>>;

    /// Tasks owned by one user, ordered by id
    async fn list_tasks_for_user(&self, user_id: i64) -> Result<Vec<StoredTask>>;

    /// Every task, ordered by id
    async fn list_tasks(&self) -> Result<Vec<StoredTask>>;

    /// Change title and/or due date, leaving the status untouched
    async fn update_task_details(
        &self,
        task_id: i64,
        title: Option<String>,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<StoredTask>;

    /// Set the status unless the task is already DONE.
    ///
    /// The check and the write are atomic. The stored record is returned either
    /// way; a status different from the requested one means the task was DONE.
    async fn update_task_status(&self, task_id: i64, status: TaskStatus) -> Result<StoredTask>;

    /// Delete a task
    async fn delete_task(&self, task_id: i64) -> Result<()>;

    /// Delete every task owned by a user, returning how many went away
    async fn delete_tasks_for_user(&self, user_id: i64) -> Result<usize>;
}

/// Combined storage provider interface
#[async_trait]
pub trait StorageProvider: Send + Sync {
    /// Get user storage backend
    fn user_storage(&self) -> &dyn UserStorage;

    /// Get task storage backend
    fn task_storage(&self) -> &dyn TaskStorage;

    /// Initialize the storage backend (create tables, etc.)
    async fn initialize(&self) -> Result<()>;

    /// Health check for the storage backend
    async fn health_check(&self) -> Result<bool>;
}
