//! In-memory storage implementation for development and testing
//!
//! Keeps all records in memory behind async read/write locks. Suitable for
//! development, tests, or a single-process deployment that can lose its data.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::traits::*;
use crate::error::{Result, RustyTasksError};

/// In-memory combined storage provider
pub struct MemoryStorageProvider {
    users: Arc<RwLock<HashMap<i64, StoredUser>>>,
    user_emails: Arc<RwLock<HashMap<String, i64>>>, // email -> user_id
    tasks: Arc<RwLock<HashMap<i64, StoredTask>>>,
    next_user_id: Arc<RwLock<i64>>,
    next_task_id: Arc<RwLock<i64>>,
}

impl MemoryStorageProvider {
    pub fn new() -> Self {
        Self {
            users: Arc::new(RwLock::new(HashMap::new())),
            user_emails: Arc::new(RwLock::new(HashMap::new())),
            tasks: Arc::new(RwLock::new(HashMap::new())),
            next_user_id: Arc::new(RwLock::new(1)),
            next_task_id: Arc::new(RwLock::new(1)),
        }
    }

    async fn generate_id(counter: &RwLock<i64>) -> i64 {
        let mut id = counter.write().await;
        let current = *id;
        *id += 1;
        current
    }
}

impl Default for MemoryStorageProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageProvider for MemoryStorageProvider {
    fn user_storage(&self) -> &dyn UserStorage {
        self
    }

    fn task_storage(&self) -> &dyn TaskStorage {
        self
    }

    async fn initialize(&self) -> Result<()> {
        // Nothing to initialize for memory storage
        log::info!("Memory storage provider initialized");
        Ok(())
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

#[async_trait]
impl UserStorage for MemoryStorageProvider {
    async fn create_user(&self, user: NewUser) -> Result<StoredUser> {
        let mut users = self.users.write().await;
        let mut emails = self.user_emails.write().await;

        if emails.contains_key(&user.email) {
            return Err(RustyTasksError::ConflictError("Email already registered".to_string()));
        }

        let stored = StoredUser {
            id: Self::generate_id(&self.next_user_id).await,
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            role: user.role,
            verified: user.verified,
            created_at: Utc::now(),
        };

        emails.insert(stored.email.clone(), stored.id);
        users.insert(stored.id, stored.clone());

        Ok(stored)
    }

    async fn find_user_by_id(&self, user_id: i64) -> Result<Option<StoredUser>> {
        let users = self.users.read().await;
        Ok(users.get(&user_id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<StoredUser>> {
        let users = self.users.read().await;
        let emails = self.user_emails.read().await;

        Ok(emails.get(email).and_then(|id| users.get(id)).cloned())
    }

    async fn list_users(&self) -> Result<Vec<StoredUser>> {
        let users = self.users.read().await;
        let mut result: Vec<StoredUser> = users.values().cloned().collect();
        result.sort_by_key(|user| user.id);
        Ok(result)
    }

    async fn update_user(&self, user: StoredUser) -> Result<StoredUser> {
        let mut users = self.users.write().await;
        let mut emails = self.user_emails.write().await;

        let previous_email = match users.get(&user.id) {
            Some(existing) => existing.email.clone(),
            None => return Err(RustyTasksError::NotFound("User".to_string())),
        };

        if previous_email != user.email {
            if emails.contains_key(&user.email) {
                return Err(RustyTasksError::ConflictError("Email already registered".to_string()));
            }
            emails.remove(&previous_email);
            emails.insert(user.email.clone(), user.id);
        }

        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn delete_user(&self, user_id: i64) -> Result<()> {
        let mut users = self.users.write().await;
        let mut emails = self.user_emails.write().await;

        match users.remove(&user_id) {
            Some(user) => {
                emails.remove(&user.email);
                Ok(())
            }
            None => Err(RustyTasksError::NotFound("User".to_string())),
        }
    }
}

#[async_trait]
impl TaskStorage for MemoryStorageProvider {
    async fn create_task(&self, task: NewTask) -> Result<StoredTask> {
        let stored = StoredTask {
            id: Self::generate_id(&self.next_task_id).await,
            title: task.title,
            due_date: task.due_date,
            status: TaskStatus::default(),
            user_id: task.user_id,
            created_at: Utc::now(),
        };

        self.tasks.write().await.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_task_by_id(&self, task_id: i64) -> Result<Option<StoredTask>> {
        let tasks = self.tasks.read().await;
        Ok(tasks.get(&task_id).cloned())
    }

    async fn list_tasks_for_user(&self, user_id: i64) -> Result<Vec<StoredTask>> {
        let tasks = self.tasks.read().await;
        let mut result: Vec<StoredTask> = tasks
            .values()
            .filter(|task| task.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by_key(|task| task.id);
        Ok(result)
    }

    async fn list_tasks(&self) -> Result<Vec<StoredTask>> {
        let tasks = self.tasks.read().await;
        let mut result: Vec<StoredTask> = tasks.values().cloned().collect();
        result.sort_by_key(|task| task.id);
        Ok(result)
    }

    async fn update_task_details(
        &self,
        task_id: i64,
        title: Option<String>,
        due_date: Option<DateTime<Utc>>,
    ) -> Result<StoredTask> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .get_mut(&task_id)
            .ok_or_else(|| RustyTasksError::NotFound("Task".to_string()))?;

        if let Some(title) = title {
            task.title = title;
        }
        if let Some(due_date) = due_date {
            task.due_date = due_date;
        }
        Ok(task.clone())
    }

    async fn update_task_status(&self, task_id: i64, status: TaskStatus) -> Result<StoredTask> {
        let mut tasks = self.tasks.write().await;
        let task = tasks
            .get_mut(&task_id)
            .ok_or_else(|| RustyTasksError::NotFound("Task".to_string()))?;

        if task.status != TaskStatus::Done {
            task.status = status;
        }
        Ok(task.clone())
    }

    async fn delete_task(&self, task_id: i64) -> Result<()> {
        let mut tasks = self.tasks.write().await;
        if tasks.remove(&task_id).is_some() {
            Ok(())
        } else {
            Err(RustyTasksError::NotFound("Task".to_string()))
        }
    }

    async fn delete_tasks_for_user(&self, user_id: i64) -> Result<usize> {
        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|_, task| task.user_id != user_id);
        Ok(before - tasks.len())
    }
}
