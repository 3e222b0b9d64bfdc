//! Task CRUD for the authenticated user.
//!
//! Every operation on an existing task loads it first and only then applies
//! the ownership check, so a missing task and a foreign one look the same.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

use crate::auth::guard::authorize_owner;
use crate::auth::user::Identity;
use crate::constants::MAX_TITLE_LENGTH;
use crate::error::{Result, RustyTasksError};
use crate::handlers::{required, MessageResponse};
use crate::state::AppState;
use crate::storage::{NewTask, StoredTask, TaskStatus};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    pub title: Option<String>,
    pub due_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub due_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<TaskStatus>,
}

/// Accepts RFC 3339 timestamps or bare `YYYY-MM-DD` dates (midnight UTC)
pub fn parse_due_date(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| RustyTasksError::ValidationError("Invalid dueDate".to_string()))
}

fn validate_title(title: &str) -> Result<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(RustyTasksError::ValidationError("Title must not be empty".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(RustyTasksError::ValidationError(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    Ok(title.to_string())
}

fn already_done() -> RustyTasksError {
    RustyTasksError::ValidationError("Task already DONE".to_string())
}

/// Fetch a task and check the caller may act on it
async fn load_owned_task(state: &AppState, identity: &Identity, task_id: i64) -> Result<StoredTask> {
    let task = state
        .tasks()
        .find_task_by_id(task_id)
        .await?
        .ok_or_else(|| RustyTasksError::NotFound("Task".to_string()))?;

    authorize_owner(identity, task.user_id, "Task")?;
    Ok(task)
}

/// Move overdue, unfinished tasks to the backlog and return the fresh records
pub(crate) async fn sweep_overdue(
    state: &AppState,
    tasks: Vec<StoredTask>,
    now: DateTime<Utc>,
) -> Result<Vec<StoredTask>> {
    let mut swept = Vec::with_capacity(tasks.len());
    for task in tasks {
        if !task.is_overdue(now) || task.status == TaskStatus::Backlog {
            swept.push(task);
            continue;
        }

        // The store refuses the move if the task reached DONE since the listing
        match state.tasks().update_task_status(task.id, TaskStatus::Backlog).await {
            Ok(current) => swept.push(current),
            Err(RustyTasksError::NotFound(_)) => {} // deleted since the listing
            Err(e) => return Err(e),
        }
    }
    Ok(swept)
}

pub async fn create_task(
    state: &AppState,
    identity: &Identity,
    request: CreateTaskRequest,
) -> Result<StoredTask> {
    let title = validate_title(&required(request.title, "title")?)?;
    let due_date = parse_due_date(&required(request.due_date, "dueDate")?)?;

    let task = state
        .tasks()
        .create_task(NewTask {
            title,
            due_date,
            user_id: identity.subject_id(),
        })
        .await?;

    log::debug!("Task {} created by user {}", task.id, identity.subject_id());
    Ok(task)
}

/// The caller's own tasks, with overdue ones moved to the backlog
pub async fn list_tasks(state: &AppState, identity: &Identity) -> Result<Vec<StoredTask>> {
    let tasks = state.tasks().list_tasks_for_user(identity.subject_id()).await?;
    sweep_overdue(state, tasks, Utc::now()).await
}

pub async fn get_task(state: &AppState, identity: &Identity, task_id: i64) -> Result<StoredTask> {
    load_owned_task(state, identity, task_id).await
}

/// Change title and/or due date
pub async fn update_task(
    state: &AppState,
    identity: &Identity,
    task_id: i64,
    request: UpdateTaskRequest,
) -> Result<StoredTask> {
    if request.title.is_none() && request.due_date.is_none() {
        return Err(RustyTasksError::ValidationError(
            "Nothing to update: provide title or dueDate".to_string(),
        ));
    }

    let title = request.title.as_deref().map(validate_title).transpose()?;
    let due_date = request.due_date.as_deref().map(parse_due_date).transpose()?;

    let task = load_owned_task(state, identity, task_id).await?;
    state.tasks().update_task_details(task.id, title, due_date).await
}

/// Move a task to a new status. Finished tasks are frozen.
pub async fn update_status(
    state: &AppState,
    identity: &Identity,
    task_id: i64,
    request: UpdateStatusRequest,
) -> Result<StoredTask> {
    let status = request
        .status
        .ok_or_else(|| RustyTasksError::ValidationError("Missing field: status".to_string()))?;

    let task = load_owned_task(state, identity, task_id).await?;
    if task.status == TaskStatus::Done {
        return Err(already_done());
    }

    let updated = state.tasks().update_task_status(task.id, status).await?;
    if updated.status != status {
        return Err(already_done());
    }
    Ok(updated)
}

pub async fn delete_task(state: &AppState, identity: &Identity, task_id: i64) -> Result<MessageResponse> {
    let task = load_owned_task(state, identity, task_id).await?;
    state.tasks().delete_task(task.id).await?;
    Ok(MessageResponse::new("Task deleted"))
}
