//! Administrator endpoints: user management, global task view, admin seeding

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::auth::guard::require_role;
use crate::auth::password::{hash_password_async, validate_password_strength};
use crate::auth::user::{Identity, Role};
use crate::constants::DEFAULT_ADMIN_NAME;
use crate::error::{Result, RustyTasksError};
use crate::handlers::{normalize_email, MessageResponse, UserProfile};
use crate::security_logger::{log_security_event, SecurityEvent};
use crate::state::AppState;
use crate::storage::{NewUser, StoredTask};

#[derive(Debug, Default, Deserialize)]
pub struct RoleUpdateRequest {
    pub role: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SeedRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeedResponse {
    pub message: String,
    pub id: i64,
    pub email: String,
}

/// Owner details attached to tasks in the admin listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OwnerSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskWithOwner {
    #[serde(flatten)]
    pub task: StoredTask,
    /// None if the owner record has disappeared
    pub user: Option<OwnerSummary>,
}

/// Role gate for this module, recording refusals
async fn require_admin(identity: &Identity, action: &str) -> Result<()> {
    if let Err(e) = require_role(identity, Role::Admin) {
        log_security_event(SecurityEvent::PermissionDenied {
            user_id: identity.subject_id(),
            action: action.to_string(),
        })
        .await;
        return Err(e);
    }
    Ok(())
}

pub async fn list_users(state: &AppState, identity: &Identity) -> Result<Vec<UserProfile>> {
    require_admin(identity, "list_users").await?;

    let users = state.users().list_users().await?;
    Ok(users.iter().map(UserProfile::from).collect())
}

pub async fn update_role(
    state: &AppState,
    identity: &Identity,
    user_id: i64,
    request: RoleUpdateRequest,
) -> Result<UserProfile> {
    require_admin(identity, "update_role").await?;

    let role: Role = request
        .role
        .as_deref()
        .ok_or_else(|| RustyTasksError::ValidationError("Invalid role".to_string()))?
        .parse()?;

    let mut user = state
        .users()
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| RustyTasksError::NotFound("User".to_string()))?;

    user.role = role;
    let user = state.users().update_user(user).await?;

    log_security_event(SecurityEvent::RoleChanged {
        admin_id: identity.subject_id(),
        user_id: user.id,
        role: role.to_string(),
    })
    .await;

    Ok(UserProfile::from(&user))
}

/// Remove a user together with every task they own
pub async fn delete_user(state: &AppState, identity: &Identity, user_id: i64) -> Result<MessageResponse> {
    require_admin(identity, "delete_user").await?;

    if state.users().find_user_by_id(user_id).await?.is_none() {
        return Err(RustyTasksError::NotFound("User".to_string()));
    }

    let removed_tasks = state.tasks().delete_tasks_for_user(user_id).await?;
    state.users().delete_user(user_id).await?;

    log::info!("User {} deleted along with {} tasks", user_id, removed_tasks);
    log_security_event(SecurityEvent::UserDeleted {
        admin_id: identity.subject_id(),
        user_id,
    })
    .await;

    Ok(MessageResponse::new("User deleted"))
}

pub async fn list_all_tasks(state: &AppState, identity: &Identity) -> Result<Vec<TaskWithOwner>> {
    require_admin(identity, "list_all_tasks").await?;

    let owners: HashMap<i64, OwnerSummary> = state
        .users()
        .list_users()
        .await?
        .into_iter()
        .map(|user| {
            (
                user.id,
                OwnerSummary {
                    id: user.id,
                    name: user.name,
                    email: user.email,
                },
            )
        })
        .collect();

    let tasks = state.tasks().list_tasks().await?;
    Ok(tasks
        .into_iter()
        .map(|task| TaskWithOwner {
            user: owners.get(&task.user_id).cloned(),
            task,
        })
        .collect())
}

pub async fn delete_task(state: &AppState, identity: &Identity, task_id: i64) -> Result<MessageResponse> {
    require_admin(identity, "delete_task").await?;

    if state.tasks().find_task_by_id(task_id).await?.is_none() {
        return Err(RustyTasksError::NotFound("Task".to_string()));
    }
    state.tasks().delete_task(task_id).await?;

    Ok(MessageResponse::new("Task deleted"))
}

/// Seed the first administrator.
///
/// Configured credentials win over the request body. While no admin exists
/// the endpoint is open; afterwards only an admin may call it.
pub async fn seed_admin(
    state: &AppState,
    caller: Option<&Identity>,
    request: SeedRequest,
) -> Result<SeedResponse> {
    let admin_exists = state
        .users()
        .list_users()
        .await?
        .iter()
        .any(|user| user.role == Role::Admin);

    if admin_exists {
        let caller = caller.ok_or(RustyTasksError::MissingToken)?;
        require_admin(caller, "seed_admin").await?;
    }

    let seed = &state.config.admin_seed;
    let name = seed
        .name
        .clone()
        .or(request.name)
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ADMIN_NAME.to_string());
    let email = seed.email.clone().or(request.email);
    let password = seed.password.clone().or(request.password);

    match (email, password) {
        (Some(email), Some(password)) if !email.trim().is_empty() && !password.is_empty() => {
            ensure_admin(state, &name, &email, password).await
        }
        _ => Err(RustyTasksError::ValidationError(
            "Provide ADMIN_EMAIL and ADMIN_PASSWORD".to_string(),
        )),
    }
}

/// Startup hook: make sure the configured admin account exists
pub async fn ensure_configured_admin(state: &AppState) -> Result<Option<SeedResponse>> {
    let seed = &state.config.admin_seed;
    if !seed.is_complete() {
        return Ok(None);
    }

    let name = seed.name.as_deref().unwrap_or(DEFAULT_ADMIN_NAME);
    let email = seed.email.as_deref().unwrap_or_default();
    let password = seed.password.clone().unwrap_or_default();
    ensure_admin(state, name, email, password).await.map(Some)
}

/// Promote an existing account or create a verified admin.
/// An existing account keeps its password.
async fn ensure_admin(state: &AppState, name: &str, email: &str, password: String) -> Result<SeedResponse> {
    let email = normalize_email(email)?;

    if let Some(mut existing) = state.users().find_user_by_email(&email).await? {
        if existing.role != Role::Admin || !existing.verified {
            existing.role = Role::Admin;
            existing.verified = true;
            existing = state.users().update_user(existing).await?;
        }
        log_security_event(SecurityEvent::AdminSeeded {
            user_id: existing.id,
            created: false,
        })
        .await;
        return Ok(SeedResponse {
            message: "Admin ensured".to_string(),
            id: existing.id,
            email,
        });
    }

    validate_password_strength(&password)?;
    let password_hash = hash_password_async(password).await?;
    let admin = state
        .users()
        .create_user(NewUser {
            name: name.trim().to_string(),
            email: email.clone(),
            password_hash,
            role: Role::Admin,
            verified: true,
        })
        .await?;

    log_security_event(SecurityEvent::AdminSeeded {
        user_id: admin.id,
        created: true,
    })
    .await;

    Ok(SeedResponse {
        message: "Admin created".to_string(),
        id: admin.id,
        email,
    })
}
