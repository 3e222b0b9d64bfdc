//! Request handlers for the task tracking API
//!
//! Each handler is a plain async function over [`AppState`](crate::state::AppState)
//! and, for protected operations, the caller's [`Identity`](crate::auth::Identity).
//! HTTP wiring lives in [`crate::routes`].

pub mod admin;
pub mod auth;
pub mod tasks;
pub mod users;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::user::Role;
use crate::constants::MAX_EMAIL_LENGTH;
use crate::error::{Result, RustyTasksError};
use crate::storage::StoredUser;

/// Plain acknowledgement body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Public view of a user; never carries the password hash
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&StoredUser> for UserProfile {
    fn from(user: &StoredUser) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            verified: user.verified,
            created_at: user.created_at,
        }
    }
}

/// Unwraps a required, non-blank request field
pub(crate) fn required(value: Option<String>, field: &str) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(RustyTasksError::ValidationError(format!("Missing field: {}", field))),
    }
}

/// Trims and lowercases an email, rejecting obviously invalid ones
pub(crate) fn normalize_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    let valid_shape = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    };

    if !valid_shape || email.len() > MAX_EMAIL_LENGTH || email.chars().any(char::is_whitespace) {
        return Err(RustyTasksError::ValidationError("Invalid email address".to_string()));
    }

    Ok(email)
}
