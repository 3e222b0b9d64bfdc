use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::auth::token::Claims;
use crate::error::RustyTasksError;

/// Account roles. Closed set; anything else is rejected at the boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Admin,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Employee => "EMPLOYEE",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RustyTasksError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ADMIN" => Ok(Role::Admin),
            "EMPLOYEE" => Ok(Role::Employee),
            _ => Err(RustyTasksError::ValidationError("Invalid role".to_string())),
        }
    }
}

/// The authenticated principal of a single request.
///
/// There is no public constructor: the only way to obtain one outside this
/// crate is a successful [`crate::auth::guard::authenticate`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Identity {
    subject_id: i64,
    role: Role,
}

impl Identity {
    /// Claims without a role get the least privileged one
    pub(crate) fn from_claims(claims: &Claims) -> Self {
        Self {
            subject_id: claims.sub,
            role: claims.role.unwrap_or(Role::Employee),
        }
    }

    #[cfg(test)]
    pub(crate) fn for_testing(subject_id: i64, role: Role) -> Self {
        Self { subject_id, role }
    }

    pub fn subject_id(&self) -> i64 {
        self.subject_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
