//! Request gates: bearer authentication, role checks and resource ownership.
//!
//! All three are synchronous and free of I/O. A protected request runs
//! [`authenticate`] first and threads the resulting [`Identity`] into
//! whichever of [`require_role`] and [`may_access`] the operation needs.

use crate::auth::token::TokenManager;
use crate::auth::user::{Identity, Role};
use crate::constants::MAX_TOKEN_LENGTH;
use crate::error::{Result, RustyTasksError};

/// Extracts the token from a `Bearer <token>` header value
pub fn extract_bearer_token(auth_header: &str) -> Result<&str> {
    let mut parts = auth_header.trim().splitn(2, ' ');
    let scheme = parts.next().unwrap_or_default();
    let token = parts.next().map(str::trim).unwrap_or_default();

    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() || token.contains(' ') {
        return Err(RustyTasksError::MalformedHeader);
    }

    Ok(token)
}

/// Turns an `Authorization` header into an [`Identity`].
///
/// Fails with `MissingToken` when there is no header, `MalformedHeader` when
/// it is not a bearer credential and `InvalidToken` when verification fails.
pub fn authenticate(auth_header: Option<&str>, tokens: &TokenManager) -> Result<Identity> {
    let header = auth_header.ok_or(RustyTasksError::MissingToken)?;
    let token = extract_bearer_token(header)?;

    if token.len() > MAX_TOKEN_LENGTH || token.chars().any(|c| c.is_control()) {
        return Err(RustyTasksError::InvalidToken);
    }

    let claims = tokens.verify(token)?;
    Ok(Identity::from_claims(&claims))
}

/// Admits only identities holding `required`
pub fn require_role(identity: &Identity, required: Role) -> Result<()> {
    if identity.role() == required {
        Ok(())
    } else {
        Err(RustyTasksError::Forbidden)
    }
}

/// Whether `identity` may act on a resource owned by `owner_id`
pub fn may_access(identity: &Identity, owner_id: i64) -> bool {
    identity.is_admin() || identity.subject_id() == owner_id
}

/// Ownership check for handlers that already confirmed the resource exists.
///
/// A refusal is reported as `NotFound(resource)` so non-owners cannot tell a
/// foreign resource apart from a missing one.
pub fn authorize_owner(identity: &Identity, owner_id: i64, resource: &str) -> Result<()> {
    if may_access(identity, owner_id) {
        Ok(())
    } else {
        log::debug!(
            "Ownership check failed: subject {} on {} owned by {}",
            identity.subject_id(),
            resource,
            owner_id
        );
        Err(RustyTasksError::NotFound(resource.to_string()))
    }
}
