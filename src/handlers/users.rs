//! User-scoped self-service endpoints

use crate::auth::guard::authorize_owner;
use crate::auth::user::Identity;
use crate::error::{Result, RustyTasksError};
use crate::handlers::UserProfile;
use crate::state::AppState;

/// Profile of `user_id`, visible to that user and to admins
pub async fn get_user(state: &AppState, identity: &Identity, user_id: i64) -> Result<UserProfile> {
    let user = state
        .users()
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| RustyTasksError::NotFound("User".to_string()))?;

    authorize_owner(identity, user.id, "User")?;

    Ok(UserProfile::from(&user))
}
