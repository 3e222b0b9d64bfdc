//! Registration, email verification and login

use serde::{Deserialize, Serialize};

use crate::auth::password::{hash_password_async, validate_password_strength, verify_password_async};
use crate::auth::user::Role;
use crate::constants::MAX_NAME_LENGTH;
use crate::error::{Result, RustyTasksError};
use crate::handlers::{normalize_email, required, MessageResponse};
use crate::security_logger::{log_security_event, SecurityEvent};
use crate::state::AppState;
use crate::storage::{NewUser, StoredUser};

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ResendVerificationRequest {
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub role: Role,
}

const RESEND_ACK: &str =
    "If the account exists and is not yet verified, a new verification link has been sent.";

/// Create an unverified employee account and send its verification link
pub async fn register(state: &AppState, request: RegisterRequest) -> Result<MessageResponse> {
    let name = required(request.name, "name")?.trim().to_string();
    let email = normalize_email(&required(request.email, "email")?)?;
    let password = required(request.password, "password")?;

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(RustyTasksError::ValidationError(format!(
            "Name must be at most {} characters",
            MAX_NAME_LENGTH
        )));
    }
    validate_password_strength(&password)?;

    if state.users().find_user_by_email(&email).await?.is_some() {
        return Err(RustyTasksError::ConflictError("Email already registered".to_string()));
    }

    let password_hash = hash_password_async(password).await?;
    let user = state
        .users()
        .create_user(NewUser {
            name,
            email,
            password_hash,
            role: Role::Employee,
            verified: false,
        })
        .await?;

    send_verification_link(state, &user)?;
    log::info!("User {} registered", user.id);

    Ok(MessageResponse::new(
        "User registered successfully. Check your email to verify the account.",
    ))
}

/// Consume a verification token. Verifying twice is harmless.
pub async fn verify_email(state: &AppState, token: &str) -> Result<MessageResponse> {
    let claims = state.verification_tokens.verify(token)?;

    let mut user = state
        .users()
        .find_user_by_id(claims.sub)
        .await?
        .ok_or_else(|| RustyTasksError::NotFound("User".to_string()))?;

    if user.verified {
        return Ok(MessageResponse::new("Email already verified. You can login now."));
    }

    user.verified = true;
    let user = state.users().update_user(user).await?;
    log_security_event(SecurityEvent::AccountVerified { user_id: user.id }).await;

    Ok(MessageResponse::new("Email verified. You can login now."))
}

/// Send a fresh link to an unverified account.
///
/// Answers identically for unknown and already verified emails.
pub async fn resend_verification(
    state: &AppState,
    request: ResendVerificationRequest,
) -> Result<MessageResponse> {
    let email = normalize_email(&required(request.email, "email")?)?;

    match state.users().find_user_by_email(&email).await? {
        Some(user) if !user.verified => send_verification_link(state, &user)?,
        Some(user) => log::debug!("Verification resend skipped: user {} already verified", user.id),
        None => log::debug!("Verification resend skipped: unknown email"),
    }

    Ok(MessageResponse::new(RESEND_ACK))
}

/// Exchange credentials for a session token
pub async fn login(state: &AppState, request: LoginRequest) -> Result<LoginResponse> {
    let email = normalize_email(&required(request.email, "email")?)?;
    let password = required(request.password, "password")?;

    let existing = state.users().find_user_by_email(&email).await?;
    let user = match existing {
        Some(user) => user,
        None => {
            log_security_event(SecurityEvent::LoginFailed {
                email,
                reason: "unknown email".to_string(),
            })
            .await;
            return Err(RustyTasksError::InvalidCredentials);
        }
    };

    if !verify_password_async(user.password_hash.clone(), password).await {
        log_security_event(SecurityEvent::LoginFailed {
            email,
            reason: "wrong password".to_string(),
        })
        .await;
        return Err(RustyTasksError::InvalidCredentials);
    }

    if state.config.require_verified_login && !user.verified {
        return Err(RustyTasksError::AccountNotVerified);
    }

    let token = state
        .session_tokens
        .issue(user.id, Some(user.role), Some(state.config.session_ttl))?;
    log_security_event(SecurityEvent::LoginSucceeded { user_id: user.id }).await;

    Ok(LoginResponse {
        token,
        role: user.role,
    })
}

fn send_verification_link(state: &AppState, user: &StoredUser) -> Result<()> {
    let token = state
        .verification_tokens
        .issue(user.id, None, Some(state.config.verify_ttl))?;
    let link = format!("{}/api/auth/verify/{}", state.config.public_url, token);
    state.notifier.send_verification(user, &link);
    Ok(())
}
