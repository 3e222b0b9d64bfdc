use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::auth::user::Role;
use crate::error::{Result, RustyTasksError};

/// Who a token is meant for. Each audience is signed with its own secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenAudience {
    /// Bearer tokens handed out at login
    Session,
    /// Single-purpose tokens embedded in email verification links
    Verification,
}

impl TokenAudience {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenAudience::Session => "rusty-tasks/session",
            TokenAudience::Verification => "rusty-tasks/verify",
        }
    }
}

/// JWT Claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: i64,
    /// Role at issuance; verification tokens carry none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    /// Audience the token was minted for
    pub aud: String,
    /// Issued at (as UTC timestamp)
    pub iat: u64,
    /// Expiration time (as UTC timestamp), absent for non-expiring tokens
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,
}

impl Claims {
    /// True once `now` has reached the embedded expiry
    pub fn is_expired_at(&self, now: u64) -> bool {
        matches!(self.exp, Some(exp) if now >= exp)
    }
}

/// Manages JWT token operations for one audience
pub struct TokenManager {
    audience: TokenAudience,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenManager {
    /// Creates a new token manager with a secret
    pub fn new(secret: &str, audience: TokenAudience) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is optional and checked against a caller-supplied clock below
        validation.validate_exp = false;
        validation.set_required_spec_claims(&["aud"]);
        validation.set_audience(&[audience.as_str()]);

        Self {
            audience,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Issues a token for `subject_id`, expiring after `ttl` when given
    pub fn issue(&self, subject_id: i64, role: Option<Role>, ttl: Option<Duration>) -> Result<String> {
        self.issue_at(subject_id, role, ttl, unix_now())
    }

    /// Issues a token as if the current time were `now`
    pub fn issue_at(
        &self,
        subject_id: i64,
        role: Option<Role>,
        ttl: Option<Duration>,
        now: u64,
    ) -> Result<String> {
        let claims = Claims {
            sub: subject_id,
            role,
            aud: self.audience.as_str().to_string(),
            iat: now,
            exp: ttl.map(|ttl| now.saturating_add(ttl.as_secs())),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| RustyTasksError::SystemError(format!("Failed to generate token: {}", e)))
    }

    /// Validates a token against the current time
    pub fn verify(&self, token: &str) -> Result<Claims> {
        self.verify_at(token, unix_now())
    }

    /// Validates a token as if the current time were `now`.
    ///
    /// Signature, encoding, audience and expiry failures all collapse into
    /// `InvalidToken`; callers never learn which check tripped.
    pub fn verify_at(&self, token: &str, now: u64) -> Result<Claims> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                log::debug!("{} token rejected: {:?}", self.audience.as_str(), e.kind());
                RustyTasksError::InvalidToken
            })?
            .claims;

        if claims.is_expired_at(now) {
            log::debug!("{} token rejected: expired", self.audience.as_str());
            return Err(RustyTasksError::InvalidToken);
        }

        Ok(claims)
    }
}

/// Current UNIX time in seconds
pub fn unix_now() -> u64 {
    chrono::Utc::now().timestamp().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-signing-key-0123456789abcdef";

    #[test]
    fn test_issue_then_verify_preserves_claims() {
        let manager = TokenManager::new(SECRET, TokenAudience::Session);
        let token = manager
            .issue_at(7, Some(Role::Employee), Some(Duration::from_secs(60)), 1_000)
            .unwrap();

        let claims = manager.verify_at(&token, 1_030).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.role, Some(Role::Employee));
        assert_eq!(claims.iat, 1_000);
        assert_eq!(claims.exp, Some(1_060));
    }

    #[test]
    fn test_expiry_boundary_is_exclusive() {
        let manager = TokenManager::new(SECRET, TokenAudience::Session);
        let token = manager
            .issue_at(1, Some(Role::Admin), Some(Duration::from_secs(10)), 500)
            .unwrap();

        assert!(manager.verify_at(&token, 509).is_ok());
        assert!(matches!(
            manager.verify_at(&token, 510),
            Err(RustyTasksError::InvalidToken)
        ));
    }

    #[test]
    fn test_token_without_ttl_never_expires() {
        let manager = TokenManager::new(SECRET, TokenAudience::Session);
        let token = manager.issue_at(3, None, None, 0).unwrap();

        let claims = manager.verify_at(&token, u64::MAX / 2).unwrap();
        assert_eq!(claims.exp, None);
        assert_eq!(claims.role, None);
    }

    #[test]
    fn test_audiences_do_not_cross_verify() {
        let session = TokenManager::new(SECRET, TokenAudience::Session);
        let verification = TokenManager::new(SECRET, TokenAudience::Verification);

        let token = verification.issue(9, None, Some(Duration::from_secs(3600))).unwrap();
        assert!(verification.verify(&token).is_ok());
        assert!(matches!(session.verify(&token), Err(RustyTasksError::InvalidToken)));
    }
}
