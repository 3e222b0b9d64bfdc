//! Server configuration module
//! Loads the immutable process configuration, including both signing secrets

use crate::constants::{
    DEFAULT_HOST, DEFAULT_PORT, DEFAULT_SESSION_TTL_HOURS, DEFAULT_VERIFY_TTL_HOURS,
    MAX_TTL_HOURS, MIN_SECRET_LENGTH,
};
use crate::error::{Result, RustyTasksError};
use std::env;
use std::fmt;
use std::time::Duration;

/// Credentials for the initial administrator account
#[derive(Clone, Default)]
pub struct AdminSeedConfig {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl AdminSeedConfig {
    /// True when enough is configured to create an admin without a request body
    pub fn is_complete(&self) -> bool {
        self.email.is_some() && self.password.is_some()
    }
}

impl fmt::Debug for AdminSeedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminSeedConfig")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Server configuration parameters
#[derive(Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Secret for session tokens issued at login
    pub jwt_secret: String,
    /// Secret for email verification tokens (separate from the session secret)
    pub verify_secret: String,
    pub session_ttl: Duration,
    pub verify_ttl: Duration,
    /// Base URL used when building verification links
    pub public_url: String,
    /// Reject logins from accounts that never confirmed their email
    pub require_verified_login: bool,
    /// Development mode (verbose startup diagnostics)
    pub development_mode: bool,
    pub admin_seed: AdminSeedConfig,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("jwt_secret", &"<redacted>")
            .field("verify_secret", &"<redacted>")
            .field("session_ttl", &self.session_ttl)
            .field("verify_ttl", &self.verify_ttl)
            .field("public_url", &self.public_url)
            .field("require_verified_login", &self.require_verified_login)
            .field("development_mode", &self.development_mode)
            .field("admin_seed", &self.admin_seed)
            .finish()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        panic!("ServerConfig::default() is not allowed for security reasons. Use ServerConfig::from_env() instead.");
    }
}

impl ServerConfig {
    /// Build a configuration around two explicit secrets, validating them the
    /// same way `from_env` does. Everything else takes its default.
    pub fn with_secrets(jwt_secret: &str, verify_secret: &str) -> Result<Self> {
        Self::validate_jwt_secret(jwt_secret)?;
        Self::validate_verify_secret(verify_secret)?;
        Self::validate_secrets_are_different(jwt_secret, verify_secret)?;

        Ok(Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            jwt_secret: jwt_secret.to_string(),
            verify_secret: verify_secret.to_string(),
            session_ttl: ttl_from_hours(DEFAULT_SESSION_TTL_HOURS, "Session")?,
            verify_ttl: ttl_from_hours(DEFAULT_VERIFY_TTL_HOURS, "Verification")?,
            public_url: format!("http://localhost:{}", DEFAULT_PORT),
            require_verified_login: true,
            development_mode: false,
            admin_seed: AdminSeedConfig::default(),
        })
    }

    /// Validate that a secret meets security requirements
    fn validate_secret(secret: &str, secret_type: &str) -> Result<()> {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(RustyTasksError::ConfigError(format!(
                "{} secret must be at least {} characters long",
                secret_type, MIN_SECRET_LENGTH
            )));
        }

        // Literal placeholders that keep showing up in copied .env files
        let insecure_patterns = [
            "your-secret-key",
            "change-this",
            "JWT_SECRET",
            "VERIFY_SECRET",
            "test-secret",
            "default",
            "secret",
            "password",
            "12345",
        ];

        for pattern in &insecure_patterns {
            if secret.contains(pattern) {
                return Err(RustyTasksError::ConfigError(format!(
                    "{} secret contains insecure pattern '{}'. Please use a secure random secret generated with: openssl rand -base64 32",
                    secret_type, pattern
                )));
            }
        }

        if secret.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(RustyTasksError::ConfigError(format!(
                "{} secret should contain mixed characters (letters, numbers, symbols) for security",
                secret_type
            )));
        }

        Ok(())
    }

    fn validate_jwt_secret(secret: &str) -> Result<()> {
        Self::validate_secret(secret, "JWT")
    }

    fn validate_verify_secret(secret: &str) -> Result<()> {
        Self::validate_secret(secret, "Verification")
    }

    /// A leaked verification secret must not be able to mint sessions
    fn validate_secrets_are_different(jwt_secret: &str, verify_secret: &str) -> Result<()> {
        if jwt_secret == verify_secret {
            return Err(RustyTasksError::ConfigError(
                "JWT and verification secrets must be different. Each token audience needs its own key.".to_string(),
            ));
        }
        Ok(())
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("RUSTY_TASKS_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = lookup("RUSTY_TASKS_PORT")
            .or_else(|| lookup("PORT"))
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_PORT);

        let jwt_secret = lookup("RUSTY_TASKS_JWT_SECRET")
            .or_else(|| lookup("JWT_SECRET"))
            .ok_or_else(|| {
                RustyTasksError::ConfigError(
                    "JWT_SECRET environment variable is required for security. \
                     Generate one with: openssl rand -base64 32"
                        .to_string(),
                )
            })?;

        let verify_secret = lookup("RUSTY_TASKS_VERIFY_SECRET")
            .or_else(|| lookup("VERIFY_SECRET"))
            .ok_or_else(|| {
                RustyTasksError::ConfigError(
                    "VERIFY_SECRET environment variable is required for security. \
                     Generate one with: openssl rand -base64 32 \
                     NOTE: verification secret must be different from JWT secret."
                        .to_string(),
                )
            })?;

        let session_ttl_hours = lookup("RUSTY_TASKS_SESSION_TTL_HOURS")
            .and_then(|t| t.parse().ok())
            .unwrap_or(DEFAULT_SESSION_TTL_HOURS);

        let verify_ttl_hours = lookup("RUSTY_TASKS_VERIFY_TTL_HOURS")
            .and_then(|t| t.parse().ok())
            .unwrap_or(DEFAULT_VERIFY_TTL_HOURS);

        let session_ttl = ttl_from_hours(session_ttl_hours, "Session")?;
        let verify_ttl = ttl_from_hours(verify_ttl_hours, "Verification")?;

        let public_url = lookup("RUSTY_TASKS_PUBLIC_URL")
            .unwrap_or_else(|| format!("http://localhost:{}", port))
            .trim_end_matches('/')
            .to_string();

        let require_verified_login = lookup("RUSTY_TASKS_REQUIRE_VERIFIED_LOGIN")
            .map(|v| parse_flag(&v))
            .unwrap_or(true);

        let development_mode = lookup("RUSTY_TASKS_DEVELOPMENT_MODE")
            .map(|v| parse_flag(&v))
            .unwrap_or(false); // SECURITY: Default to false (production mode)

        let admin_seed = AdminSeedConfig {
            name: lookup("ADMIN_NAME").filter(|v| !v.trim().is_empty()),
            email: lookup("ADMIN_EMAIL").filter(|v| !v.trim().is_empty()),
            password: lookup("ADMIN_PASSWORD").filter(|v| !v.is_empty()),
        };

        Self::validate_jwt_secret(&jwt_secret)?;
        Self::validate_verify_secret(&verify_secret)?;
        Self::validate_secrets_are_different(&jwt_secret, &verify_secret)?;

        Ok(Self {
            host,
            port,
            jwt_secret,
            verify_secret,
            session_ttl,
            verify_ttl,
            public_url,
            require_verified_login,
            development_mode,
            admin_seed,
        })
    }
}

/// Token lifetime from a configured hour count, between 1 and `MAX_TTL_HOURS`
fn ttl_from_hours(hours: u64, token_type: &str) -> Result<Duration> {
    if hours == 0 || hours > MAX_TTL_HOURS {
        return Err(RustyTasksError::ConfigError(format!(
            "{} token lifetime must be between 1 and {} hours",
            token_type, MAX_TTL_HOURS
        )));
    }

    hours
        .checked_mul(3600)
        .map(Duration::from_secs)
        .ok_or_else(|| {
            RustyTasksError::ConfigError(format!("{} token lifetime is too large", token_type))
        })
}

fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}
