//! Security-focused logging module to track security events
//!
//! Never pass tokens, secrets or passwords into an event; only identifiers
//! and failure categories are recorded.

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};
use tokio::sync::RwLock;

/// Types of security events to track
#[derive(Debug, Clone)]
pub enum SecurityEvent {
    // Authentication events
    AuthenticationFailed { code: &'static str },
    LoginFailed { email: String, reason: String },
    LoginSucceeded { user_id: i64 },

    // Authorization events
    PermissionDenied { user_id: i64, action: String },

    // Account lifecycle
    AccountVerified { user_id: i64 },
    RoleChanged { admin_id: i64, user_id: i64, role: String },
    UserDeleted { admin_id: i64, user_id: i64 },
    AdminSeeded { user_id: i64, created: bool },
}

impl SecurityEvent {
    fn key(&self) -> &'static str {
        match self {
            SecurityEvent::AuthenticationFailed { .. } => "auth_failed",
            SecurityEvent::LoginFailed { .. } => "login_failed",
            SecurityEvent::LoginSucceeded { .. } => "login_success",
            SecurityEvent::PermissionDenied { .. } => "permission_denied",
            SecurityEvent::AccountVerified { .. } => "account_verified",
            SecurityEvent::RoleChanged { .. } => "role_changed",
            SecurityEvent::UserDeleted { .. } => "user_deleted",
            SecurityEvent::AdminSeeded { .. } => "admin_seeded",
        }
    }
}

/// Security logger for tracking and alerting on security events
pub struct SecurityLogger {
    event_counts: RwLock<HashMap<&'static str, usize>>,
    alert_thresholds: HashMap<&'static str, usize>,
}

impl SecurityLogger {
    /// Create a new security logger
    pub fn new() -> Self {
        let mut alert_thresholds = HashMap::new();
        alert_thresholds.insert("auth_failed", 10);
        alert_thresholds.insert("login_failed", 5);
        alert_thresholds.insert("permission_denied", 20);

        Self {
            event_counts: RwLock::new(HashMap::new()),
            alert_thresholds,
        }
    }

    /// Log a security event
    pub async fn log_event(&self, event: SecurityEvent) {
        let key = event.key();

        {
            let mut counts = self.event_counts.write().await;
            let count = counts.entry(key).or_insert(0);
            *count += 1;

            if let Some(&threshold) = self.alert_thresholds.get(key) {
                if *count % threshold == 0 {
                    log::error!("SECURITY ALERT: {} events of type '{}' detected", count, key);
                }
            }
        }

        match event {
            SecurityEvent::AuthenticationFailed { code } => {
                log::warn!("SECURITY: Authentication failed - Reason: {}", code);
            }
            SecurityEvent::LoginFailed { email, reason } => {
                log::warn!("SECURITY: Login failed - Email: {}, Reason: {}", email, reason);
            }
            SecurityEvent::LoginSucceeded { user_id } => {
                log::info!("SECURITY: Login success - User: {}", user_id);
            }
            SecurityEvent::PermissionDenied { user_id, action } => {
                log::warn!("SECURITY: Permission denied - User: {}, Action: {}", user_id, action);
            }
            SecurityEvent::AccountVerified { user_id } => {
                log::info!("SECURITY: Account verified - User: {}", user_id);
            }
            SecurityEvent::RoleChanged { admin_id, user_id, role } => {
                log::warn!("SECURITY: Role changed - Admin: {}, User: {}, Role: {}", admin_id, user_id, role);
            }
            SecurityEvent::UserDeleted { admin_id, user_id } => {
                log::warn!("SECURITY: User deleted - Admin: {}, User: {}", admin_id, user_id);
            }
            SecurityEvent::AdminSeeded { user_id, created } => {
                log::warn!("SECURITY: Admin ensured - User: {}, Created: {}", user_id, created);
            }
        }
    }

    /// Get event statistics
    pub async fn get_event_stats(&self) -> HashMap<&'static str, usize> {
        self.event_counts.read().await.clone()
    }
}

impl Default for SecurityLogger {
    fn default() -> Self {
        Self::new()
    }
}

/// Global security logger instance - thread-safe singleton
static SECURITY_LOGGER: OnceLock<Arc<SecurityLogger>> = OnceLock::new();

/// Get (initializing on first use) the global security logger
pub fn get_security_logger() -> Arc<SecurityLogger> {
    SECURITY_LOGGER
        .get_or_init(|| Arc::new(SecurityLogger::new()))
        .clone()
}

/// Log a security event using the global logger
pub async fn log_security_event(event: SecurityEvent) {
    get_security_logger().log_event(event).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_events_are_counted_per_kind() {
        let logger = SecurityLogger::new();
        logger.log_event(SecurityEvent::AuthenticationFailed { code: "INVALID_TOKEN" }).await;
        logger.log_event(SecurityEvent::AuthenticationFailed { code: "MISSING_TOKEN" }).await;
        logger.log_event(SecurityEvent::LoginSucceeded { user_id: 1 }).await;

        let stats = logger.get_event_stats().await;
        assert_eq!(stats.get("auth_failed"), Some(&2));
        assert_eq!(stats.get("login_success"), Some(&1));
        assert_eq!(stats.get("permission_denied"), None);
    }
}
