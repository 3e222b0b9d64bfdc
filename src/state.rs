//! Application state shared by every request handler

use std::sync::Arc;

use crate::auth::token::{TokenAudience, TokenManager};
use crate::config::ServerConfig;
use crate::notifier::{LogNotifier, VerificationNotifier};
use crate::storage::{StorageProvider, TaskStorage, UserStorage};

/// Immutable after startup; cloning only bumps reference counts
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Signs and verifies bearer tokens
    pub session_tokens: Arc<TokenManager>,
    /// Signs and verifies email verification tokens
    pub verification_tokens: Arc<TokenManager>,
    pub storage: Arc<dyn StorageProvider>,
    pub notifier: Arc<dyn VerificationNotifier>,
}

impl AppState {
    pub fn new(config: ServerConfig, storage: Arc<dyn StorageProvider>) -> Self {
        let session_tokens = Arc::new(TokenManager::new(&config.jwt_secret, TokenAudience::Session));
        let verification_tokens = Arc::new(TokenManager::new(
            &config.verify_secret,
            TokenAudience::Verification,
        ));

        Self {
            config: Arc::new(config),
            session_tokens,
            verification_tokens,
            storage,
            notifier: Arc::new(LogNotifier),
        }
    }

    /// Replace the verification link transport
    pub fn with_notifier(mut self, notifier: Arc<dyn VerificationNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn users(&self) -> &dyn UserStorage {
        self.storage.user_storage()
    }

    pub fn tasks(&self) -> &dyn TaskStorage {
        self.storage.task_storage()
    }
}
