#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rusty_tasks::auth::guard::authenticate;
use rusty_tasks::auth::user::Identity;
use rusty_tasks::config::ServerConfig;
use rusty_tasks::handlers::admin::{seed_admin, SeedRequest};
use rusty_tasks::handlers::auth::{login, register, verify_email, LoginRequest, RegisterRequest};
use rusty_tasks::notifier::RecordingNotifier;
use rusty_tasks::state::AppState;
use rusty_tasks::error::Result;
use rusty_tasks::storage::{MemoryStorageProvider, StorageProvider, TaskStorage, UserStorage};

pub const JWT: &str = "k9F2mQ7xLp4Rt8Zv1Nc6Hs3Bw0Yd5Ja2Ue";
pub const VERIFY: &str = "Qe7Wr2Ty9Ui4Op1As6Df3Gh8Jk5Lz0Xc7V";
pub const PASS: &str = "Str0ng-Pass!";

pub struct TestApp {
    pub state: AppState,
    pub notifier: Arc<RecordingNotifier>,
}

pub fn config() -> ServerConfig {
    ServerConfig::with_secrets(JWT, VERIFY).unwrap()
}

pub fn app() -> TestApp {
    app_with(config())
}

pub fn app_with(config: ServerConfig) -> TestApp {
    app_on(config, Arc::new(MemoryStorageProvider::new()))
}

pub fn app_on(config: ServerConfig, storage: Arc<dyn StorageProvider>) -> TestApp {
    let notifier = Arc::new(RecordingNotifier::new());
    let state = AppState::new(config, storage).with_notifier(notifier.clone());
    TestApp { state, notifier }
}

/// In-memory store that counts every time a handler reaches for storage
#[derive(Default)]
pub struct CountingStorage {
    inner: MemoryStorageProvider,
    calls: AtomicUsize,
}

impl CountingStorage {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.calls.store(0, Ordering::SeqCst);
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl StorageProvider for CountingStorage {
    fn user_storage(&self) -> &dyn UserStorage {
        self.touch();
        self.inner.user_storage()
    }

    fn task_storage(&self) -> &dyn TaskStorage {
        self.touch();
        self.inner.task_storage()
    }

    async fn initialize(&self) -> Result<()> {
        self.touch();
        self.inner.initialize().await
    }

    async fn health_check(&self) -> Result<bool> {
        self.touch();
        self.inner.health_check().await
    }
}

impl TestApp {
    pub async fn register(&self, name: &str, email: &str) {
        register(
            &self.state,
            RegisterRequest {
                name: Some(name.to_string()),
                email: Some(email.to_string()),
                password: Some(PASS.to_string()),
            },
        )
        .await
        .unwrap();
    }

    /// Token from the last verification link sent to `email`
    pub fn verification_token(&self, email: &str) -> String {
        let link = self.notifier.last_link_for(email).unwrap();
        link.rsplit('/').next().unwrap().to_string()
    }

    pub async fn login_token(&self, email: &str) -> String {
        login(
            &self.state,
            LoginRequest {
                email: Some(email.to_string()),
                password: Some(PASS.to_string()),
            },
        )
        .await
        .unwrap()
        .token
    }

    pub async fn identity(&self, email: &str) -> Identity {
        let token = self.login_token(email).await;
        authenticate(Some(&format!("Bearer {}", token)), &self.state.session_tokens).unwrap()
    }

    /// Registered, verified and logged in employee
    pub async fn employee(&self, name: &str, email: &str) -> Identity {
        self.register(name, email).await;
        let token = self.verification_token(email);
        verify_email(&self.state, &token).await.unwrap();
        self.identity(email).await
    }

    /// Seeded and logged in administrator
    pub async fn admin(&self, email: &str) -> Identity {
        seed_admin(
            &self.state,
            None,
            SeedRequest {
                name: Some("Root".to_string()),
                email: Some(email.to_string()),
                password: Some(PASS.to_string()),
            },
        )
        .await
        .unwrap();
        self.identity(email).await
    }
}
