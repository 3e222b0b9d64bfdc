//! Rusty Tasks - A multi-tenant task tracking backend implemented in Rust
//!
//! This library provides bearer token authentication, role and ownership
//! checks, and the HTTP API for users, tasks and administration.

pub mod auth;
pub mod config;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod notifier;
pub mod routes;
pub mod security;
pub mod security_logger;
pub mod state;
pub mod storage;

// Re-export main components
pub use config::*;
pub use constants::*;
pub use error::{Result, RustyTasksError};
pub use routes::routes;
pub use state::AppState;
