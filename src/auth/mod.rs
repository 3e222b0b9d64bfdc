//! Authentication and authorization module

pub mod guard;
pub mod password;
pub mod token;
pub mod user;

// Re-export main components
pub use guard::{authenticate, authorize_owner, extract_bearer_token, may_access, require_role};
pub use password::{
    hash_password, hash_password_async, validate_password_strength, verify_password,
    verify_password_async,
};
pub use token::{Claims, TokenAudience, TokenManager};
pub use user::{Identity, Role};
