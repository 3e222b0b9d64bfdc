// Fundamental configuration constants
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;

// Token lifetimes
pub const DEFAULT_SESSION_TTL_HOURS: u64 = 24;
pub const DEFAULT_VERIFY_TTL_HOURS: u64 = 48;
/// One year
pub const MAX_TTL_HOURS: u64 = 24 * 365;

// Secrets shorter than this are rejected at startup
pub const MIN_SECRET_LENGTH: usize = 32;

// Input limits
pub const MAX_NAME_LENGTH: usize = 100;
pub const MAX_EMAIL_LENGTH: usize = 254;
pub const MAX_TITLE_LENGTH: usize = 200;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_TOKEN_LENGTH: usize = 2048;

// Admin seed fallback name
pub const DEFAULT_ADMIN_NAME: &str = "Admin";
