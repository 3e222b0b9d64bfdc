//! Security utilities and middleware

pub mod headers;

pub use headers::with_api_security_headers;
