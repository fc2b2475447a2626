//! Middleware module
//!
//! Authentication extractors, request logging and rate limiting

pub mod auth;
pub mod logging;
pub mod rate_limit;

pub use auth::{AuthUser, OptionalAuthUser};
pub use logging::log_requests;
pub use rate_limit::{rate_limit, RateLimitConfig, RateLimiter};
