//! Startup checks for loaded settings
//!
//! Runs once in `main` before anything connects, so a bad config file fails
//! fast with a message naming the offending key.

use crate::utils::errors::{ClubHubError, Result};
use crate::utils::helpers::is_valid_email;
use super::{AuthConfig, DatabaseConfig, LimitsConfig, LoggingConfig, RedisConfig, ServerConfig, Settings};

const MIN_JWT_SECRET_LEN: usize = 32;
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

fn ensure(condition: bool, message: impl Into<String>) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(ClubHubError::Config(message.into()))
    }
}

pub fn validate_settings(settings: &Settings) -> Result<()> {
    check_server(&settings.server)?;
    check_database(&settings.database)?;
    check_redis(&settings.redis)?;
    check_auth(&settings.auth)?;
    check_logging(&settings.logging)?;
    check_limits(&settings.limits)
}

fn check_server(server: &ServerConfig) -> Result<()> {
    ensure(!server.host.is_empty(), "server.host must not be empty")
}

fn check_database(db: &DatabaseConfig) -> Result<()> {
    ensure(!db.url.is_empty(), "database.url must not be empty")?;
    ensure(db.max_connections > 0, "database.max_connections must be at least 1")?;
    ensure(
        db.min_connections <= db.max_connections,
        format!(
            "database.min_connections ({}) exceeds database.max_connections ({})",
            db.min_connections, db.max_connections
        ),
    )
}

fn check_redis(redis: &RedisConfig) -> Result<()> {
    ensure(!redis.url.is_empty(), "redis.url must not be empty")
}

fn check_auth(auth: &AuthConfig) -> Result<()> {
    ensure(
        auth.jwt_secret.len() >= MIN_JWT_SECRET_LEN,
        format!("auth.jwt_secret must be at least {} bytes", MIN_JWT_SECRET_LEN),
    )?;
    ensure(auth.token_ttl_seconds > 0, "auth.token_ttl_seconds must be at least 1")?;
    match auth.system_admin_emails.iter().find(|email| !is_valid_email(email.trim())) {
        Some(email) => Err(ClubHubError::Config(format!("auth.system_admin_emails: '{}' is not an email address", email))),
        None => Ok(()),
    }
}

fn check_logging(logging: &LoggingConfig) -> Result<()> {
    ensure(
        LOG_LEVELS.contains(&logging.level.as_str()),
        format!("logging.level '{}' is not one of {:?}", logging.level, LOG_LEVELS),
    )?;
    ensure(
        !logging.directory.is_empty() && !logging.file_prefix.is_empty(),
        "logging.directory and logging.file_prefix must not be empty",
    )
}

fn check_limits(limits: &LimitsConfig) -> Result<()> {
    ensure(
        limits.default_page_size > 0 && limits.max_page_size > 0,
        "limits page sizes must be at least 1",
    )?;
    ensure(
        limits.default_page_size <= limits.max_page_size,
        "limits.default_page_size exceeds limits.max_page_size",
    )?;
    ensure(limits.rate_limit_per_minute > 0, "limits.rate_limit_per_minute must be at least 1")
}
