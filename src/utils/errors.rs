//! Error handling for ClubHub
//!
//! This module defines the main error type used throughout the application,
//! its HTTP status mapping and the JSON body returned to clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Main error type for ClubHub application
#[derive(Error, Debug)]
pub enum ClubHubError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration loading error: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    #[error("Token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: i64 },

    #[error("You are already a member of this club")]
    AlreadyMember,

    #[error("You are not a member of this club")]
    NotMember,

    #[error("You are already registered for this event")]
    AlreadyRegistered,

    #[error("You are not registered for this event")]
    NotRegistered,

    #[error("Event is full")]
    EventFull,

    #[error("Registration for this event is closed")]
    RegistrationClosed,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Feature disabled: {0}")]
    FeatureDisabled(&'static str),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Result type alias for ClubHub operations
pub type Result<T> = std::result::Result<T, ClubHubError>;

const PG_UNIQUE_VIOLATION: &str = "23505";
const PG_FOREIGN_KEY_VIOLATION: &str = "23503";
const PG_CHECK_VIOLATION: &str = "23514";

impl ClubHubError {
    /// Shorthand for a missing entity
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        ClubHubError::NotFound { entity, id }
    }

    /// Postgres SQLSTATE of a database error, if any
    fn db_code(&self) -> Option<String> {
        match self {
            ClubHubError::Database(sqlx::Error::Database(db)) => db.code().map(|c| c.into_owned()),
            _ => None,
        }
    }

    /// Whether the error is a unique constraint violation
    pub fn is_unique_violation(&self) -> bool {
        self.db_code().as_deref() == Some(PG_UNIQUE_VIOLATION)
    }

    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            ClubHubError::Database(_) => false,
            ClubHubError::Migration(_) => false,
            ClubHubError::Redis(_) => true,
            ClubHubError::Serialization(_) => false,
            ClubHubError::Io(_) => true,
            ClubHubError::ConfigLoad(_) => false,
            ClubHubError::Token(_) => false,
            ClubHubError::Csv(_) => false,
            ClubHubError::Config(_) => false,
            ClubHubError::PasswordHash(_) => false,
            ClubHubError::NotFound { .. } => false,
            ClubHubError::AlreadyMember => false,
            ClubHubError::NotMember => false,
            ClubHubError::AlreadyRegistered => false,
            ClubHubError::NotRegistered => false,
            ClubHubError::EventFull => false,
            ClubHubError::RegistrationClosed => false,
            ClubHubError::PermissionDenied(_) => false,
            ClubHubError::Unauthorized(_) => false,
            ClubHubError::InvalidInput(_) => false,
            ClubHubError::Conflict(_) => false,
            ClubHubError::InvalidStateTransition { .. } => false,
            ClubHubError::FeatureDisabled(_) => false,
            ClubHubError::RateLimitExceeded => true,
            ClubHubError::ServiceUnavailable(_) => true,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            ClubHubError::Database(_) if self.status_code().is_client_error() => ErrorSeverity::Info,
            ClubHubError::Database(_) => ErrorSeverity::Critical,
            ClubHubError::Migration(_) => ErrorSeverity::Critical,
            ClubHubError::Config(_) | ClubHubError::ConfigLoad(_) => ErrorSeverity::Critical,
            ClubHubError::PermissionDenied(_) => ErrorSeverity::Warning,
            ClubHubError::Unauthorized(_) | ClubHubError::Token(_) => ErrorSeverity::Warning,
            ClubHubError::RateLimitExceeded => ErrorSeverity::Warning,
            ClubHubError::Redis(_)
            | ClubHubError::Serialization(_)
            | ClubHubError::Io(_)
            | ClubHubError::Csv(_)
            | ClubHubError::PasswordHash(_)
            | ClubHubError::ServiceUnavailable(_) => ErrorSeverity::Error,
            _ => ErrorSeverity::Info,
        }
    }

    /// HTTP status for the error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ClubHubError::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            ClubHubError::Database(_) => match self.db_code().as_deref() {
                Some(PG_UNIQUE_VIOLATION) => StatusCode::CONFLICT,
                Some(PG_FOREIGN_KEY_VIOLATION) | Some(PG_CHECK_VIOLATION) => StatusCode::BAD_REQUEST,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ClubHubError::NotFound { .. } | ClubHubError::FeatureDisabled(_) => StatusCode::NOT_FOUND,
            ClubHubError::AlreadyMember
            | ClubHubError::AlreadyRegistered
            | ClubHubError::EventFull
            | ClubHubError::Conflict(_)
            | ClubHubError::InvalidStateTransition { .. } => StatusCode::CONFLICT,
            ClubHubError::NotMember
            | ClubHubError::NotRegistered
            | ClubHubError::RegistrationClosed
            | ClubHubError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ClubHubError::PermissionDenied(_) => StatusCode::FORBIDDEN,
            ClubHubError::Unauthorized(_) | ClubHubError::Token(_) => StatusCode::UNAUTHORIZED,
            ClubHubError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
            ClubHubError::ServiceUnavailable(_) | ClubHubError::Redis(_) => StatusCode::SERVICE_UNAVAILABLE,
            ClubHubError::Migration(_)
            | ClubHubError::Serialization(_)
            | ClubHubError::Io(_)
            | ClubHubError::Csv(_)
            | ClubHubError::ConfigLoad(_)
            | ClubHubError::Config(_)
            | ClubHubError::PasswordHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable error code
    pub fn code(&self) -> &'static str {
        match self {
            ClubHubError::Database(_) => match self.status_code() {
                StatusCode::NOT_FOUND => "not_found",
                StatusCode::CONFLICT => "conflict",
                StatusCode::BAD_REQUEST => "invalid_input",
                _ => "internal",
            },
            ClubHubError::NotFound { .. } => "not_found",
            ClubHubError::AlreadyMember => "already_member",
            ClubHubError::NotMember => "not_member",
            ClubHubError::AlreadyRegistered => "already_registered",
            ClubHubError::NotRegistered => "not_registered",
            ClubHubError::EventFull => "event_full",
            ClubHubError::RegistrationClosed => "registration_closed",
            ClubHubError::PermissionDenied(_) => "permission_denied",
            ClubHubError::Unauthorized(_) | ClubHubError::Token(_) => "unauthorized",
            ClubHubError::InvalidInput(_) => "invalid_input",
            ClubHubError::Conflict(_) => "conflict",
            ClubHubError::InvalidStateTransition { .. } => "invalid_state_transition",
            ClubHubError::FeatureDisabled(_) => "feature_disabled",
            ClubHubError::RateLimitExceeded => "rate_limited",
            ClubHubError::ServiceUnavailable(_) | ClubHubError::Redis(_) => "service_unavailable",
            _ => "internal",
        }
    }

    /// Message safe to show to clients
    pub fn public_message(&self) -> String {
        match self.status_code() {
            StatusCode::INTERNAL_SERVER_ERROR => "Internal server error".to_string(),
            StatusCode::SERVICE_UNAVAILABLE => "Service temporarily unavailable".to_string(),
            StatusCode::CONFLICT if matches!(self, ClubHubError::Database(_)) => {
                "A record with the same values already exists".to_string()
            }
            StatusCode::BAD_REQUEST if matches!(self, ClubHubError::Database(_)) => {
                "Referenced record does not exist or value is out of range".to_string()
            }
            StatusCode::UNAUTHORIZED if matches!(self, ClubHubError::Token(_)) => {
                "Invalid or expired token".to_string()
            }
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for ClubHubError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self.severity() {
            ErrorSeverity::Critical | ErrorSeverity::Error => {
                tracing::error!(error = %self, severity = %self.severity(), "Request failed");
            }
            ErrorSeverity::Warning => tracing::warn!(error = %self, "Request rejected"),
            ErrorSeverity::Info => tracing::debug!(error = %self, "Request rejected"),
        }

        let body = Json(serde_json::json!({
            "error": self.code(),
            "message": self.public_message(),
        }));

        (status, body).into_response()
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
