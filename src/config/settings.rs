//! ClubHub settings
//!
//! Layered as built-in defaults, then an optional `config.toml`, then
//! `CLUBHUB_` environment variables (`__` separates sections).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub auth: AuthConfig,
    pub logging: LoggingConfig,
    pub features: FeaturesConfig,
    pub limits: LimitsConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origins; empty allows any origin
    pub cors_origins: Vec<String>,
}

/// Postgres pool
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_seconds: u64,
}

/// Redis cache and wizard state
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisConfig {
    pub url: String,
    pub prefix: String,
    pub ttl_seconds: u64,
}

/// Token and account configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_seconds: u64,
    /// Accounts registered with these emails become system admins
    pub system_admin_emails: Vec<String>,
}

/// Console and rolling-file logging
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: String,
    pub file_prefix: String,
    pub json: bool,
}

/// Switches for optional areas of the API
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeaturesConfig {
    pub club_approval_required: bool,
    pub collaborations: bool,
    pub social_feed: bool,
}

/// Pagination and request limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LimitsConfig {
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub rate_limit_per_minute: u32,
    pub rate_limit_burst: u32,
}

impl Settings {
    /// Load settings from defaults, the optional `config.toml` and `CLUBHUB_*` environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default())?)
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("CLUBHUB")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("auth.system_admin_emails")
                    .with_list_parse_key("server.cors_origins")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    pub fn validate(&self) -> Result<(), crate::utils::errors::ClubHubError> {
        super::validation::validate_settings(self)
    }

    /// Address the HTTP listener binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Check whether an email belongs to a configured system admin
    pub fn is_system_admin_email(&self, email: &str) -> bool {
        self.auth
            .system_admin_emails
            .iter()
            .any(|admin| admin.trim().eq_ignore_ascii_case(email.trim()))
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8080,
                cors_origins: vec![],
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/clubhub".to_string(),
                max_connections: 10,
                min_connections: 1,
                acquire_timeout_seconds: 30,
            },
            redis: RedisConfig {
                url: "redis://localhost:6379".to_string(),
                prefix: "clubhub:".to_string(),
                ttl_seconds: 3600,
            },
            auth: AuthConfig {
                jwt_secret: "change-me-please-this-is-not-a-production-secret".to_string(),
                token_ttl_seconds: 86400,
                system_admin_emails: vec![],
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                directory: "logs".to_string(),
                file_prefix: "clubhub.log".to_string(),
                json: false,
            },
            features: FeaturesConfig {
                club_approval_required: true,
                collaborations: true,
                social_feed: true,
            },
            limits: LimitsConfig {
                default_page_size: 20,
                max_page_size: 100,
                rate_limit_per_minute: 120,
                rate_limit_burst: 20,
            },
        }
    }
}
