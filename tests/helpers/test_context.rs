//! Test context for unified test setup
//!
//! Wires a migrated test database, test settings and the full service
//! factory together. Redis is optional; caching and notifications degrade
//! to warnings when it is unreachable.

use axum::Router;
use tempfile::TempDir;
use ClubHub::config::Settings;
use ClubHub::database::DatabaseService;
use ClubHub::{router, AppState, ServiceFactory};

use super::database_helper::TestDatabase;
use crate::fixtures::ADMIN_EMAIL;

/// Unified test context that manages all test components
pub struct TestContext {
    pub database: TestDatabase,
    pub settings: Settings,
    pub services: ServiceFactory,
    pub temp_dir: TempDir,
}

impl TestContext {
    /// Fresh context over an empty database; `None` when no database is configured
    pub async fn new() -> Option<Self> {
        Self::with_settings(|_| {}).await
    }

    pub async fn with_settings(customize: impl FnOnce(&mut Settings)) -> Option<Self> {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let database = TestDatabase::connect().await?;
        database.cleanup().await.expect("Failed to clean test database");

        let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");
        let mut settings = test_settings(&database, &temp_dir);
        customize(&mut settings);

        let services = ServiceFactory::new(DatabaseService::new(database.pool.clone()), settings.clone())
            .expect("Failed to build services");
        services.redis.invalidate_prefix("").await;

        Some(Self {
            database,
            settings,
            services,
            temp_dir,
        })
    }

    /// Router over a fresh copy of the services
    pub fn app(&self) -> Router {
        router(AppState::new(self.services.clone(), self.settings.clone()))
    }

    pub fn redis_configured() -> bool {
        std::env::var("TEST_REDIS_URL").is_ok()
    }
}

fn test_settings(database: &TestDatabase, temp_dir: &TempDir) -> Settings {
    let mut settings = Settings::default();
    settings.database.url = database.database_url.clone();
    settings.database.acquire_timeout_seconds = 5;
    settings.redis.url = std::env::var("TEST_REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());
    settings.redis.prefix = "clubhub_test:".to_string();
    settings.auth.jwt_secret = "integration-test-secret-with-enough-bytes".to_string();
    settings.auth.system_admin_emails = vec![ADMIN_EMAIL.to_string()];
    settings.logging.directory = temp_dir.path().to_string_lossy().into_owned();
    settings
}
