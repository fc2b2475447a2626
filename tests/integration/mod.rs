//! Integration tests module
//!
//! Service-level scenarios against a real database, and router tests that
//! exercise the HTTP surface.

pub mod handlers;
pub mod scenarios;

use crate::helpers::TestContext;

/// Common setup; `None` means the test should be skipped
pub async fn setup_integration_test() -> Option<TestContext> {
    TestContext::new().await
}

/// Bail out of a test when no database is configured
#[macro_export]
macro_rules! require_db {
    ($setup:expr) => {
        match $setup.await {
            Some(ctx) => ctx,
            None => return,
        }
    };
}
