//! Integration test scenarios
//!
//! Multi-step journeys through the services against a real database.

pub mod account_admin_test;
pub mod club_lifecycle_test;
pub mod dashboard_test;
pub mod engagement_test;
pub mod event_attendance_test;
pub mod wizard_test;
