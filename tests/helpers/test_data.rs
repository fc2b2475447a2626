//! Test data builders
//!
//! Persist users, clubs and events through the services so every row goes
//! through the same validation and side effects as in production.

use ClubHub::models::{AuthResponse, Club, Event, ReviewDecision};

use super::TestContext;
use crate::fixtures::{self, ADMIN_EMAIL};

/// Register a student account
pub async fn register(ctx: &TestContext, email: &str, full_name: &str) -> AuthResponse {
    ctx.services
        .users
        .register(fixtures::register_request(email, full_name))
        .await
        .expect("Failed to register user")
}

/// Register the configured system admin
pub async fn register_admin(ctx: &TestContext) -> AuthResponse {
    register(ctx, ADMIN_EMAIL, "Dean Admin").await
}

/// Create a club as `founder_id` and approve it as `admin_id`
pub async fn approved_club(ctx: &TestContext, founder_id: i64, admin_id: i64, name: &str) -> Club {
    let club = ctx
        .services
        .clubs
        .create(founder_id, fixtures::club_request(name, None))
        .await
        .expect("Failed to create club");

    ctx.services
        .clubs
        .review(admin_id, club.id, ReviewDecision::Approve)
        .await
        .expect("Failed to approve club")
}

/// Public event a day from now
pub async fn upcoming_event(ctx: &TestContext, admin_id: i64, club_id: i64, capacity: Option<i32>) -> Event {
    ctx.services
        .events
        .create(admin_id, club_id, fixtures::event_request("Intro night", 24, capacity))
        .await
        .expect("Failed to create event")
}
