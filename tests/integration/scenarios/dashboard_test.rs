//! Dashboard scenarios

use assert_matches::assert_matches;
use serial_test::serial;
use ClubHub::ClubHubError;

use crate::fixtures;
use crate::helpers::{approved_club, register, register_admin, upcoming_event};
use crate::integration::setup_integration_test;
use crate::require_db;

#[tokio::test]
#[serial]
async fn test_dashboards_reflect_activity() {
    let ctx = require_db!(setup_integration_test());
    let founder = register(&ctx, "founder@uni.test", "Fay Founder").await;
    let student = register(&ctx, "student@uni.test", "Sam Student").await;
    let admin = register_admin(&ctx).await;

    let club = approved_club(&ctx, founder.user.id, admin.user.id, "Debate Society").await;
    ctx.services
        .clubs
        .create(founder.user.id, fixtures::club_request("Knitting Circle", None))
        .await
        .unwrap();
    let event = upcoming_event(&ctx, founder.user.id, club.id, Some(20)).await;

    ctx.services.membership.join(student.user.id, club.id).await.unwrap();
    ctx.services.events.register(student.user.id, event.id).await.unwrap();

    // Student view
    let home = ctx.services.dashboard.student(student.user.id).await.unwrap();
    assert_eq!(home.profile.id, student.user.id);
    assert_eq!(home.clubs.len(), 1);
    assert_eq!(home.clubs[0].club.id, club.id);
    assert!(home.administered_club_ids.is_empty());
    assert_eq!(home.upcoming_registrations.len(), 1);
    assert_eq!(home.upcoming_registrations[0].event.id, event.id);

    let founder_home = ctx.services.dashboard.student(founder.user.id).await.unwrap();
    assert_eq!(founder_home.administered_club_ids.len(), 2);
    assert!(founder_home.administered_club_ids.contains(&club.id));
    assert!(founder_home.unread_notifications >= 1);

    // Club view
    let board = ctx.services.dashboard.club(founder.user.id, club.id).await.unwrap();
    assert_eq!(board.club.id, club.id);
    assert_eq!(board.member_count, 2);
    assert_eq!(board.admin_count, 1);
    assert_eq!(board.pending_collaborations, 0);
    assert_eq!(board.upcoming_events.len(), 1);
    assert_eq!(board.member_growth.len(), 30);
    assert!(board.member_growth.windows(2).all(|w| w[0].day < w[1].day));
    assert_eq!(board.member_growth.iter().map(|p| p.joined).sum::<i64>(), 2);

    assert_matches!(
        ctx.services.dashboard.club(student.user.id, club.id).await,
        Err(ClubHubError::PermissionDenied(_))
    );
    assert_matches!(
        ctx.services.dashboard.club(founder.user.id, 999_999).await,
        Err(ClubHubError::NotFound { .. })
    );

    // System view
    let system = ctx.services.dashboard.system(admin.user.id).await.unwrap();
    assert_eq!(system.stats.total_users, 3);
    assert_eq!(system.stats.active_users, 3);
    assert_eq!(system.stats.approved_clubs, 1);
    assert_eq!(system.stats.pending_clubs, 1);
    assert_eq!(system.stats.rejected_clubs, 0);
    assert_eq!(system.stats.total_events, 1);
    assert_eq!(system.stats.upcoming_events, 1);
    assert_eq!(system.stats.active_registrations, 1);
    assert_eq!(system.pending_clubs.len(), 1);
    assert_eq!(system.pending_clubs[0].club.name, "Knitting Circle");
    assert_eq!(system.newest_users.len(), 3);

    assert_matches!(
        ctx.services.dashboard.system(student.user.id).await,
        Err(ClubHubError::PermissionDenied(_))
    );
}
