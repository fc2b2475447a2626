//! Club lifecycle scenarios
//!
//! Creation, review, membership and admin hand-over.

use assert_matches::assert_matches;
use serial_test::serial;
use ClubHub::models::{
    ClubFilter, ClubStatus, MemberFilter, MemberRole, NotificationFilter, NotificationKind, ReviewDecision,
    UserRole,
};
use ClubHub::ClubHubError;

use crate::fixtures;
use crate::helpers::{approved_club, register, register_admin};
use crate::integration::setup_integration_test;
use crate::require_db;

#[tokio::test]
#[serial]
async fn test_new_club_waits_for_review() {
    let ctx = require_db!(setup_integration_test());
    let founder = register(&ctx, "founder@uni.test", "Fay Founder").await;
    let outsider = register(&ctx, "outsider@uni.test", "Otto Outsider").await;
    let admin = register_admin(&ctx).await;
    assert_eq!(admin.user.role, UserRole::SystemAdmin);

    let club = ctx
        .services
        .clubs
        .create(founder.user.id, fixtures::club_request("Chess Society", None))
        .await
        .unwrap();
    assert_eq!(club.status, ClubStatus::Pending);
    assert_eq!(club.category, "Academic");
    assert_eq!(club.tags, vec!["weekly".to_string(), "beginners".to_string()]);

    // Hidden from the directory and from outsiders until approved
    let directory = ctx.services.clubs.browse(&ClubFilter::default()).await.unwrap();
    assert_eq!(directory.total, 0);
    assert_matches!(
        ctx.services.clubs.get(club.id, Some(outsider.user.id)).await,
        Err(ClubHubError::NotFound { .. })
    );
    assert!(ctx.services.clubs.get(club.id, Some(founder.user.id)).await.is_ok());
    assert_matches!(
        ctx.services.membership.join(outsider.user.id, club.id).await,
        Err(ClubHubError::InvalidInput(_))
    );
    assert_matches!(
        ctx.services.membership.membership_status(outsider.user.id, club.id).await,
        Err(ClubHubError::NotFound { .. })
    );
    assert_matches!(
        ctx.services.membership.leave(outsider.user.id, club.id).await,
        Err(ClubHubError::NotFound { .. })
    );
    let status = ctx.services.membership.membership_status(founder.user.id, club.id).await.unwrap();
    assert!(status.is_admin);

    // Only system admins review
    assert_matches!(
        ctx.services.clubs.list_pending(founder.user.id).await,
        Err(ClubHubError::PermissionDenied(_))
    );
    let pending = ctx.services.clubs.list_pending(admin.user.id).await.unwrap();
    assert_eq!(pending.len(), 1);

    let approved = ctx
        .services
        .clubs
        .review(admin.user.id, club.id, ReviewDecision::Approve)
        .await
        .unwrap();
    assert_eq!(approved.status, ClubStatus::Approved);
    assert_eq!(approved.reviewed_by, Some(admin.user.id));

    assert_matches!(
        ctx.services.clubs.review(admin.user.id, club.id, ReviewDecision::Approve).await,
        Err(ClubHubError::InvalidStateTransition { .. })
    );

    let directory = ctx.services.clubs.browse(&ClubFilter::default()).await.unwrap();
    assert_eq!(directory.total, 1);
    assert_eq!(directory.items[0].member_count, 1);

    let notifications = ctx
        .services
        .notifications
        .list(founder.user.id, &NotificationFilter::default())
        .await
        .unwrap();
    assert!(notifications.items.iter().any(|n| n.kind == NotificationKind::ClubApproved));
}

#[tokio::test]
#[serial]
async fn test_rejection_requires_reason() {
    let ctx = require_db!(setup_integration_test());
    let founder = register(&ctx, "founder@uni.test", "Fay Founder").await;
    let admin = register_admin(&ctx).await;

    let club = ctx
        .services
        .clubs
        .create(founder.user.id, fixtures::club_request("Poetry Circle", None))
        .await
        .unwrap();

    assert_matches!(
        ctx.services
            .clubs
            .review(admin.user.id, club.id, ReviewDecision::Reject { reason: "  ".to_string() })
            .await,
        Err(ClubHubError::InvalidInput(_))
    );

    let rejected = ctx
        .services
        .clubs
        .review(admin.user.id, club.id, ReviewDecision::Reject { reason: "Duplicate of an existing club".to_string() })
        .await
        .unwrap();
    assert_eq!(rejected.status, ClubStatus::Rejected);
    assert_eq!(rejected.rejection_reason.as_deref(), Some("Duplicate of an existing club"));

    assert_matches!(
        ctx.services.clubs.review(admin.user.id, club.id, ReviewDecision::Approve).await,
        Err(ClubHubError::InvalidStateTransition { .. })
    );
}

#[tokio::test]
#[serial]
async fn test_duplicate_club_name_conflicts() {
    let ctx = require_db!(setup_integration_test());
    let founder = register(&ctx, "founder@uni.test", "Fay Founder").await;

    ctx.services
        .clubs
        .create(founder.user.id, fixtures::club_request("Robotics", None))
        .await
        .unwrap();
    assert_matches!(
        ctx.services
            .clubs
            .create(founder.user.id, fixtures::club_request("Robotics", None))
            .await,
        Err(ClubHubError::Conflict(_))
    );
}

#[tokio::test]
#[serial]
async fn test_membership_and_admin_handover() {
    let ctx = require_db!(setup_integration_test());
    let founder = register(&ctx, "founder@uni.test", "Fay Founder").await;
    let student = register(&ctx, "student@uni.test", "Sam Student").await;
    let admin = register_admin(&ctx).await;
    let club = approved_club(&ctx, founder.user.id, admin.user.id, "Film Club").await;

    let member = ctx.services.membership.join(student.user.id, club.id).await.unwrap();
    assert_eq!(member.role, MemberRole::Member);
    assert_matches!(
        ctx.services.membership.join(student.user.id, club.id).await,
        Err(ClubHubError::AlreadyMember)
    );

    let status = ctx.services.membership.membership_status(student.user.id, club.id).await.unwrap();
    assert!(status.is_member);
    assert!(!status.is_admin);

    // Founder hears about the new member
    let unread = ctx.services.notifications.unread_count(founder.user.id).await.unwrap();
    assert!(unread.unread >= 1);

    // Members can see the roster; regular members cannot manage it
    let roster = ctx
        .services
        .membership
        .members(student.user.id, club.id, &MemberFilter::default())
        .await
        .unwrap();
    assert_eq!(roster.total, 2);
    assert_matches!(
        ctx.services
            .membership
            .set_member_role(student.user.id, club.id, founder.user.id, MemberRole::Member)
            .await,
        Err(ClubHubError::PermissionDenied(_))
    );

    // The only admin cannot leave
    assert_matches!(
        ctx.services.membership.leave(founder.user.id, club.id).await,
        Err(ClubHubError::Conflict(_))
    );

    ctx.services
        .membership
        .grant_admin(founder.user.id, club.id, student.user.id)
        .await
        .unwrap();
    let status = ctx.services.membership.membership_status(student.user.id, club.id).await.unwrap();
    assert!(status.is_admin);

    ctx.services.membership.leave(founder.user.id, club.id).await.unwrap();
    assert_matches!(
        ctx.services.membership.leave(founder.user.id, club.id).await,
        Err(ClubHubError::NotMember)
    );

    let managed = ctx.services.clubs.admin_clubs(student.user.id).await.unwrap();
    assert_eq!(managed.len(), 1);
    assert_eq!(managed[0].club.id, club.id);
}

#[tokio::test]
#[serial]
async fn test_member_roster_pagination() {
    let ctx = require_db!(setup_integration_test());
    let founder = register(&ctx, "founder@uni.test", "Fay Founder").await;
    let admin = register_admin(&ctx).await;
    let club = approved_club(&ctx, founder.user.id, admin.user.id, "Running Club").await;

    for index in 0..5 {
        let student = ctx.services.users.register(fixtures::fake_student(index)).await.unwrap();
        ctx.services.membership.join(student.user.id, club.id).await.unwrap();
    }

    let filter = MemberFilter {
        search: None,
        page: Some(2),
        page_size: Some(4),
    };
    let page = ctx.services.membership.members(founder.user.id, club.id, &filter).await.unwrap();
    assert_eq!(page.total, 6);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items.len(), 2);

    let summary = ctx.services.clubs.get(club.id, None).await.unwrap();
    assert_eq!(summary.member_count, 6);
}
