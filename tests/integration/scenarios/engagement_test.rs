//! Announcements, activity feed and collaboration scenarios

use assert_matches::assert_matches;
use serial_test::serial;
use ClubHub::models::{
    AnnouncementPriority, CollaborationFilter, CollaborationStatus, NotificationFilter, NotificationKind,
};
use ClubHub::services::CollaborationResponse;
use ClubHub::utils::PageRequest;
use ClubHub::ClubHubError;

use crate::fixtures;
use crate::helpers::{approved_club, register, register_admin};
use crate::integration::setup_integration_test;
use crate::require_db;

#[tokio::test]
#[serial]
async fn test_announcements_reach_members() {
    let ctx = require_db!(setup_integration_test());
    let founder = register(&ctx, "founder@uni.test", "Fay Founder").await;
    let admin = register_admin(&ctx).await;
    let alice = register(&ctx, "alice@uni.test", "Alice Able").await;
    let club = approved_club(&ctx, founder.user.id, admin.user.id, "Photography Club").await;
    ctx.services.membership.join(alice.user.id, club.id).await.unwrap();
    let before = ctx.services.notifications.unread_count(alice.user.id).await.unwrap().unread;

    assert_matches!(
        ctx.services
            .announcements
            .create(alice.user.id, club.id, fixtures::announcement_request("Members cannot post", AnnouncementPriority::Normal))
            .await,
        Err(ClubHubError::PermissionDenied(_))
    );

    ctx.services
        .announcements
        .create(founder.user.id, club.id, fixtures::announcement_request("Room change", AnnouncementPriority::Normal))
        .await
        .unwrap();
    let after_normal = ctx.services.notifications.unread_count(alice.user.id).await.unwrap().unread;
    assert_eq!(after_normal, before);

    ctx.services
        .announcements
        .create(founder.user.id, club.id, fixtures::announcement_request("Exhibition tonight", AnnouncementPriority::Urgent))
        .await
        .unwrap();
    let after_urgent = ctx.services.notifications.unread_count(alice.user.id).await.unwrap().unread;
    assert_eq!(after_urgent, before + 1);

    let listed = ctx.services.announcements.list(Some(alice.user.id), club.id).await.unwrap();
    assert_eq!(listed.len(), 2);
    let recent = ctx.services.announcements.recent_for_user(alice.user.id).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert!(recent.iter().all(|a| a.club_name == "Photography Club"));

    let updated = ctx.services.notifications.mark_all_read(alice.user.id).await.unwrap();
    assert_eq!(updated as i64, after_urgent);
    assert_eq!(ctx.services.notifications.unread_count(alice.user.id).await.unwrap().unread, 0);
}

#[tokio::test]
#[serial]
async fn test_feed_and_likes() {
    let ctx = require_db!(setup_integration_test());
    let founder = register(&ctx, "founder@uni.test", "Fay Founder").await;
    let admin = register_admin(&ctx).await;
    let alice = register(&ctx, "alice@uni.test", "Alice Able").await;
    let club = approved_club(&ctx, founder.user.id, admin.user.id, "Garden Club").await;
    ctx.services.membership.join(alice.user.id, club.id).await.unwrap();

    let post = ctx
        .services
        .feed
        .create_post(founder.user.id, club.id, fixtures::post_request("Tomatoes are ripe"))
        .await
        .unwrap();
    assert_eq!(post.like_count, 0);
    assert_eq!(post.club_name, "Garden Club");

    let liked = ctx.services.feed.toggle_like(alice.user.id, post.id).await.unwrap();
    assert!(liked.liked);
    assert_eq!(liked.like_count, 1);

    let feed = ctx.services.feed.feed_for_user(alice.user.id, PageRequest::default()).await.unwrap();
    assert_eq!(feed.total, 1);
    assert!(feed.items[0].liked_by_me);

    let unliked = ctx.services.feed.toggle_like(alice.user.id, post.id).await.unwrap();
    assert!(!unliked.liked);
    assert_eq!(unliked.like_count, 0);

    assert_matches!(
        ctx.services.feed.delete_post(alice.user.id, post.id).await,
        Err(ClubHubError::PermissionDenied(_))
    );
    ctx.services.feed.delete_post(founder.user.id, post.id).await.unwrap();
    assert_matches!(
        ctx.services.feed.toggle_like(alice.user.id, post.id).await,
        Err(ClubHubError::NotFound { .. })
    );
}

#[tokio::test]
#[serial]
async fn test_collaboration_handshake() {
    let ctx = require_db!(setup_integration_test());
    let first = register(&ctx, "first@uni.test", "First Founder").await;
    let second = register(&ctx, "second@uni.test", "Second Founder").await;
    let admin = register_admin(&ctx).await;
    let coders = approved_club(&ctx, first.user.id, admin.user.id, "Coding Club").await;
    let designers = approved_club(&ctx, second.user.id, admin.user.id, "Design Club").await;

    assert_matches!(
        ctx.services
            .collaborations
            .request(first.user.id, coders.id, fixtures::collaboration_request(coders.id))
            .await,
        Err(ClubHubError::InvalidInput(_))
    );

    let proposal = ctx
        .services
        .collaborations
        .request(first.user.id, coders.id, fixtures::collaboration_request(designers.id))
        .await
        .unwrap();
    assert_eq!(proposal.status, CollaborationStatus::Pending);
    assert_matches!(
        ctx.services
            .collaborations
            .request(first.user.id, coders.id, fixtures::collaboration_request(designers.id))
            .await,
        Err(ClubHubError::Conflict(_))
    );

    // Only the target club answers
    assert_matches!(
        ctx.services
            .collaborations
            .respond(first.user.id, proposal.id, CollaborationResponse::Accept)
            .await,
        Err(ClubHubError::PermissionDenied(_))
    );

    let incoming = ctx
        .services
        .collaborations
        .list_for_club(second.user.id, designers.id, &CollaborationFilter::default())
        .await
        .unwrap();
    assert_eq!(incoming.len(), 1);
    assert_eq!(incoming[0].requester_club_name, "Coding Club");

    let accepted = ctx
        .services
        .collaborations
        .respond(second.user.id, proposal.id, CollaborationResponse::Accept)
        .await
        .unwrap();
    assert_eq!(accepted.status, CollaborationStatus::Accepted);
    assert_eq!(accepted.responded_by, Some(second.user.id));

    assert_matches!(
        ctx.services.collaborations.cancel(first.user.id, proposal.id).await,
        Err(ClubHubError::InvalidStateTransition { .. })
    );

    let notifications = ctx
        .services
        .notifications
        .list(first.user.id, &NotificationFilter::default())
        .await
        .unwrap();
    assert!(notifications.items.iter().any(|n| n.kind == NotificationKind::CollaborationAccepted));
}
