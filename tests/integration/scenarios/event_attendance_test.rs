//! Event registration and attendance scenarios

use assert_matches::assert_matches;
use serial_test::serial;
use ClubHub::models::{AttendeeFilter, ClubFilter, EventFilter, NotificationFilter, NotificationKind, ParticipantStatus, UpdateEventRequest};
use ClubHub::ClubHubError;

use crate::fixtures;
use crate::helpers::{approved_club, register, register_admin, upcoming_event, TestContext};
use crate::integration::setup_integration_test;
use crate::require_db;

#[tokio::test]
#[serial]
async fn test_capacity_and_reregistration() {
    let ctx = require_db!(setup_integration_test());
    let founder = register(&ctx, "founder@uni.test", "Fay Founder").await;
    let admin = register_admin(&ctx).await;
    let alice = register(&ctx, "alice@uni.test", "Alice Able").await;
    let bob = register(&ctx, "bob@uni.test", "Bob Baker").await;
    let club = approved_club(&ctx, founder.user.id, admin.user.id, "Astronomy Club").await;
    let event = upcoming_event(&ctx, founder.user.id, club.id, Some(1)).await;

    let participant = ctx.services.events.register(alice.user.id, event.id).await.unwrap();
    assert_eq!(participant.status, ParticipantStatus::Registered);
    assert_matches!(
        ctx.services.events.register(alice.user.id, event.id).await,
        Err(ClubHubError::AlreadyRegistered)
    );
    assert_matches!(
        ctx.services.events.register(bob.user.id, event.id).await,
        Err(ClubHubError::EventFull)
    );

    let summary = ctx.services.events.get(event.id, Some(alice.user.id)).await.unwrap();
    assert_eq!(summary.registered_count, 1);
    assert!(summary.is_registered);

    // A cancelled registration frees the seat and can be re-activated later
    let cancelled = ctx.services.events.unregister(alice.user.id, event.id).await.unwrap();
    assert_eq!(cancelled.status, ParticipantStatus::Cancelled);
    assert_matches!(
        ctx.services.events.unregister(alice.user.id, event.id).await,
        Err(ClubHubError::NotRegistered)
    );

    ctx.services.events.register(bob.user.id, event.id).await.unwrap();
    assert_matches!(
        ctx.services.events.register(alice.user.id, event.id).await,
        Err(ClubHubError::EventFull)
    );

    // Capacity cannot drop below active registrations
    assert_matches!(
        ctx.services
            .events
            .update(founder.user.id, event.id, UpdateEventRequest { capacity: Some(0), ..Default::default() })
            .await,
        Err(ClubHubError::InvalidInput(_))
    );
    ctx.services
        .events
        .update(founder.user.id, event.id, UpdateEventRequest { capacity: Some(2), ..Default::default() })
        .await
        .unwrap();

    let again = ctx.services.events.register(alice.user.id, event.id).await.unwrap();
    assert_eq!(again.status, ParticipantStatus::Registered);

    let mine = ctx.services.events.my_registrations(alice.user.id, true).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].event.id, event.id);
}

#[tokio::test]
#[serial]
async fn test_check_in_and_export() {
    let ctx = require_db!(setup_integration_test());
    let founder = register(&ctx, "founder@uni.test", "Fay Founder").await;
    let admin = register_admin(&ctx).await;
    let alice = register(&ctx, "alice@uni.test", "Alice Able").await;
    let bob = register(&ctx, "bob@uni.test", "Bob Baker").await;
    let club = approved_club(&ctx, founder.user.id, admin.user.id, "Debate Society").await;
    let event = upcoming_event(&ctx, founder.user.id, club.id, None).await;

    ctx.services.events.register(alice.user.id, event.id).await.unwrap();
    ctx.services.events.register(bob.user.id, event.id).await.unwrap();

    // Only club admins manage attendance
    assert_matches!(
        ctx.services.attendance.check_in(alice.user.id, event.id, bob.user.id).await,
        Err(ClubHubError::PermissionDenied(_))
    );

    let checked = ctx
        .services
        .attendance
        .check_in(founder.user.id, event.id, alice.user.id)
        .await
        .unwrap();
    assert_eq!(checked.status, ParticipantStatus::Attended);
    assert_eq!(checked.checked_in_by, Some(founder.user.id));
    assert_matches!(
        ctx.services.attendance.check_in(founder.user.id, event.id, alice.user.id).await,
        Err(ClubHubError::Conflict(_))
    );
    assert_matches!(
        ctx.services.attendance.check_in(founder.user.id, event.id, admin.user.id).await,
        Err(ClubHubError::NotRegistered)
    );

    // Attended registrations cannot be withdrawn
    assert_matches!(
        ctx.services.events.unregister(alice.user.id, event.id).await,
        Err(ClubHubError::Conflict(_))
    );

    let summary = ctx.services.attendance.summary(founder.user.id, event.id).await.unwrap();
    assert_eq!(summary.registered, 1);
    assert_eq!(summary.attended, 1);
    assert!((summary.attendance_rate - 0.5).abs() < f64::EPSILON);

    let list = ctx
        .services
        .attendance
        .attendees(founder.user.id, event.id, &AttendeeFilter::default())
        .await
        .unwrap();
    assert_eq!(list.page.total, 2);
    assert_eq!(list.checked_in_count, 1);

    let (file_name, csv) = ctx.services.attendance.export_csv(founder.user.id, event.id).await.unwrap();
    assert!(file_name.ends_with(".csv"));
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("Name,Email,Student ID,Status,Registered At,Checked In At"));
    assert_eq!(lines.count(), 2);
    assert!(csv.contains("alice@uni.test"));

    let undone = ctx
        .services
        .attendance
        .undo_check_in(founder.user.id, event.id, alice.user.id)
        .await
        .unwrap();
    assert_eq!(undone.status, ParticipantStatus::Registered);
    assert_matches!(
        ctx.services.attendance.undo_check_in(founder.user.id, event.id, alice.user.id).await,
        Err(ClubHubError::InvalidInput(_))
    );
}

#[tokio::test]
#[serial]
async fn test_cancelled_event_notifies_registrants() {
    let ctx = require_db!(setup_integration_test());
    let founder = register(&ctx, "founder@uni.test", "Fay Founder").await;
    let admin = register_admin(&ctx).await;
    let alice = register(&ctx, "alice@uni.test", "Alice Able").await;
    let club = approved_club(&ctx, founder.user.id, admin.user.id, "Hiking Club").await;
    let event = upcoming_event(&ctx, founder.user.id, club.id, None).await;

    ctx.services.events.register(alice.user.id, event.id).await.unwrap();

    let cancelled = ctx.services.events.cancel(founder.user.id, event.id).await.unwrap();
    assert!(cancelled.is_cancelled);
    assert_matches!(
        ctx.services.events.cancel(founder.user.id, event.id).await,
        Err(ClubHubError::InvalidStateTransition { .. })
    );
    assert_matches!(
        ctx.services.events.register(admin.user.id, event.id).await,
        Err(ClubHubError::RegistrationClosed)
    );

    let notifications = ctx
        .services
        .notifications
        .list(alice.user.id, &NotificationFilter::default())
        .await
        .unwrap();
    assert!(notifications.items.iter().any(|n| n.kind == NotificationKind::EventCancelled));
}

#[tokio::test]
#[serial]
async fn test_private_events_hidden_from_outsiders() {
    let ctx = require_db!(setup_integration_test());
    let founder = register(&ctx, "founder@uni.test", "Fay Founder").await;
    let admin = register_admin(&ctx).await;
    let outsider = register(&ctx, "outsider@uni.test", "Otto Outsider").await;
    let club = approved_club(&ctx, founder.user.id, admin.user.id, "Choir").await;

    let mut request = fixtures::event_request("Rehearsal", 48, None);
    request.is_public = Some(false);
    let private = ctx.services.events.create(founder.user.id, club.id, request).await.unwrap();
    let public = upcoming_event(&ctx, founder.user.id, club.id, None).await;

    assert_matches!(
        ctx.services.events.get(private.id, Some(outsider.user.id)).await,
        Err(ClubHubError::NotFound { .. })
    );
    assert!(ctx.services.events.get(private.id, Some(founder.user.id)).await.is_ok());

    let browse = ctx.services.events.browse(&EventFilter::default(), None).await.unwrap();
    assert_eq!(browse.total, 1);
    assert_eq!(browse.items[0].event.id, public.id);

    let link = ctx.services.events.calendar_link(public.id, None).await.unwrap();
    assert!(link.url.contains("text=Intro%20night"));
}

#[tokio::test]
#[serial]
async fn test_last_seat_goes_to_one_of_two_racers() {
    let ctx = require_db!(setup_integration_test());
    let founder = register(&ctx, "founder@uni.test", "Fay Founder").await;
    let admin = register_admin(&ctx).await;
    let alice = register(&ctx, "alice@uni.test", "Alice Able").await;
    let bob = register(&ctx, "bob@uni.test", "Bob Baker").await;
    let club = approved_club(&ctx, founder.user.id, admin.user.id, "Climbing Club").await;
    let event = upcoming_event(&ctx, founder.user.id, club.id, Some(1)).await;

    let (a, b) = tokio::join!(
        ctx.services.events.register(alice.user.id, event.id),
        ctx.services.events.register(bob.user.id, event.id)
    );
    let results = [a, b];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(results.iter().filter(|r| matches!(r, Err(ClubHubError::EventFull))).count(), 1);

    let summary = ctx.services.events.get(event.id, None).await.unwrap();
    assert_eq!(summary.registered_count, 1);

    // The same student joining twice at once ends up with one membership
    let (first, second) = tokio::join!(
        ctx.services.membership.join(alice.user.id, club.id),
        ctx.services.membership.join(alice.user.id, club.id)
    );
    let results = [first, second];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(results.iter().filter(|r| matches!(r, Err(ClubHubError::AlreadyMember))).count(), 1);
    assert_eq!(ctx.services.clubs.get(club.id, None).await.unwrap().member_count, 2);
}

#[tokio::test]
#[serial]
async fn test_event_changes_refresh_directory() {
    if !TestContext::redis_configured() {
        return;
    }
    let ctx = require_db!(setup_integration_test());
    let founder = register(&ctx, "founder@uni.test", "Fay Founder").await;
    let admin = register_admin(&ctx).await;
    let club = approved_club(&ctx, founder.user.id, admin.user.id, "Sailing Club").await;

    let directory = ctx.services.clubs.browse(&ClubFilter::default()).await.unwrap();
    assert_eq!(directory.items[0].event_count, 0);

    let event = upcoming_event(&ctx, founder.user.id, club.id, None).await;
    let directory = ctx.services.clubs.browse(&ClubFilter::default()).await.unwrap();
    assert_eq!(directory.items[0].event_count, 1);

    ctx.services.events.cancel(founder.user.id, event.id).await.unwrap();
    let directory = ctx.services.clubs.browse(&ClubFilter::default()).await.unwrap();
    assert_eq!(directory.items[0].event_count, 0);

    let event = upcoming_event(&ctx, founder.user.id, club.id, None).await;
    let directory = ctx.services.clubs.browse(&ClubFilter::default()).await.unwrap();
    assert_eq!(directory.items[0].event_count, 1);

    ctx.services.events.delete(founder.user.id, event.id).await.unwrap();
    let directory = ctx.services.clubs.browse(&ClubFilter::default()).await.unwrap();
    assert_eq!(directory.items[0].event_count, 0);
}
