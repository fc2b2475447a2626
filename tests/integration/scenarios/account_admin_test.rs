//! Account administration scenarios
//!
//! System admins search accounts, change roles and switch accounts off.

use assert_matches::assert_matches;
use axum::http::{Method, StatusCode};
use serial_test::serial;
use ClubHub::models::{AdminUpdateUserRequest, UserFilter, UserRole};
use ClubHub::ClubHubError;

use crate::fixtures;
use crate::helpers::{register, register_admin};
use crate::integration::handlers::send;
use crate::integration::setup_integration_test;
use crate::require_db;

#[tokio::test]
#[serial]
async fn test_user_search_and_paging() {
    let ctx = require_db!(setup_integration_test());
    let admin = register_admin(&ctx).await;
    let alice = register(&ctx, "alice@uni.test", "Alice Able").await;
    register(&ctx, "bob@uni.test", "Bob Baker").await;
    for index in 0..5 {
        ctx.services.users.register(fixtures::fake_student(index)).await.unwrap();
    }

    let everyone = UserFilter { search: None, page: Some(2), page_size: Some(3) };
    let page = ctx.services.users.list_users(admin.user.id, &everyone).await.unwrap();
    assert_eq!(page.total, 8);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.page, 2);
    assert_eq!(page.items.len(), 3);

    let by_domain = UserFilter { search: Some("UNI.TEST".to_string()), page: None, page_size: None };
    let page = ctx.services.users.list_users(admin.user.id, &by_domain).await.unwrap();
    assert_eq!(page.total, 2);
    assert!(page.items.iter().all(|u| u.email.ends_with("@uni.test")));

    let by_name = UserFilter { search: Some("alice able".to_string()), page: None, page_size: None };
    let page = ctx.services.users.list_users(admin.user.id, &by_name).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, alice.user.id);

    // Wildcards in the search are matched literally
    let wildcard = UserFilter { search: Some("%".to_string()), page: None, page_size: None };
    let page = ctx.services.users.list_users(admin.user.id, &wildcard).await.unwrap();
    assert_eq!(page.total, 0);

    assert_matches!(
        ctx.services.users.list_users(alice.user.id, &UserFilter::default()).await,
        Err(ClubHubError::PermissionDenied(_))
    );
}

#[tokio::test]
#[serial]
async fn test_admin_changes_role_and_guards_self() {
    let ctx = require_db!(setup_integration_test());
    let admin = register_admin(&ctx).await;
    let alice = register(&ctx, "alice@uni.test", "Alice Able").await;

    let promoted = ctx
        .services
        .users
        .admin_update(admin.user.id, alice.user.id, AdminUpdateUserRequest { role: Some(UserRole::ClubAdmin), is_active: None })
        .await
        .unwrap();
    assert_eq!(promoted.role, UserRole::ClubAdmin);
    assert!(promoted.is_active);
    assert_eq!(ctx.services.users.me(alice.user.id).await.unwrap().role, UserRole::ClubAdmin);

    // Students cannot administer accounts
    assert_matches!(
        ctx.services
            .users
            .admin_update(alice.user.id, admin.user.id, AdminUpdateUserRequest { role: None, is_active: Some(false) })
            .await,
        Err(ClubHubError::PermissionDenied(_))
    );

    assert_matches!(
        ctx.services
            .users
            .admin_update(admin.user.id, admin.user.id, AdminUpdateUserRequest { role: None, is_active: Some(false) })
            .await,
        Err(ClubHubError::InvalidInput(_))
    );
    assert_matches!(
        ctx.services
            .users
            .admin_update(admin.user.id, admin.user.id, AdminUpdateUserRequest { role: Some(UserRole::Student), is_active: None })
            .await,
        Err(ClubHubError::InvalidInput(_))
    );
    assert_matches!(
        ctx.services
            .users
            .admin_update(admin.user.id, 999_999, AdminUpdateUserRequest { role: Some(UserRole::Student), is_active: None })
            .await,
        Err(ClubHubError::NotFound { .. })
    );
}

#[tokio::test]
#[serial]
async fn test_deactivated_account_is_locked_out() {
    let ctx = require_db!(setup_integration_test());
    let app = ctx.app();
    let admin = register_admin(&ctx).await;
    let bob = register(&ctx, "bob@uni.test", "Bob Baker").await;

    let (status, _) = send(&app, Method::GET, "/api/notifications", Some(&bob.token), None).await;
    assert_eq!(status, StatusCode::OK);

    let deactivated = ctx
        .services
        .users
        .admin_update(admin.user.id, bob.user.id, AdminUpdateUserRequest { role: None, is_active: Some(false) })
        .await
        .unwrap();
    assert!(!deactivated.is_active);

    // The token is still valid but the account behind it is not
    for uri in ["/api/notifications", "/api/clubs/mine", "/api/dashboard"] {
        let (status, body) = send(&app, Method::GET, uri, Some(&bob.token), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{}", uri);
        assert_eq!(body["error"], "permission_denied");
    }

    // Optional-auth routes refuse the token too; anonymous browsing still works
    let (status, body) = send(&app, Method::GET, "/api/events", Some(&bob.token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "permission_denied");
    let (status, _) = send(&app, Method::GET, "/api/events", None, None).await;
    assert_eq!(status, StatusCode::OK);

    ctx.services
        .users
        .admin_update(admin.user.id, bob.user.id, AdminUpdateUserRequest { role: None, is_active: Some(true) })
        .await
        .unwrap();
    let (status, _) = send(&app, Method::GET, "/api/clubs/mine", Some(&bob.token), None).await;
    assert_eq!(status, StatusCode::OK);
}
