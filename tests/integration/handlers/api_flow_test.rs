//! End-to-end HTTP flow against a real database

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use chrono::{Duration, Utc};
use serde_json::json;
use serial_test::serial;
use tower::ServiceExt;

use super::send;
use crate::fixtures::{ADMIN_EMAIL, PASSWORD};
use crate::integration::setup_integration_test;
use crate::require_db;

#[tokio::test]
#[serial]
async fn test_register_create_approve_and_attend() {
    let ctx = require_db!(setup_integration_test());
    let app = ctx.app();

    let (status, body) = send(&app, Method::GET, "/healthz", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], true);

    // Accounts
    let (status, founder) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "email": "Founder@Uni.test", "password": PASSWORD, "full_name": "Fay Founder" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(founder["user"]["email"], "founder@uni.test");
    assert!(founder["user"].get("password_hash").is_none());
    let founder_token = founder["token"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "email": "founder@uni.test", "password": PASSWORD, "full_name": "Copy Cat" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, admin) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "email": ADMIN_EMAIL, "password": PASSWORD, "full_name": "Dean Admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(admin["user"]["role"], "system_admin");
    let admin_token = admin["token"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "founder@uni.test", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");

    let (status, student) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({ "email": "student@uni.test", "password": PASSWORD, "full_name": "Sam Student" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let student_token = student["token"].as_str().unwrap().to_string();

    let (status, me) = send(&app, Method::GET, "/api/me", Some(&student_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["full_name"], "Sam Student");

    // Club creation and review
    let (status, club) = send(
        &app,
        Method::POST,
        "/api/clubs",
        Some(&founder_token),
        Some(json!({
            "name": "Board Games",
            "description": "Strategy and party games every Friday.",
            "category": "recreation",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(club["status"], "pending");
    let club_id = club["id"].as_i64().unwrap();

    let (status, _) = send(&app, Method::GET, &format!("/api/clubs/{}", club_id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&app, Method::GET, "/api/admin/clubs/pending", Some(&student_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "permission_denied");

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/admin/clubs/{}/reject", club_id),
        Some(&admin_token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, approved) = send(
        &app,
        Method::POST,
        &format!("/api/admin/clubs/{}/approve", club_id),
        Some(&admin_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "approved");

    let (status, directory) = send(&app, Method::GET, "/api/clubs?category=Recreation", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(directory["total"], 1);
    assert_eq!(directory["items"][0]["name"], "Board Games");
    assert_eq!(directory["items"][0]["member_count"], 1);

    let (status, _) = send(&app, Method::POST, &format!("/api/clubs/{}/join", club_id), Some(&student_token), None).await;
    assert!(status.is_success());
    let (status, body) = send(&app, Method::POST, &format!("/api/clubs/{}/join", club_id), Some(&student_token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "already_member");

    // Events
    let starts_at = Utc::now() + Duration::days(3);
    let (status, event) = send(
        &app,
        Method::POST,
        &format!("/api/clubs/{}/events", club_id),
        Some(&founder_token),
        Some(json!({
            "title": "Catan tournament",
            "location": "Student union",
            "starts_at": starts_at,
            "ends_at": starts_at + Duration::hours(4),
            "capacity": 12,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let event_id = event["id"].as_i64().unwrap();

    let (status, _) = send(&app, Method::POST, &format!("/api/events/{}/register", event_id), Some(&student_token), None).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, summary) = send(&app, Method::GET, &format!("/api/events/{}", event_id), Some(&student_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary["registered_count"], 1);
    assert_eq!(summary["is_registered"], true);

    let (status, _) = send(&app, Method::GET, &format!("/api/events/{}/attendance", event_id), Some(&student_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let request = Request::builder()
        .uri(format!("/api/events/{}/attendees.csv", event_id))
        .header(header::AUTHORIZATION, format!("Bearer {}", founder_token))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers()[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/csv"));
    assert!(response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().contains("attachment"));

    let (status, unread) = send(&app, Method::GET, "/api/notifications/unread-count", Some(&founder_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(unread["unread"].as_i64().unwrap() >= 2);
}
