//! HTTP handlers module
//!
//! JSON handlers grouped by resource, plus the router that wires them to
//! paths and applies the shared middleware stack.

pub mod admin;
pub mod announcements;
pub mod attendance;
pub mod auth;
pub mod clubs;
pub mod collaborations;
pub mod dashboard;
pub mod events;
pub mod extract;
pub mod feed;
pub mod members;
pub mod notifications;
pub mod universities;
pub mod wizard;

use std::sync::Arc;
use axum::extract::State;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{delete, get, patch, post};
use axum::{middleware, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;
use crate::config::settings::Settings;
use crate::middleware::{log_requests, rate_limit, RateLimitConfig, RateLimiter};
use crate::services::ServiceFactory;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<ServiceFactory>,
    pub settings: Arc<Settings>,
    pub rate_limiter: RateLimiter,
}

impl AppState {
    pub fn new(services: ServiceFactory, settings: Settings) -> Self {
        let rate_limiter = RateLimiter::new(RateLimitConfig::from(&settings.limits));
        Self {
            services: Arc::new(services),
            settings: Arc::new(settings),
            rate_limiter,
        }
    }
}

fn cors_layer(settings: &Settings) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if settings.server.cors_origins.is_empty() {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = settings
        .server
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(origins)
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/me", get(auth::me).patch(auth::update_me))
        .route("/universities", get(universities::list).post(universities::create))
        .route("/universities/{id}", get(universities::get))
        .route("/universities/{id}/clubs", get(universities::clubs))
        .route("/clubs", get(clubs::list).post(clubs::create))
        .route("/clubs/mine", get(clubs::mine))
        .route("/clubs/managed", get(clubs::managed))
        .route("/clubs/{id}", get(clubs::get).patch(clubs::update).delete(clubs::remove))
        .route("/clubs/{id}/join", post(members::join))
        .route("/clubs/{id}/leave", post(members::leave))
        .route("/clubs/{id}/membership", get(members::status))
        .route("/clubs/{id}/members", get(members::list))
        .route(
            "/clubs/{id}/members/{user_id}",
            patch(members::set_role).delete(members::remove),
        )
        .route(
            "/clubs/{id}/admins/{user_id}",
            post(members::grant_admin).delete(members::revoke_admin),
        )
        .route("/clubs/{id}/events", get(events::club_events).post(events::create))
        .route(
            "/clubs/{id}/announcements",
            get(announcements::list).post(announcements::create),
        )
        .route("/clubs/{id}/posts", get(feed::club_posts).post(feed::create_post))
        .route(
            "/clubs/{id}/collaborations",
            get(collaborations::list).post(collaborations::request),
        )
        .route("/clubs/{id}/dashboard", get(dashboard::club))
        .route("/events", get(events::list))
        .route("/events/mine", get(events::mine))
        .route("/events/{id}", get(events::get).patch(events::update).delete(events::remove))
        .route("/events/{id}/cancel", post(events::cancel))
        .route("/events/{id}/calendar", get(events::calendar))
        .route("/events/{id}/register", post(events::register))
        .route("/events/{id}/unregister", post(events::unregister))
        .route("/events/{id}/attendees", get(attendance::list))
        .route("/events/{id}/attendees.csv", get(attendance::export_csv))
        .route("/events/{id}/attendance", get(attendance::summary))
        .route(
            "/events/{id}/attendees/{user_id}/check-in",
            post(attendance::check_in).delete(attendance::undo_check_in),
        )
        .route("/announcements/recent", get(announcements::recent))
        .route(
            "/announcements/{id}",
            patch(announcements::update).delete(announcements::remove),
        )
        .route("/feed", get(feed::feed))
        .route("/posts/{id}", delete(feed::delete_post))
        .route("/posts/{id}/like", post(feed::toggle_like))
        .route("/collaborations/{id}/accept", post(collaborations::accept))
        .route("/collaborations/{id}/reject", post(collaborations::reject))
        .route("/collaborations/{id}/cancel", post(collaborations::cancel))
        .route("/notifications", get(notifications::list))
        .route("/notifications/unread-count", get(notifications::unread_count))
        .route("/notifications/read-all", post(notifications::mark_all_read))
        .route("/notifications/{id}", delete(notifications::remove))
        .route("/notifications/{id}/read", post(notifications::mark_read))
        .route("/dashboard", get(dashboard::student))
        .route("/admin/dashboard", get(dashboard::system))
        .route("/admin/clubs/pending", get(admin::pending_clubs))
        .route("/admin/clubs/{id}/approve", post(admin::approve_club))
        .route("/admin/clubs/{id}/reject", post(admin::reject_club))
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/{id}", patch(admin::update_user))
        .route("/wizard/club", get(wizard::current).delete(wizard::cancel))
        .route("/wizard/club/start", post(wizard::start))
        .route("/wizard/club/step", post(wizard::submit_step))
        .route("/wizard/club/back", post(wizard::back))
        .route("/wizard/club/finish", post(wizard::finish))
        .layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    Router::new()
        .route("/healthz", get(healthz))
        .nest("/api", api)
        .layer(middleware::from_fn(log_requests))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.settings))
        .with_state(state)
}

/// `GET /healthz`: 200 while the database answers, 503 otherwise
async fn healthz(State(state): State<AppState>) -> Response {
    let health = state.services.health_check().await;
    let status = if health.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let body = serde_json::json!({
        "status": if health.is_healthy() { "ok" } else { "degraded" },
        "version": crate::VERSION,
        "database": health.database_healthy,
        "redis": health.redis_healthy,
        "issues": health.get_issues(),
    });
    (status, Json(body)).into_response()
}
