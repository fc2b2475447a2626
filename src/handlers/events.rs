//! Event handlers: browsing, management, registration and calendar links

use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use crate::handlers::extract::{Json, Path, Query};
use crate::handlers::AppState;
use crate::middleware::{AuthUser, OptionalAuthUser};
use crate::models::{
    CalendarLink, CreateEventRequest, Event, EventFilter, EventParticipant, EventSummary, RegisteredEvent,
    UpdateEventRequest,
};
use crate::utils::errors::Result;
use crate::utils::helpers::Page;

#[derive(Debug, Default, Deserialize)]
pub struct ClubEventsQuery {
    #[serde(default)]
    pub include_past: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct MyEventsQuery {
    /// Defaults to upcoming only
    pub upcoming_only: Option<bool>,
}

/// `GET /api/events`: upcoming public events by default
pub async fn list(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    Query(filter): Query<EventFilter>,
) -> Result<Json<Page<EventSummary>>> {
    Ok(Json(state.services.events.browse(&filter, viewer.user_id()).await?))
}

pub async fn mine(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<MyEventsQuery>,
) -> Result<Json<Vec<RegisteredEvent>>> {
    let upcoming_only = query.upcoming_only.unwrap_or(true);
    Ok(Json(state.services.events.my_registrations(user.user_id, upcoming_only).await?))
}

pub async fn get(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    Path(id): Path<i64>,
) -> Result<Json<EventSummary>> {
    Ok(Json(state.services.events.get(id, viewer.user_id()).await?))
}

pub async fn club_events(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    Path(club_id): Path<i64>,
    Query(query): Query<ClubEventsQuery>,
) -> Result<Json<Vec<EventSummary>>> {
    let events = state
        .services
        .events
        .club_events(club_id, query.include_past, viewer.user_id())
        .await?;
    Ok(Json(events))
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(club_id): Path<i64>,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>)> {
    let event = state.services.events.create(user.user_id, club_id, request).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateEventRequest>,
) -> Result<Json<Event>> {
    Ok(Json(state.services.events.update(user.user_id, id, request).await?))
}

pub async fn cancel(State(state): State<AppState>, user: AuthUser, Path(id): Path<i64>) -> Result<Json<Event>> {
    Ok(Json(state.services.events.cancel(user.user_id, id).await?))
}

pub async fn remove(State(state): State<AppState>, user: AuthUser, Path(id): Path<i64>) -> Result<StatusCode> {
    state.services.events.delete(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Google Calendar template link
pub async fn calendar(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    Path(id): Path<i64>,
) -> Result<Json<CalendarLink>> {
    Ok(Json(state.services.events.calendar_link(id, viewer.user_id()).await?))
}

pub async fn register(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<(StatusCode, Json<EventParticipant>)> {
    let participant = state.services.events.register(user.user_id, id).await?;
    Ok((StatusCode::CREATED, Json(participant)))
}

pub async fn unregister(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<EventParticipant>> {
    Ok(Json(state.services.events.unregister(user.user_id, id).await?))
}
