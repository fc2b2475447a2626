//! Announcement handlers

use axum::extract::State;
use axum::http::StatusCode;
use crate::handlers::extract::{Json, Path};
use crate::handlers::AppState;
use crate::middleware::{AuthUser, OptionalAuthUser};
use crate::models::{Announcement, AnnouncementWithAuthor, CreateAnnouncementRequest, UpdateAnnouncementRequest};
use crate::utils::errors::Result;

pub async fn list(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    Path(club_id): Path<i64>,
) -> Result<Json<Vec<AnnouncementWithAuthor>>> {
    Ok(Json(state.services.announcements.list(viewer.user_id(), club_id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Path(club_id): Path<i64>,
    Json(request): Json<CreateAnnouncementRequest>,
) -> Result<(StatusCode, Json<Announcement>)> {
    let announcement = state.services.announcements.create(user.user_id, club_id, request).await?;
    Ok((StatusCode::CREATED, Json(announcement)))
}

pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateAnnouncementRequest>,
) -> Result<Json<Announcement>> {
    Ok(Json(state.services.announcements.update(user.user_id, id, request).await?))
}

pub async fn remove(State(state): State<AppState>, user: AuthUser, Path(id): Path<i64>) -> Result<StatusCode> {
    state.services.announcements.delete(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Latest announcements across the caller's clubs
pub async fn recent(State(state): State<AppState>, user: AuthUser) -> Result<Json<Vec<AnnouncementWithAuthor>>> {
    Ok(Json(state.services.announcements.recent_for_user(user.user_id).await?))
}
