//! Club directory and management handlers

use axum::extract::State;
use axum::http::StatusCode;
use crate::handlers::extract::{Json, Path, Query};
use crate::handlers::AppState;
use crate::middleware::{AuthUser, OptionalAuthUser};
use crate::models::{Club, ClubFilter, ClubSummary, CreateClubRequest, UpdateClubRequest};
use crate::utils::errors::Result;
use crate::utils::helpers::Page;

/// `GET /api/clubs`: approved clubs, filterable and paginated
pub async fn list(State(state): State<AppState>, Query(filter): Query<ClubFilter>) -> Result<Json<Page<ClubSummary>>> {
    Ok(Json(state.services.clubs.browse(&filter).await?))
}

pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateClubRequest>,
) -> Result<(StatusCode, Json<Club>)> {
    let club = state.services.clubs.create(user.user_id, request).await?;
    Ok((StatusCode::CREATED, Json(club)))
}

/// Clubs the caller belongs to
pub async fn mine(State(state): State<AppState>, user: AuthUser) -> Result<Json<Vec<ClubSummary>>> {
    Ok(Json(state.services.clubs.my_clubs(user.user_id).await?))
}

/// Clubs the caller administers
pub async fn managed(State(state): State<AppState>, user: AuthUser) -> Result<Json<Vec<ClubSummary>>> {
    Ok(Json(state.services.clubs.admin_clubs(user.user_id).await?))
}

pub async fn get(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    Path(id): Path<i64>,
) -> Result<Json<ClubSummary>> {
    Ok(Json(state.services.clubs.get(id, viewer.user_id()).await?))
}

pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateClubRequest>,
) -> Result<Json<Club>> {
    Ok(Json(state.services.clubs.update(user.user_id, id, request).await?))
}

pub async fn remove(State(state): State<AppState>, user: AuthUser, Path(id): Path<i64>) -> Result<StatusCode> {
    state.services.clubs.delete(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
