//! Club-to-club collaboration handlers

use axum::extract::State;
use axum::http::StatusCode;
use crate::handlers::extract::{Json, Path, Query};
use crate::handlers::AppState;
use crate::middleware::AuthUser;
use crate::models::{Collaboration, CollaborationFilter, CollaborationWithClubs, CreateCollaborationRequest};
use crate::services::CollaborationResponse;
use crate::utils::errors::Result;

/// Incoming and outgoing requests of a club
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(club_id): Path<i64>,
    Query(filter): Query<CollaborationFilter>,
) -> Result<Json<Vec<CollaborationWithClubs>>> {
    Ok(Json(state.services.collaborations.list_for_club(user.user_id, club_id, &filter).await?))
}

/// Propose a collaboration from this club to another
pub async fn request(
    State(state): State<AppState>,
    user: AuthUser,
    Path(club_id): Path<i64>,
    Json(request): Json<CreateCollaborationRequest>,
) -> Result<(StatusCode, Json<Collaboration>)> {
    let collaboration = state.services.collaborations.request(user.user_id, club_id, request).await?;
    Ok((StatusCode::CREATED, Json(collaboration)))
}

pub async fn accept(State(state): State<AppState>, user: AuthUser, Path(id): Path<i64>) -> Result<Json<Collaboration>> {
    let collaboration = state
        .services
        .collaborations
        .respond(user.user_id, id, CollaborationResponse::Accept)
        .await?;
    Ok(Json(collaboration))
}

pub async fn reject(State(state): State<AppState>, user: AuthUser, Path(id): Path<i64>) -> Result<Json<Collaboration>> {
    let collaboration = state
        .services
        .collaborations
        .respond(user.user_id, id, CollaborationResponse::Reject)
        .await?;
    Ok(Json(collaboration))
}

pub async fn cancel(State(state): State<AppState>, user: AuthUser, Path(id): Path<i64>) -> Result<Json<Collaboration>> {
    Ok(Json(state.services.collaborations.cancel(user.user_id, id).await?))
}
