//! University handlers

use axum::extract::State;
use axum::http::StatusCode;
use crate::handlers::extract::{Json, Path};
use crate::handlers::AppState;
use crate::middleware::AuthUser;
use crate::models::{ClubSummary, CreateUniversityRequest, University};
use crate::utils::errors::Result;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<University>>> {
    Ok(Json(state.services.universities.list().await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<University>> {
    Ok(Json(state.services.universities.get(id).await?))
}

/// Approved clubs of one university
pub async fn clubs(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Vec<ClubSummary>>> {
    Ok(Json(state.services.universities.list_clubs(id).await?))
}

/// System admins only
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateUniversityRequest>,
) -> Result<(StatusCode, Json<University>)> {
    state.services.auth.require_system_admin(user.user_id).await?;
    let university = state.services.universities.create(request).await?;
    Ok((StatusCode::CREATED, Json(university)))
}
