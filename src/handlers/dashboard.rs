//! Dashboard handlers

use axum::extract::State;
use crate::handlers::extract::{Json, Path};
use crate::handlers::AppState;
use crate::middleware::AuthUser;
use crate::models::{ClubDashboard, StudentDashboard, SystemDashboard};
use crate::utils::errors::Result;

/// `GET /api/dashboard`
pub async fn student(State(state): State<AppState>, user: AuthUser) -> Result<Json<StudentDashboard>> {
    Ok(Json(state.services.dashboard.student(user.user_id).await?))
}

/// `GET /api/clubs/{id}/dashboard`
pub async fn club(State(state): State<AppState>, user: AuthUser, Path(club_id): Path<i64>) -> Result<Json<ClubDashboard>> {
    Ok(Json(state.services.dashboard.club(user.user_id, club_id).await?))
}

/// `GET /api/admin/dashboard`
pub async fn system(State(state): State<AppState>, user: AuthUser) -> Result<Json<SystemDashboard>> {
    Ok(Json(state.services.dashboard.system(user.user_id).await?))
}
