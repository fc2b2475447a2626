//! System admin handlers: club review and account management

use axum::extract::State;
use crate::handlers::extract::{Json, Path, Query};
use crate::handlers::AppState;
use crate::middleware::AuthUser;
use crate::models::{AdminUpdateUserRequest, Club, ClubSummary, RejectClubRequest, ReviewDecision, User, UserFilter};
use crate::utils::errors::Result;
use crate::utils::helpers::Page;

pub async fn pending_clubs(State(state): State<AppState>, user: AuthUser) -> Result<Json<Vec<ClubSummary>>> {
    Ok(Json(state.services.clubs.list_pending(user.user_id).await?))
}

pub async fn approve_club(State(state): State<AppState>, user: AuthUser, Path(id): Path<i64>) -> Result<Json<Club>> {
    Ok(Json(state.services.clubs.review(user.user_id, id, ReviewDecision::Approve).await?))
}

/// A rejection must carry a reason
pub async fn reject_club(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<RejectClubRequest>,
) -> Result<Json<Club>> {
    let decision = ReviewDecision::Reject {
        reason: request.reason.unwrap_or_default(),
    };
    Ok(Json(state.services.clubs.review(user.user_id, id, decision).await?))
}

pub async fn list_users(
    State(state): State<AppState>,
    user: AuthUser,
    Query(filter): Query<UserFilter>,
) -> Result<Json<Page<User>>> {
    Ok(Json(state.services.users.list_users(user.user_id, &filter).await?))
}

pub async fn update_user(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i64>,
    Json(request): Json<AdminUpdateUserRequest>,
) -> Result<Json<User>> {
    Ok(Json(state.services.users.admin_update(user.user_id, id, request).await?))
}
