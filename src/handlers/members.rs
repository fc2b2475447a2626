//! Membership handlers: join/leave, member lists, roles and admin grants

use axum::extract::State;
use axum::http::StatusCode;
use crate::handlers::extract::{Json, Path, Query};
use crate::handlers::AppState;
use crate::middleware::AuthUser;
use crate::models::{ClubAdmin, ClubMember, MemberFilter, MemberWithProfile, MembershipStatus, UpdateMemberRoleRequest};
use crate::utils::errors::Result;
use crate::utils::helpers::Page;

pub async fn join(
    State(state): State<AppState>,
    user: AuthUser,
    Path(club_id): Path<i64>,
) -> Result<(StatusCode, Json<ClubMember>)> {
    let member = state.services.membership.join(user.user_id, club_id).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

pub async fn leave(State(state): State<AppState>, user: AuthUser, Path(club_id): Path<i64>) -> Result<StatusCode> {
    state.services.membership.leave(user.user_id, club_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// What the join/leave button renders from
pub async fn status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(club_id): Path<i64>,
) -> Result<Json<MembershipStatus>> {
    Ok(Json(state.services.membership.membership_status(user.user_id, club_id).await?))
}

pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(club_id): Path<i64>,
    Query(filter): Query<MemberFilter>,
) -> Result<Json<Page<MemberWithProfile>>> {
    Ok(Json(state.services.membership.members(user.user_id, club_id, &filter).await?))
}

pub async fn set_role(
    State(state): State<AppState>,
    user: AuthUser,
    Path((club_id, member_id)): Path<(i64, i64)>,
    Json(request): Json<UpdateMemberRoleRequest>,
) -> Result<Json<ClubMember>> {
    let member = state
        .services
        .membership
        .set_member_role(user.user_id, club_id, member_id, request.role)
        .await?;
    Ok(Json(member))
}

pub async fn remove(
    State(state): State<AppState>,
    user: AuthUser,
    Path((club_id, member_id)): Path<(i64, i64)>,
) -> Result<StatusCode> {
    state.services.membership.remove_member(user.user_id, club_id, member_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn grant_admin(
    State(state): State<AppState>,
    user: AuthUser,
    Path((club_id, member_id)): Path<(i64, i64)>,
) -> Result<(StatusCode, Json<ClubAdmin>)> {
    let admin = state.services.membership.grant_admin(user.user_id, club_id, member_id).await?;
    Ok((StatusCode::CREATED, Json(admin)))
}

pub async fn revoke_admin(
    State(state): State<AppState>,
    user: AuthUser,
    Path((club_id, member_id)): Path<(i64, i64)>,
) -> Result<StatusCode> {
    state.services.membership.revoke_admin(user.user_id, club_id, member_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
