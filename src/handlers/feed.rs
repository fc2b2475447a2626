//! Activity feed handlers

use axum::extract::State;
use axum::http::StatusCode;
use crate::handlers::extract::{Json, Path, Query};
use crate::handlers::AppState;
use crate::middleware::{AuthUser, OptionalAuthUser};
use crate::models::{CreatePostRequest, LikeToggle, PostWithDetails};
use crate::utils::errors::Result;
use crate::utils::helpers::{Page, PageRequest};

pub async fn club_posts(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    Path(club_id): Path<i64>,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<PostWithDetails>>> {
    Ok(Json(state.services.feed.club_posts(viewer.user_id(), club_id, page).await?))
}

pub async fn create_post(
    State(state): State<AppState>,
    user: AuthUser,
    Path(club_id): Path<i64>,
    Json(request): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostWithDetails>)> {
    let post = state.services.feed.create_post(user.user_id, club_id, request).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// Posts from every club the caller belongs to
pub async fn feed(
    State(state): State<AppState>,
    user: AuthUser,
    Query(page): Query<PageRequest>,
) -> Result<Json<Page<PostWithDetails>>> {
    Ok(Json(state.services.feed.feed_for_user(user.user_id, page).await?))
}

pub async fn toggle_like(State(state): State<AppState>, user: AuthUser, Path(id): Path<i64>) -> Result<Json<LikeToggle>> {
    Ok(Json(state.services.feed.toggle_like(user.user_id, id).await?))
}

pub async fn delete_post(State(state): State<AppState>, user: AuthUser, Path(id): Path<i64>) -> Result<StatusCode> {
    state.services.feed.delete_post(user.user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
