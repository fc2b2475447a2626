//! In-app notification handlers

use axum::extract::State;
use axum::http::StatusCode;
use serde_json::{json, Value};
use crate::handlers::extract::{Json, Path, Query};
use crate::handlers::AppState;
use crate::middleware::AuthUser;
use crate::models::{Notification, NotificationFilter, UnreadCount};
use crate::utils::errors::Result;
use crate::utils::helpers::Page;

pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(filter): Query<NotificationFilter>,
) -> Result<Json<Page<Notification>>> {
    Ok(Json(state.services.notifications.list(user.user_id, &filter).await?))
}

/// Badge count
pub async fn unread_count(State(state): State<AppState>, user: AuthUser) -> Result<Json<UnreadCount>> {
    Ok(Json(state.services.notifications.unread_count(user.user_id).await?))
}

pub async fn mark_read(State(state): State<AppState>, user: AuthUser, Path(id): Path<i64>) -> Result<Json<Notification>> {
    Ok(Json(state.services.notifications.mark_read(id, user.user_id).await?))
}

pub async fn mark_all_read(State(state): State<AppState>, user: AuthUser) -> Result<Json<Value>> {
    let updated = state.services.notifications.mark_all_read(user.user_id).await?;
    Ok(Json(json!({ "updated": updated })))
}

pub async fn remove(State(state): State<AppState>, user: AuthUser, Path(id): Path<i64>) -> Result<StatusCode> {
    state.services.notifications.delete(id, user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
