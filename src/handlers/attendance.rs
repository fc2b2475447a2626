//! Attendance handlers for club admins

use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use crate::handlers::extract::{Json, Path, Query};
use crate::handlers::AppState;
use crate::middleware::AuthUser;
use crate::models::{AttendanceSummary, AttendeeFilter, AttendeeList, EventParticipant};
use crate::utils::errors::Result;

pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<i64>,
    Query(filter): Query<AttendeeFilter>,
) -> Result<Json<AttendeeList>> {
    Ok(Json(state.services.attendance.attendees(user.user_id, event_id, &filter).await?))
}

/// `GET /api/events/{id}/attendees.csv`
pub async fn export_csv(State(state): State<AppState>, user: AuthUser, Path(event_id): Path<i64>) -> Result<Response> {
    let (file_name, body) = state.services.attendance.export_csv(user.user_id, event_id).await?;
    let disposition = format!("attachment; filename=\"{}\"", file_name);

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

pub async fn summary(
    State(state): State<AppState>,
    user: AuthUser,
    Path(event_id): Path<i64>,
) -> Result<Json<AttendanceSummary>> {
    Ok(Json(state.services.attendance.summary(user.user_id, event_id).await?))
}

pub async fn check_in(
    State(state): State<AppState>,
    user: AuthUser,
    Path((event_id, attendee_id)): Path<(i64, i64)>,
) -> Result<Json<EventParticipant>> {
    Ok(Json(state.services.attendance.check_in(user.user_id, event_id, attendee_id).await?))
}

pub async fn undo_check_in(
    State(state): State<AppState>,
    user: AuthUser,
    Path((event_id, attendee_id)): Path<(i64, i64)>,
) -> Result<Json<EventParticipant>> {
    Ok(Json(state.services.attendance.undo_check_in(user.user_id, event_id, attendee_id).await?))
}
