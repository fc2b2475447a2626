//! Club creation wizard handlers

use axum::extract::State;
use axum::http::StatusCode;
use crate::handlers::extract::Json;
use crate::handlers::AppState;
use crate::middleware::AuthUser;
use crate::models::Club;
use crate::services::{WizardState, WizardStepInput};
use crate::utils::errors::Result;

pub async fn current(State(state): State<AppState>, user: AuthUser) -> Result<Json<WizardState>> {
    Ok(Json(state.services.wizard.current(user.user_id).await?))
}

/// Starting again discards an unfinished run
pub async fn start(State(state): State<AppState>, user: AuthUser) -> Result<(StatusCode, Json<WizardState>)> {
    let wizard = state.services.wizard.start(user.user_id).await?;
    Ok((StatusCode::CREATED, Json(wizard)))
}

pub async fn submit_step(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<WizardStepInput>,
) -> Result<Json<WizardState>> {
    Ok(Json(state.services.wizard.submit_step(user.user_id, input).await?))
}

pub async fn back(State(state): State<AppState>, user: AuthUser) -> Result<Json<WizardState>> {
    Ok(Json(state.services.wizard.back(user.user_id).await?))
}

pub async fn finish(State(state): State<AppState>, user: AuthUser) -> Result<(StatusCode, Json<Club>)> {
    let club = state.services.wizard.finish(user.user_id).await?;
    Ok((StatusCode::CREATED, Json(club)))
}

pub async fn cancel(State(state): State<AppState>, user: AuthUser) -> Result<StatusCode> {
    state.services.wizard.cancel(user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
