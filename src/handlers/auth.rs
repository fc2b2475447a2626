//! Account handlers: registration, login and the caller's own profile

use axum::extract::State;
use axum::http::StatusCode;
use crate::handlers::extract::Json;
use crate::handlers::AppState;
use crate::middleware::AuthUser;
use crate::models::{AuthResponse, LoginRequest, RegisterRequest, UpdateProfileRequest, User};
use crate::utils::errors::Result;

/// `POST /api/auth/register`
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let response = state.services.users.register(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    Ok(Json(state.services.users.login(request).await?))
}

/// `GET /api/me`
pub async fn me(State(state): State<AppState>, user: AuthUser) -> Result<Json<User>> {
    Ok(Json(state.services.users.me(user.user_id).await?))
}

/// `PATCH /api/me`
pub async fn update_me(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<User>> {
    Ok(Json(state.services.users.update_profile(user.user_id, request).await?))
}
