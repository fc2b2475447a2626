//! Authentication extractors
//!
//! Bearer tokens are decoded and checked against the stored account.
//! `AuthUser` rejects anonymous requests; `OptionalAuthUser` lets browsing
//! endpoints serve both.

use axum::extract::{FromRef, FromRequestParts};
use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use tracing::debug;
use crate::handlers::AppState;
use crate::models::UserRole;
use crate::utils::errors::ClubHubError;

/// Authenticated caller
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: i64,
    pub role: UserRole,
}

/// Caller that may be anonymous
#[derive(Debug, Clone, Copy)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

impl OptionalAuthUser {
    pub fn user_id(&self) -> Option<i64> {
        self.0.map(|u| u.user_id)
    }
}

/// Extract the raw token from an `Authorization: Bearer` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Decode the bearer token and load the account behind it.
/// Deactivated accounts are refused here, before any handler runs.
async fn authenticate(parts: &mut Parts, state: &AppState) -> Result<Option<AuthUser>, ClubHubError> {
    if let Some(user) = parts.extensions.get::<AuthUser>() {
        return Ok(Some(*user));
    }

    let Some(token) = bearer_token(&parts.headers) else {
        return Ok(None);
    };

    let claims = state.services.auth.decode_token(token).map_err(|e| {
        debug!(error = %e, "Rejected bearer token");
        ClubHubError::Unauthorized("Invalid or expired token".to_string())
    })?;

    let account = state.services.auth.active_user(claims.sub).await?;
    let user = AuthUser {
        user_id: account.id,
        role: account.role,
    };
    parts.extensions.insert(user);
    Ok(Some(user))
}

impl<S> FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ClubHubError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        authenticate(parts, &app_state)
            .await?
            .ok_or_else(|| ClubHubError::Unauthorized("Missing bearer token".to_string()))
    }
}

impl<S> FromRequestParts<S> for OptionalAuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ClubHubError;

    /// A present but invalid token is still an error
    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        Ok(Self(authenticate(parts, &app_state).await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(value: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(value) = value {
            headers.insert(AUTHORIZATION, value.parse().unwrap());
        }
        headers
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&headers(Some("Bearer abc.def"))), Some("abc.def"));
        assert_eq!(bearer_token(&headers(Some("bearer   abc"))), Some("abc"));
        assert_eq!(bearer_token(&headers(Some("Basic abc"))), None);
        assert_eq!(bearer_token(&headers(Some("Bearer "))), None);
        assert_eq!(bearer_token(&headers(None)), None);
    }
}
