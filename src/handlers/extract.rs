//! Request extractors whose rejections render as `ClubHubError`
//!
//! Drop-in replacements for axum's `Json`, `Path` and `Query` so malformed
//! bodies, ids and query strings get the same `{error, message}` body as
//! every other failure.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts};
use axum::response::{IntoResponse, Response};
use crate::utils::errors::ClubHubError;

#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(ClubHubError))]
pub struct Json<T>(pub T);

impl<T> IntoResponse for Json<T>
where
    axum::Json<T>: IntoResponse,
{
    fn into_response(self) -> Response {
        axum::Json(self.0).into_response()
    }
}

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ClubHubError))]
pub struct Path<T>(pub T);

#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ClubHubError))]
pub struct Query<T>(pub T);

impl From<JsonRejection> for ClubHubError {
    fn from(rejection: JsonRejection) -> Self {
        ClubHubError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for ClubHubError {
    fn from(rejection: PathRejection) -> Self {
        ClubHubError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for ClubHubError {
    fn from(rejection: QueryRejection) -> Self {
        ClubHubError::InvalidInput(rejection.body_text())
    }
}
