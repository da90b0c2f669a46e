//! Auth Gate (§4.8): bearer-token extraction, required on mutating routes
//! and optional on read routes that personalize their response.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::header::AUTHORIZATION;

use crate::db::models::User;
use crate::db::users;
use crate::error::ApiError;
use crate::web::state::AppState;

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// The authenticated caller. Required on mutating endpoints — a missing or
/// unknown token rejects with `401` before the handler body runs.
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(ApiError::Unauthorized)?;
        let user = users::find_by_token(&state.pool, token)
            .await?
            .ok_or(ApiError::Unauthorized)?;
        Ok(AuthUser(user))
    }
}

/// The authenticated caller, if any. Never rejects — a missing or invalid
/// token is treated as an anonymous request (used to compute fields like
/// `starred_by_me`).
pub struct OptionalAuthUser(pub Option<User>);

impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            return Ok(OptionalAuthUser(None));
        };
        let user = users::find_by_token(&state.pool, token).await?;
        Ok(OptionalAuthUser(user))
    }
}
