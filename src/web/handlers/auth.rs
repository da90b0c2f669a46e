//! `POST /auth/github` (§4.7 Identity Exchange).

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::db::users;
use crate::error::ApiError;
use crate::identity::generate_api_token;
use crate::web::state::AppState;

#[derive(Deserialize)]
pub struct GithubExchangeRequest {
    access_token: String,
}

#[derive(Serialize)]
pub struct GithubExchangeResponse {
    username: String,
    display_name: Option<String>,
    avatar_url: Option<String>,
    api_token: String,
}

pub async fn github_exchange_handler(
    State(state): State<AppState>,
    Json(body): Json<GithubExchangeRequest>,
) -> Result<Json<GithubExchangeResponse>, ApiError> {
    let profile = state.identity.fetch_profile(&body.access_token).await?;
    let external_id = profile.id.to_string();
    let display_name = profile.display_name();

    let user = if let Some(existing) = users::find_by_external_id(&state.pool, &external_id).await? {
        users::refresh_profile(
            &state.pool,
            existing.id,
            &display_name,
            profile.avatar_url.as_deref(),
        )
        .await?
    } else if let Some(existing) = users::find_by_username(&state.pool, &profile.login).await? {
        users::link_external_identity(
            &state.pool,
            existing.id,
            &external_id,
            &display_name,
            profile.avatar_url.as_deref(),
        )
        .await?
    } else {
        users::create_from_identity(
            &state.pool,
            &profile.login,
            &generate_api_token(),
            &display_name,
            profile.avatar_url.as_deref(),
            &external_id,
        )
        .await?
    };

    Ok(Json(GithubExchangeResponse {
        username: user.username,
        display_name: user.display_name,
        avatar_url: user.avatar_url,
        api_token: user.api_token,
    }))
}
