//! `POST|DELETE /skills/{name}/star` (§4.6).

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use crate::db::{skills, stars};
use crate::error::ApiError;
use crate::web::auth::AuthUser;
use crate::web::handlers::skills::require_skill;
use crate::web::state::AppState;

#[derive(Serialize)]
pub struct StarResponse {
    starred: bool,
    stars_count: i64,
}

/// `POST /skills/{name}/star`. Double-star → `409`.
pub async fn star_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    AuthUser(user): AuthUser,
) -> Result<Json<StarResponse>, ApiError> {
    let skill = require_skill(&state, &name).await?;

    if stars::exists(&state.pool, user.id, skill.id).await? {
        return Err(ApiError::Conflict(format!(
            "Skill '{name}' is already starred"
        )));
    }

    stars::insert(&state.pool, user.id, skill.id).await?;
    skills::increment_stars(&state.pool, skill.id).await?;

    let updated = require_skill(&state, &name).await?;
    Ok(Json(StarResponse {
        starred: true,
        stars_count: updated.stars_count,
    }))
}

/// `DELETE /skills/{name}/star`. Unstar when absent → `404`.
pub async fn unstar_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    AuthUser(user): AuthUser,
) -> Result<Json<StarResponse>, ApiError> {
    let skill = require_skill(&state, &name).await?;

    let deleted = stars::delete(&state.pool, user.id, skill.id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound(format!(
            "Skill '{name}' is not starred"
        )));
    }
    skills::decrement_stars(&state.pool, skill.id).await?;

    let updated = require_skill(&state, &name).await?;
    Ok(Json(StarResponse {
        starred: false,
        stars_count: updated.stars_count,
    }))
}
