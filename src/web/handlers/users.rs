//! `GET /users/{username}` (§4.6).

use axum::Json;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::{categories, skills, users, versions};
use crate::error::ApiError;
use crate::web::handlers::skills::VersionSummary;
use crate::web::state::AppState;

#[derive(Serialize)]
pub struct OwnedSkill {
    pub name: String,
    pub downloads: i64,
    pub stars_count: i64,
    pub category: Option<String>,
    pub latest_version: Option<VersionSummary>,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
    pub skills: Vec<OwnedSkill>,
    pub total_downloads: i64,
    pub total_stars: i64,
}

pub async fn get_user_handler(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = users::find_by_username(&state.pool, &username)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User '{username}' not found")))?;

    let owned = skills::find_by_owner(&state.pool, user.id).await?;

    let mut total_downloads = 0i64;
    let mut total_stars = 0i64;
    let mut skill_summaries = Vec::with_capacity(owned.len());

    for skill in owned {
        total_downloads += skill.downloads;
        total_stars += skill.stars_count;

        let category = match skill.category_id {
            Some(category_id) => categories::find_by_id(&state.pool, category_id)
                .await?
                .map(|c| c.name),
            None => None,
        };
        let latest = versions::find_latest(&state.pool, skill.id).await?;

        skill_summaries.push(OwnedSkill {
            name: skill.name,
            downloads: skill.downloads,
            stars_count: skill.stars_count,
            category,
            latest_version: latest.as_ref().map(VersionSummary::from),
        });
    }

    Ok(Json(UserResponse {
        username: user.username,
        display_name: user.display_name,
        avatar_url: user.avatar_url,
        bio: user.bio,
        created_at: user.created_at,
        skills: skill_summaries,
        total_downloads,
        total_stars,
    }))
}
