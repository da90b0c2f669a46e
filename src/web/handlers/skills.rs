//! Skill detail, version listing, and download (§4.6 Query Surface).

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::db::models::{Skill, SkillVersion};
use crate::db::{categories, skills, stars, users, versions};
use crate::error::ApiError;
use crate::web::auth::OptionalAuthUser;
use crate::web::state::AppState;

/// A compact rendering of a version, used on skill-detail and search
/// responses (the full row — `metadata`, `checksum`, `size_bytes` — is
/// reserved for the versions-listing endpoint).
#[derive(Serialize)]
pub struct VersionSummary {
    pub version: String,
    pub providers: Vec<String>,
    pub tags: Vec<String>,
    pub description: String,
    pub published_at: DateTime<Utc>,
}

impl From<&SkillVersion> for VersionSummary {
    fn from(v: &SkillVersion) -> Self {
        Self {
            version: v.version.clone(),
            providers: v.providers_or_generic(),
            tags: v.tags(),
            description: v.description(),
            published_at: v.published_at,
        }
    }
}

#[derive(Serialize)]
pub struct SkillResponse {
    pub name: String,
    pub owner: String,
    pub owner_avatar_url: Option<String>,
    pub downloads: i64,
    pub stars_count: i64,
    pub starred_by_me: bool,
    pub category: Option<String>,
    pub readme_html: Option<String>,
    pub created_at: DateTime<Utc>,
    pub latest_version: Option<VersionSummary>,
}

pub(crate) async fn require_skill(state: &AppState, name: &str) -> Result<Skill, ApiError> {
    skills::find_by_name(&state.pool, name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Skill '{name}' not found")))
}

/// `GET /skills/{name}`.
pub async fn get_skill_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    OptionalAuthUser(caller): OptionalAuthUser,
) -> Result<Json<SkillResponse>, ApiError> {
    let skill = require_skill(&state, &name).await?;

    let owner = users::find_by_id(&state.pool, skill.owner_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Owner not found".to_string()))?;

    let category = match skill.category_id {
        Some(category_id) => categories::find_by_id(&state.pool, category_id)
            .await?
            .map(|c| c.name),
        None => None,
    };

    let starred_by_me = match &caller {
        Some(user) => stars::exists(&state.pool, user.id, skill.id).await?,
        None => false,
    };

    let latest = versions::find_latest(&state.pool, skill.id).await?;

    Ok(Json(SkillResponse {
        name: skill.name,
        owner: owner.username,
        owner_avatar_url: owner.avatar_url,
        downloads: skill.downloads,
        stars_count: skill.stars_count,
        starred_by_me,
        category,
        readme_html: skill.readme_html,
        created_at: skill.created_at,
        latest_version: latest.as_ref().map(VersionSummary::from),
    }))
}

#[derive(Serialize)]
pub struct VersionsResponse {
    pub name: String,
    pub versions: Vec<SkillVersion>,
}

/// `GET /skills/{name}/versions`.
pub async fn list_versions_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<VersionsResponse>, ApiError> {
    let skill = require_skill(&state, &name).await?;
    let versions = versions::list_for_skill(&state.pool, skill.id).await?;
    Ok(Json(VersionsResponse { name: skill.name, versions }))
}

/// `GET /skills/{name}/versions/{version}/download`.
///
/// Increments `downloads` before streaming bytes (§4.6): a storage miss
/// after the increment leaves the counter one higher than what was
/// actually delivered, an accepted drift (§9).
pub async fn download_handler(
    State(state): State<AppState>,
    Path((name, version)): Path<(String, String)>,
) -> Result<Response, ApiError> {
    let skill = require_skill(&state, &name).await?;
    let skill_version = versions::find_by_skill_and_version(&state.pool, skill.id, &version)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Version '{version}' not found")))?;

    skills::increment_downloads(&state.pool, skill.id).await?;

    let bytes = state.storage.get(&skill_version.bundle_key).await?;

    let filename = format!("{}-{}.tar.gz", skill.name, skill_version.version);
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/gzip")
        .header(
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        )
        .header("X-Checksum-SHA256", skill_version.checksum.clone())
        .body(Body::from(bytes))
        .map_err(|e| ApiError::Internal(e.to_string()))
}
