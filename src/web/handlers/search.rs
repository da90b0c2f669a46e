//! `GET /skills` — paginated, filtered search (§4.6).

use axum::Json;
use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};

use crate::db::categories;
use crate::db::models::Skill;
use crate::db::skills::{self, SearchParams, SortBy};
use crate::db::{users, versions};
use crate::error::ApiError;
use crate::web::handlers::skills::VersionSummary;
use crate::web::state::AppState;

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
    pub tag: Option<String>,
    pub category: Option<String>,
    pub provider: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Serialize)]
pub struct SkillSummary {
    pub name: String,
    pub owner: String,
    pub downloads: i64,
    pub stars_count: i64,
    pub category: Option<String>,
    pub latest_version: Option<VersionSummary>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub results: Vec<SkillSummary>,
    pub total: usize,
    pub page: u32,
    pub per_page: u32,
}

async fn summarize(
    state: &AppState,
    skill: Skill,
    latest: Option<crate::db::models::SkillVersion>,
) -> Result<SkillSummary, ApiError> {
    let owner = users::find_by_id(&state.pool, skill.owner_id).await?;
    let category = match skill.category_id {
        Some(category_id) => categories::find_by_id(&state.pool, category_id)
            .await?
            .map(|c| c.name),
        None => None,
    };

    Ok(SkillSummary {
        name: skill.name,
        owner: owner.map(|u| u.username).unwrap_or_default(),
        downloads: skill.downloads,
        stars_count: skill.stars_count,
        category,
        latest_version: latest.as_ref().map(VersionSummary::from),
    })
}

/// `GET /skills?q=&tag=&category=&provider=&sort=&page=&per_page=`.
///
/// `tag`/`provider` are applied after the SQL-backed `q`/`category` fetch,
/// against each candidate's latest version, and `total` reports the size of
/// that filtered page rather than a true global count — preserved
/// bit-for-bit from the reference implementation (§9 Open Question #1).
pub async fn search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let page = params.page.unwrap_or(1);
    let per_page = params.per_page.unwrap_or(20);
    if page == 0 {
        return Err(ApiError::BadRequest("page must be >= 1".to_string()));
    }
    if per_page == 0 || per_page > 100 {
        return Err(ApiError::BadRequest(
            "per_page must be between 1 and 100".to_string(),
        ));
    }

    let category_id = match &params.category {
        Some(name) => match categories::find_by_name(&state.pool, name).await? {
            Some(category) => Some(category.id),
            // An unresolvable category slug matches nothing, rather than
            // silently falling back to an unfiltered search.
            None => return Ok(Json(SearchResponse { results: vec![], total: 0, page, per_page })),
        },
        None => None,
    };

    let candidates = skills::search(
        &state.pool,
        &SearchParams {
            q: params.q.as_deref(),
            category_id,
            sort: SortBy::parse(params.sort.as_deref()),
            page,
            per_page,
        },
    )
    .await?;

    let mut results = Vec::with_capacity(candidates.len());
    for skill in candidates {
        let latest = versions::find_latest(&state.pool, skill.id).await?;

        if let Some(tag) = &params.tag {
            let matches = latest.as_ref().is_some_and(|v| v.tags().iter().any(|t| t == tag));
            if !matches {
                continue;
            }
        }
        if let Some(provider) = &params.provider {
            let matches = latest
                .as_ref()
                .is_some_and(|v| v.providers_or_generic().iter().any(|p| p == provider));
            if !matches {
                continue;
            }
        }

        results.push(summarize(&state, skill, latest).await?);
    }

    let total = results.len();
    Ok(Json(SearchResponse { results, total, page, per_page }))
}
