//! Skill version queries: publish inserts and the read paths for download
//! and detail endpoints (§4.5, §4.6).

use serde_json::Value;
use tokio_postgres::Row;
use uuid::Uuid;

use crate::db::DbPool;
use crate::db::models::SkillVersion;
use crate::error::DatabaseError;

/// `providers` is stored as a JSONB array rather than a native Postgres
/// array so it roundtrips through the same `serde_json` machinery as
/// `metadata`.
fn row_to_version(row: &Row) -> SkillVersion {
    let providers: Value = row.get("providers");
    SkillVersion {
        id: row.get("id"),
        skill_id: row.get("skill_id"),
        version: row.get("version"),
        bundle_key: row.get("bundle_key"),
        metadata: row.get("metadata"),
        checksum: row.get("checksum"),
        size_bytes: row.get("size_bytes"),
        providers: serde_json::from_value(providers).unwrap_or_default(),
        readme_raw: row.get("readme_raw"),
        published_at: row.get("published_at"),
    }
}

const COLUMNS: &str = "id, skill_id, version, bundle_key, metadata, checksum, size_bytes, \
                        providers, readme_raw, published_at";

/// Duplicate-version check (§4.5 step 10, 409 Conflict).
pub async fn find_by_skill_and_version(
    pool: &DbPool,
    skill_id: Uuid,
    version: &str,
) -> Result<Option<SkillVersion>, DatabaseError> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            &format!("SELECT {COLUMNS} FROM skill_versions WHERE skill_id = $1 AND version = $2"),
            &[&skill_id, &version],
        )
        .await?;
    Ok(row.as_ref().map(row_to_version))
}

/// Insert the version row after the blob has landed in storage (§4.5 step 13;
/// blob-before-row ordering lives in the publish handler, not here).
#[allow(clippy::too_many_arguments)]
pub async fn create(
    pool: &DbPool,
    skill_id: Uuid,
    version: &str,
    bundle_key: &str,
    metadata: &serde_json::Value,
    checksum: &str,
    size_bytes: i64,
    providers: &[String],
    readme_raw: Option<&str>,
) -> Result<SkillVersion, DatabaseError> {
    let client = pool.get().await?;
    let providers_json = serde_json::to_value(providers).map_err(|e| DatabaseError::Query(e.to_string()))?;
    let row = client
        .query_one(
            &format!(
                "INSERT INTO skill_versions
                    (skill_id, version, bundle_key, metadata, checksum, size_bytes, providers, readme_raw)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                 RETURNING {COLUMNS}"
            ),
            &[
                &skill_id,
                &version,
                &bundle_key,
                metadata,
                &checksum,
                &size_bytes,
                &providers_json,
                &readme_raw,
            ],
        )
        .await?;
    Ok(row_to_version(&row))
}

/// All versions for a skill, newest first (detail/listing views, §4.6).
pub async fn list_for_skill(pool: &DbPool, skill_id: Uuid) -> Result<Vec<SkillVersion>, DatabaseError> {
    let client = pool.get().await?;
    let rows = client
        .query(
            &format!(
                "SELECT {COLUMNS} FROM skill_versions WHERE skill_id = $1 ORDER BY published_at DESC"
            ),
            &[&skill_id],
        )
        .await?;
    Ok(rows.iter().map(row_to_version).collect())
}

/// The most recently published version, used for search-result summaries
/// and as the default download target (§4.6).
pub async fn find_latest(pool: &DbPool, skill_id: Uuid) -> Result<Option<SkillVersion>, DatabaseError> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            &format!(
                "SELECT {COLUMNS} FROM skill_versions WHERE skill_id = $1
                 ORDER BY published_at DESC LIMIT 1"
            ),
            &[&skill_id],
        )
        .await?;
    Ok(row.as_ref().map(row_to_version))
}
