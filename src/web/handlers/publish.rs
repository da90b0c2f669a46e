//! `POST /skills/publish` (§4.5 Publish Transaction).
//!
//! Steps 8-14 run inside a single `tokio_postgres` transaction so a crash
//! between skill upsert and version insert never leaves a half-published
//! skill (§5 Isolation unit). Steps before the blob upload (step 11) leave
//! no trace on failure; failures after it may leak the uploaded blob, an
//! accepted tradeoff (§7, §9 "Two-phase writes").

use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::bundle::extract_bundle;
use crate::error::{ApiError, DatabaseError};
use crate::manifest::parse_manifest;
use crate::markdown;
use crate::storage::StorageAdapter;
use crate::web::auth::AuthUser;
use crate::web::state::AppState;
use crate::{constraint, provider};

#[derive(Default)]
struct PublishForm {
    file: Option<Vec<u8>>,
    providers: Option<String>,
    category: Option<String>,
}

async fn read_multipart(mut multipart: Multipart) -> Result<PublishForm, ApiError> {
    let mut form = PublishForm::default();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        match field.name().unwrap_or_default() {
            "file" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Invalid file field: {e}")))?;
                form.file = Some(bytes.to_vec());
            }
            "providers" => {
                form.providers = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(format!("Invalid providers field: {e}")))?,
                );
            }
            "category" => {
                form.category = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::BadRequest(format!("Invalid category field: {e}")))?,
                );
            }
            _ => {}
        }
    }
    Ok(form)
}

fn resolve_providers(providers_field: Option<&str>, compatibility: Option<&str>, member_paths: &[String]) -> Vec<String> {
    match providers_field.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => {
            let mut providers: Vec<String> = raw
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect();
            providers.sort();
            providers.dedup();
            providers
        }
        None => provider::detect(compatibility, member_paths),
    }
}

#[derive(Serialize)]
pub struct PublishResponse {
    pub name: String,
    pub version: String,
    pub checksum: String,
    pub published_at: DateTime<Utc>,
    pub providers: Vec<String>,
}

pub async fn publish_handler(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<PublishResponse>), ApiError> {
    let form = read_multipart(multipart).await?;
    let bytes = form
        .file
        .ok_or_else(|| ApiError::BadRequest("Missing 'file' field".to_string()))?;

    if bytes.len() as u64 > state.config.bundle_limits.max_compressed {
        return Err(ApiError::PayloadTooLarge);
    }

    let extracted = extract_bundle(&bytes, state.config.bundle_limits.max_decompressed)?;
    let manifest_text = std::fs::read_to_string(&extracted.manifest_path)
        .map_err(|e| ApiError::BadRequest(format!("Could not read manifest: {e}")))?;
    let manifest = parse_manifest(&manifest_text)?;

    if manifest.author != user.username {
        return Err(ApiError::BadRequest(format!(
            "Manifest author '{}' does not match authenticated user '{}'",
            manifest.author, user.username
        )));
    }

    let providers = resolve_providers(
        form.providers.as_deref(),
        manifest.compatibility.as_deref(),
        &extracted.member_paths,
    );
    constraint::validate_provider_constraints(&manifest.name, &providers)?;

    let category_id = match form.category.as_deref() {
        Some(name) if !name.is_empty() => {
            crate::db::categories::find_by_name(&state.pool, name)
                .await?
                .map(|c| c.id)
        }
        _ => None,
    };

    let checksum = hex_encode(&Sha256::digest(&bytes));

    let mut client = state.pool.get().await.map_err(DatabaseError::from)?;
    let txn = client.transaction().await.map_err(DatabaseError::Postgres)?;

    let existing = txn
        .query_opt(
            "SELECT id, owner_id, category_id FROM skills WHERE name = $1",
            &[&manifest.name],
        )
        .await
        .map_err(DatabaseError::Postgres)?;

    let skill_id = match existing {
        Some(row) => {
            let owner_id: uuid::Uuid = row.get("owner_id");
            if owner_id != user.id {
                return Err(ApiError::Forbidden(format!(
                    "Skill '{}' is owned by another user",
                    manifest.name
                )));
            }
            let id: uuid::Uuid = row.get("id");
            if let Some(category_id) = category_id {
                txn.execute(
                    "UPDATE skills SET category_id = $2, updated_at = now() WHERE id = $1",
                    &[&id, &category_id],
                )
                .await
                .map_err(DatabaseError::Postgres)?;
            }
            id
        }
        None => {
            let row = txn
                .query_one(
                    "INSERT INTO skills (name, owner_id, category_id) VALUES ($1, $2, $3) RETURNING id",
                    &[&manifest.name, &user.id, &category_id],
                )
                .await
                .map_err(DatabaseError::Postgres)?;
            row.get("id")
        }
    };

    let collision = txn
        .query_opt(
            "SELECT 1 FROM skill_versions WHERE skill_id = $1 AND version = $2",
            &[&skill_id, &manifest.version],
        )
        .await
        .map_err(DatabaseError::Postgres)?;
    if collision.is_some() {
        return Err(ApiError::Conflict(format!(
            "Version '{}' of '{}' already exists",
            manifest.version, manifest.name
        )));
    }

    let bundle_key = StorageAdapter::bundle_key(&manifest.name, &manifest.version);
    state.storage.put(&bundle_key, bytes.clone()).await?;

    let readme_html = markdown::render(&manifest.body);

    let mut metadata = serde_json::Map::new();
    for (k, v) in &manifest.metadata {
        metadata.insert(k.clone(), v.clone());
    }
    metadata.insert(
        "_registry".to_string(),
        serde_json::json!({ "providers": providers }),
    );
    let metadata_value = serde_json::Value::Object(metadata);
    let providers_value = serde_json::to_value(&providers).map_err(|e| ApiError::Internal(e.to_string()))?;

    let version_row = txn
        .query_one(
            "INSERT INTO skill_versions
                (skill_id, version, bundle_key, metadata, checksum, size_bytes, providers, readme_raw)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING published_at",
            &[
                &skill_id,
                &manifest.version,
                &bundle_key,
                &metadata_value,
                &checksum,
                &(bytes.len() as i64),
                &providers_value,
                &manifest.body,
            ],
        )
        .await
        .map_err(DatabaseError::Postgres)?;

    txn.execute(
        "UPDATE skills SET readme_html = $2, updated_at = now() WHERE id = $1",
        &[&skill_id, &readme_html],
    )
    .await
    .map_err(DatabaseError::Postgres)?;

    txn.commit().await.map_err(DatabaseError::Postgres)?;

    let published_at: DateTime<Utc> = version_row.get("published_at");

    tracing::info!(skill = %manifest.name, version = %manifest.version, owner = %user.username, "skill published");

    Ok((
        StatusCode::CREATED,
        Json(PublishResponse {
            name: manifest.name,
            version: manifest.version,
            checksum: format!("sha256:{checksum}"),
            published_at,
            providers,
        }),
    ))
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        write!(s, "{:02x}", b).expect("writing to a String cannot fail");
    }
    s
}
