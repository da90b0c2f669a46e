//! Row types for the relational store (§3 Data Model).

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    #[serde(skip_serializing)]
    pub api_token: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(skip_serializing)]
    pub external_id: Option<String>,
    pub bio: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub label: String,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub sort_order: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct Skill {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub category_id: Option<Uuid>,
    pub downloads: i64,
    pub stars_count: i64,
    pub readme_html: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SkillVersion {
    pub id: Uuid,
    pub skill_id: Uuid,
    pub version: String,
    pub bundle_key: String,
    pub metadata: Value,
    pub checksum: String,
    pub size_bytes: i64,
    pub providers: Vec<String>,
    pub readme_raw: Option<String>,
    pub published_at: DateTime<Utc>,
}

impl SkillVersion {
    /// `providers` normalized to `["generic"]` when empty, mirroring the
    /// reference implementation's `v.providers or ["generic"]`.
    pub fn providers_or_generic(&self) -> Vec<String> {
        if self.providers.is_empty() {
            vec!["generic".to_string()]
        } else {
            self.providers.clone()
        }
    }

    pub fn tags(&self) -> Vec<String> {
        self.metadata
            .get("tags")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn description(&self) -> String {
        self.metadata
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }
}
