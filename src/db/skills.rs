//! Skill queries: lookup, creation, mutable-field updates, counters, and the
//! paginated search behind `GET /skills` (§4.6).

use tokio_postgres::Row;
use tokio_postgres::types::ToSql;
use uuid::Uuid;

use crate::db::DbPool;
use crate::db::models::Skill;
use crate::error::DatabaseError;

fn row_to_skill(row: &Row) -> Skill {
    Skill {
        id: row.get("id"),
        name: row.get("name"),
        owner_id: row.get("owner_id"),
        category_id: row.get("category_id"),
        downloads: row.get("downloads"),
        stars_count: row.get("stars_count"),
        readme_html: row.get("readme_html"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

const COLUMNS: &str =
    "id, name, owner_id, category_id, downloads, stars_count, readme_html, created_at, updated_at";

pub async fn find_by_name(pool: &DbPool, name: &str) -> Result<Option<Skill>, DatabaseError> {
    let client = pool.get().await?;
    let row = client
        .query_opt(&format!("SELECT {COLUMNS} FROM skills WHERE name = $1"), &[&name])
        .await?;
    Ok(row.as_ref().map(row_to_skill))
}

pub async fn find_by_id(pool: &DbPool, id: Uuid) -> Result<Option<Skill>, DatabaseError> {
    let client = pool.get().await?;
    let row = client
        .query_opt(&format!("SELECT {COLUMNS} FROM skills WHERE id = $1"), &[&id])
        .await?;
    Ok(row.as_ref().map(row_to_skill))
}

/// Skills owned by a user, for the user-profile endpoint (§4.6).
pub async fn find_by_owner(pool: &DbPool, owner_id: Uuid) -> Result<Vec<Skill>, DatabaseError> {
    let client = pool.get().await?;
    let rows = client
        .query(
            &format!("SELECT {COLUMNS} FROM skills WHERE owner_id = $1 ORDER BY updated_at DESC"),
            &[&owner_id],
        )
        .await?;
    Ok(rows.iter().map(row_to_skill).collect())
}

/// Create a skill on first successful publish of its name (§4.5 step 8).
pub async fn create(
    pool: &DbPool,
    name: &str,
    owner_id: Uuid,
    category_id: Option<Uuid>,
) -> Result<Skill, DatabaseError> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            &format!(
                "INSERT INTO skills (name, owner_id, category_id) VALUES ($1, $2, $3)
                 RETURNING {COLUMNS}"
            ),
            &[&name, &owner_id, &category_id],
        )
        .await?;
    Ok(row_to_skill(&row))
}

/// Atomic download counter bump (§4.6, §5): `col = col + 1`, not
/// read-modify-write, so concurrent downloads compose correctly.
pub async fn increment_downloads(pool: &DbPool, id: Uuid) -> Result<(), DatabaseError> {
    let client = pool.get().await?;
    client
        .execute(
            "UPDATE skills SET downloads = downloads + 1 WHERE id = $1",
            &[&id],
        )
        .await?;
    Ok(())
}

/// Star/unstar counter bumps, floored at zero on the decrement side (§3).
pub async fn increment_stars(pool: &DbPool, id: Uuid) -> Result<(), DatabaseError> {
    let client = pool.get().await?;
    client
        .execute(
            "UPDATE skills SET stars_count = stars_count + 1 WHERE id = $1",
            &[&id],
        )
        .await?;
    Ok(())
}

pub async fn decrement_stars(pool: &DbPool, id: Uuid) -> Result<(), DatabaseError> {
    let client = pool.get().await?;
    client
        .execute(
            "UPDATE skills SET stars_count = GREATEST(stars_count - 1, 0) WHERE id = $1",
            &[&id],
        )
        .await?;
    Ok(())
}

/// Sort options for `GET /skills` (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    Downloads,
    Stars,
    Newest,
    Updated,
}

impl SortBy {
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some("downloads") => SortBy::Downloads,
            Some("stars") => SortBy::Stars,
            Some("newest") => SortBy::Newest,
            _ => SortBy::Updated,
        }
    }

    fn order_clause(self) -> &'static str {
        match self {
            SortBy::Downloads => "downloads DESC, id ASC",
            SortBy::Stars => "stars_count DESC, id ASC",
            SortBy::Newest => "created_at DESC, id ASC",
            SortBy::Updated => "updated_at DESC, id ASC",
        }
    }
}

/// Search parameters. `tag`/`provider` are applied post-fetch against each
/// candidate's latest version (§4.6, §9) — only `q` and `category_id` are
/// pushed into SQL.
pub struct SearchParams<'a> {
    pub q: Option<&'a str>,
    pub category_id: Option<Uuid>,
    pub sort: SortBy,
    pub page: u32,
    pub per_page: u32,
}

/// A page of candidate skills plus the unfiltered count matching `q`/`category`.
///
/// The reference implementation (and this crate, preserving it bit-for-bit —
/// see §9 Open Question #1) reports `total` as the size of the *filtered
/// page*, computed by the caller after applying `tag`/`provider`. This
/// query only returns the SQL-filtered candidates for that page.
pub async fn search(pool: &DbPool, params: &SearchParams<'_>) -> Result<Vec<Skill>, DatabaseError> {
    let client = pool.get().await?;

    let mut clauses: Vec<String> = Vec::new();
    let mut args: Vec<Box<dyn ToSql + Sync + Send>> = Vec::new();

    if let Some(q) = params.q {
        args.push(Box::new(format!("%{q}%")));
        clauses.push(format!("name ILIKE ${}", args.len()));
    }
    if let Some(category_id) = params.category_id {
        args.push(Box::new(category_id));
        clauses.push(format!("category_id = ${}", args.len()));
    }

    let where_clause = if clauses.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", clauses.join(" AND "))
    };

    let offset = (params.page.saturating_sub(1)) as i64 * params.per_page as i64;
    args.push(Box::new(params.per_page as i64));
    let limit_idx = args.len();
    args.push(Box::new(offset));
    let offset_idx = args.len();

    let sql = format!(
        "SELECT {COLUMNS} FROM skills {where_clause} ORDER BY {} LIMIT ${} OFFSET ${}",
        params.sort.order_clause(),
        limit_idx,
        offset_idx,
    );

    let refs: Vec<&(dyn ToSql + Sync)> = args.iter().map(|b| b.as_ref() as &(dyn ToSql + Sync)).collect();
    let rows = client.query(&sql, &refs).await?;
    Ok(rows.iter().map(row_to_skill).collect())
}
