//! Category queries. Seeded; never mutated at runtime by the publish flow.

use tokio_postgres::Row;
use uuid::Uuid;

use crate::db::DbPool;
use crate::db::models::Category;
use crate::error::DatabaseError;

fn row_to_category(row: &Row) -> Category {
    Category {
        id: row.get("id"),
        name: row.get("name"),
        label: row.get("label"),
        description: row.get("description"),
        icon: row.get("icon"),
        sort_order: row.get("sort_order"),
    }
}

const COLUMNS: &str = "id, name, label, description, icon, sort_order";

pub async fn list_all(pool: &DbPool) -> Result<Vec<Category>, DatabaseError> {
    let client = pool.get().await?;
    let rows = client
        .query(
            &format!("SELECT {COLUMNS} FROM categories ORDER BY sort_order ASC"),
            &[],
        )
        .await?;
    Ok(rows.iter().map(row_to_category).collect())
}

/// Resolve a category by slug (§4.5 step 7). Returns `None` for an unknown
/// slug; the caller silently drops it rather than erroring.
pub async fn find_by_name(pool: &DbPool, name: &str) -> Result<Option<Category>, DatabaseError> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            &format!("SELECT {COLUMNS} FROM categories WHERE name = $1"),
            &[&name],
        )
        .await?;
    Ok(row.as_ref().map(row_to_category))
}

pub async fn find_by_id(pool: &DbPool, id: Uuid) -> Result<Option<Category>, DatabaseError> {
    let client = pool.get().await?;
    let row = client
        .query_opt(&format!("SELECT {COLUMNS} FROM categories WHERE id = $1"), &[&id])
        .await?;
    Ok(row.as_ref().map(row_to_category))
}
