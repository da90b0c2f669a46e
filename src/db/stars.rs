//! Star/unstar queries against the `stars` join table (§3, §4.6).

use uuid::Uuid;

use crate::db::DbPool;
use crate::error::DatabaseError;

pub async fn exists(pool: &DbPool, user_id: Uuid, skill_id: Uuid) -> Result<bool, DatabaseError> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            "SELECT 1 FROM stars WHERE user_id = $1 AND skill_id = $2",
            &[&user_id, &skill_id],
        )
        .await?;
    Ok(row.is_some())
}

/// Insert the star row. Returns `false` without erroring if the star
/// already exists (§4.6 star, idempotent double-star is a 409 decided by
/// the caller via a preceding `exists` check).
pub async fn insert(pool: &DbPool, user_id: Uuid, skill_id: Uuid) -> Result<(), DatabaseError> {
    let client = pool.get().await?;
    client
        .execute(
            "INSERT INTO stars (user_id, skill_id) VALUES ($1, $2)",
            &[&user_id, &skill_id],
        )
        .await?;
    Ok(())
}

/// Remove the star row. Returns the number of rows deleted (0 or 1) so the
/// caller can distinguish a no-op unstar (§4.6 unstar, 404 on absence).
pub async fn delete(pool: &DbPool, user_id: Uuid, skill_id: Uuid) -> Result<u64, DatabaseError> {
    let client = pool.get().await?;
    let count = client
        .execute(
            "DELETE FROM stars WHERE user_id = $1 AND skill_id = $2",
            &[&user_id, &skill_id],
        )
        .await?;
    Ok(count)
}

/// Skills starred by a user, newest star first (profile views).
pub async fn list_skill_ids_for_user(pool: &DbPool, user_id: Uuid) -> Result<Vec<Uuid>, DatabaseError> {
    let client = pool.get().await?;
    let rows = client
        .query(
            "SELECT skill_id FROM stars WHERE user_id = $1 ORDER BY created_at DESC",
            &[&user_id],
        )
        .await?;
    Ok(rows.iter().map(|row| row.get("skill_id")).collect())
}
