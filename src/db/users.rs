//! User queries (§3 Data Model, §4.7 Identity Exchange, §4.8 Auth Gate).

use tokio_postgres::Row;
use uuid::Uuid;

use crate::db::DbPool;
use crate::db::models::User;
use crate::error::DatabaseError;

fn row_to_user(row: &Row) -> User {
    User {
        id: row.get("id"),
        username: row.get("username"),
        api_token: row.get("api_token"),
        display_name: row.get("display_name"),
        avatar_url: row.get("avatar_url"),
        external_id: row.get("external_id"),
        bio: row.get("bio"),
        created_at: row.get("created_at"),
    }
}

const COLUMNS: &str =
    "id, username, api_token, display_name, avatar_url, external_id, bio, created_at";

/// Bearer-token lookup backing the Auth Gate (§4.8).
pub async fn find_by_token(pool: &DbPool, token: &str) -> Result<Option<User>, DatabaseError> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            &format!("SELECT {COLUMNS} FROM users WHERE api_token = $1"),
            &[&token],
        )
        .await?;
    Ok(row.as_ref().map(row_to_user))
}

pub async fn find_by_username(pool: &DbPool, username: &str) -> Result<Option<User>, DatabaseError> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            &format!("SELECT {COLUMNS} FROM users WHERE username = $1"),
            &[&username],
        )
        .await?;
    Ok(row.as_ref().map(row_to_user))
}

pub async fn find_by_external_id(
    pool: &DbPool,
    external_id: &str,
) -> Result<Option<User>, DatabaseError> {
    let client = pool.get().await?;
    let row = client
        .query_opt(
            &format!("SELECT {COLUMNS} FROM users WHERE external_id = $1"),
            &[&external_id],
        )
        .await?;
    Ok(row.as_ref().map(row_to_user))
}

pub async fn find_by_id(pool: &DbPool, id: Uuid) -> Result<Option<User>, DatabaseError> {
    let client = pool.get().await?;
    let row = client
        .query_opt(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"), &[&id])
        .await?;
    Ok(row.as_ref().map(row_to_user))
}

/// Create a new user minted via identity exchange (§4.7 step 5).
pub async fn create_from_identity(
    pool: &DbPool,
    username: &str,
    api_token: &str,
    display_name: &str,
    avatar_url: Option<&str>,
    external_id: &str,
) -> Result<User, DatabaseError> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            &format!(
                "INSERT INTO users (username, api_token, display_name, avatar_url, external_id)
                 VALUES ($1, $2, $3, $4, $5)
                 RETURNING {COLUMNS}"
            ),
            &[&username, &api_token, &display_name, &avatar_url, &external_id],
        )
        .await?;
    Ok(row_to_user(&row))
}

/// Link an existing (CLI-seeded) user to an upstream identity, refreshing
/// their profile fields (§4.7 step 4).
pub async fn link_external_identity(
    pool: &DbPool,
    user_id: Uuid,
    external_id: &str,
    display_name: &str,
    avatar_url: Option<&str>,
) -> Result<User, DatabaseError> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            &format!(
                "UPDATE users SET external_id = $2, display_name = $3, avatar_url = $4
                 WHERE id = $1
                 RETURNING {COLUMNS}"
            ),
            &[&user_id, &external_id, &display_name, &avatar_url],
        )
        .await?;
    Ok(row_to_user(&row))
}

/// Refresh profile fields for a user already linked by `external_id`
/// (§4.7 step 3).
pub async fn refresh_profile(
    pool: &DbPool,
    user_id: Uuid,
    display_name: &str,
    avatar_url: Option<&str>,
) -> Result<User, DatabaseError> {
    let client = pool.get().await?;
    let row = client
        .query_one(
            &format!(
                "UPDATE users SET display_name = $2, avatar_url = $3
                 WHERE id = $1
                 RETURNING {COLUMNS}"
            ),
            &[&user_id, &display_name, &avatar_url],
        )
        .await?;
    Ok(row_to_user(&row))
}
