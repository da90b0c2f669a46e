//! `GET /categories` (§6).

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::db::categories;
use crate::db::models::Category;
use crate::error::ApiError;
use crate::web::state::AppState;

#[derive(Serialize)]
pub struct CategoriesResponse {
    categories: Vec<Category>,
}

pub async fn categories_handler(
    State(state): State<AppState>,
) -> Result<Json<CategoriesResponse>, ApiError> {
    let categories = categories::list_all(&state.pool).await?;
    Ok(Json(CategoriesResponse { categories }))
}
