//! `GET /health` (§6).

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::db;
use crate::web::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    database: bool,
    storage: bool,
}

/// Always `200`; `status` flips to `degraded` when a dependency check fails
/// rather than returning an error status for a monitoring endpoint.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = db::health_check(&state.pool).await;
    let storage = state.storage.health().await.is_ok();

    Json(HealthResponse {
        status: if database && storage { "ok" } else { "degraded" },
        database,
        storage,
    })
}
