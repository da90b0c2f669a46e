//! Router assembly: one `axum::Router` wiring every route in §6 behind the
//! configured API prefix, with the ambient middleware stack from §10.1.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::web::handlers::{auth, categories, health, publish, search, skills, stars, users};
use crate::web::state::AppState;

/// Build the full application router for the given state.
pub fn build_router(state: AppState) -> Router {
    let cors_origins = state.config.cors_origins.clone();
    let cors = if cors_origins.is_empty() {
        CorsLayer::permissive()
    } else {
        let origins: Vec<_> = cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new().allow_origin(AllowOrigin::list(origins))
    };

    // Multipart uploads carry some framing overhead beyond the raw bundle;
    // the handler enforces the exact `max_compressed` boundary itself, this
    // only keeps axum from rejecting the request before that check runs.
    let body_limit = state.config.bundle_limits.max_compressed as usize + 1024 * 1024;

    let api = Router::new()
        .route("/health", get(health::health_handler))
        .route("/skills/publish", post(publish::publish_handler))
        .route("/skills", get(search::search_handler))
        .route("/skills/{name}", get(skills::get_skill_handler))
        .route("/skills/{name}/versions", get(skills::list_versions_handler))
        .route(
            "/skills/{name}/versions/{version}/download",
            get(skills::download_handler),
        )
        .route(
            "/skills/{name}/star",
            post(stars::star_handler).delete(stars::unstar_handler),
        )
        .route("/categories", get(categories::categories_handler))
        .route("/users/{username}", get(users::get_user_handler))
        .route("/auth/github", post(auth::github_exchange_handler))
        .layer(DefaultBodyLimit::max(body_limit));

    let api_prefix = state.config.api_prefix.clone();

    Router::new()
        .nest(&api_prefix, api)
        .layer(CatchPanicLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
