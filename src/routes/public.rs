use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{any, get},
};

/// Public Router Module
///
/// Endpoints with no authentication layer. `/api/{*path}` forwards every
/// method to the resource dispatcher, which resolves the caller itself and
/// applies the matched viewset's permission table.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness check for load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /api/setup/status
        // Credentials present, database reachable, movie count.
        .route("/api/setup/status", get(handlers::setup_status))
        // GET  /api/ai/verify-movie?title=...  title-only verdict
        // POST /api/ai/verify-movie            full content verdict
        .route(
            "/api/ai/verify-movie",
            get(handlers::verify_movie_title).post(handlers::verify_movie_content),
        )
        // ANY /api/{*path}
        // Movies and distributors. Static routes above and in the other
        // modules take priority over this catch-all.
        .route("/api/{*path}", any(handlers::dispatch_resource))
}
