use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Routes that need a resolved caller. The router is wrapped in the
/// authentication middleware by `create_router`, and each handler also takes
/// `AuthUser` to read the caller's id.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET  /api/distributors/me  the caller's distributor company
        // POST /api/distributors/me  self-registration, created unapproved
        .route(
            "/api/distributors/me",
            get(handlers::get_my_distributor).post(handlers::register_distributor),
        )
}
