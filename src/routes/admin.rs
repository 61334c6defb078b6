use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Admin Router Module
///
/// Account oversight for administrators. The role check happens inside the
/// handlers through `permissions::require`, which answers 403 to anyone
/// without the admin role.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /api/users
        // Every account in the hosted auth schema.
        .route("/api/users", get(handlers::list_users))
}
