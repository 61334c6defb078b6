use std::sync::Arc;

use axum::{
    Router,
    extract::{FromRef, Request},
    http::{HeaderName, Method},
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod permissions;
pub mod repository;
pub mod router;
pub mod verification;
pub mod viewsets;

// Routing split by access level (public, authenticated, admin).
pub mod routes;
use auth::AuthUser;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use repository::{PostgresRepository, RepositoryState};
pub use viewsets::{DispatcherState, ResourceDispatcher};

/// ApiDoc
///
/// OpenAPI document for the hand-written endpoints, served at
/// `/api-docs/openapi.json`. The resource routes under `/api/{*path}` are
/// generated at runtime and described by their request/response schemas.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::verify_movie_title, handlers::verify_movie_content,
        handlers::list_users, handlers::get_my_distributor,
        handlers::register_distributor, handlers::setup_status,
    ),
    components(
        schemas(
            models::UserSummary, models::DistributorResponse, models::MovieResponse,
            models::Pagination, models::SetupStatus, models::CreateDistributorRequest,
            models::RegisterDistributorRequest, models::UpdateDistributorRequest,
            models::CreateMovieRequest, models::UpdateMovieRequest,
            verification::VerificationStatus, verification::TitleVerification,
            verification::VerificationRequest, verification::ContentVerification,
        )
    ),
    tags(
        (name = "movie-portal", description = "Movie submission and moderation API")
    )
)]
struct ApiDoc;

/// AppState
///
/// Unified, cheaply clonable state shared by every request.
#[derive(Clone)]
pub struct AppState {
    /// Persistence layer (Postgres in production, in-memory doubles in tests).
    pub repo: RepositoryState,
    pub config: AppConfig,
    /// Route table and viewsets behind `/api/{*path}`.
    pub resources: DispatcherState,
}

impl AppState {
    /// Wires the default movie and distributor resources over `repo`.
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        let resources = Arc::new(ResourceDispatcher::for_repository(repo.clone()));
        Self {
            repo,
            config,
            resources,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for DispatcherState {
    fn from_ref(app_state: &AppState) -> DispatcherState {
        app_state.resources.clone()
    }
}

/// auth_middleware
///
/// Rejects the request with the 401 envelope unless an `AuthUser` can be
/// resolved; otherwise passes it through untouched.
async fn auth_middleware(_auth_user: AuthUser, request: Request, next: Next) -> Response {
    next.run(request).await
}

const CORS_ALLOWED_HEADERS: [&str; 10] = [
    "x-csrf-token",
    "x-requested-with",
    "accept",
    "accept-version",
    "content-length",
    "content-md5",
    "content-type",
    "date",
    "x-api-version",
    "authorization",
];

/// create_router
///
/// Assembles the routing structure, scoped middleware and the shared state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS: browser clients send cookies, so the origin is mirrored rather
    // than wildcarded.
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::DELETE,
            Method::PATCH,
            Method::POST,
            Method::PUT,
            Method::OPTIONS,
        ])
        .allow_headers(CORS_ALLOWED_HEADERS.map(HeaderName::from_static));

    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .merge(admin::admin_routes())
        .with_state(state);

    // 3. Observability and correlation layers
    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS outermost so preflight requests short-circuit.
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span with method, uri and the generated
/// `x-request-id`, so every log line of a request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
