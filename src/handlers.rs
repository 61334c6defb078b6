use std::collections::HashMap;

use crate::{
    AppState,
    auth::AuthUser,
    error::{ApiError, ApiResult},
    models::{
        ApiResponse, DistributorResponse, RegisterDistributorRequest, SetupStatus, UserSummary,
    },
    permissions::{self, Permission},
    verification::{
        ContentVerification, TitleVerification, VerificationRequest, verify_content, verify_title,
    },
    viewsets::{ViewContext, nested::distributor_response},
};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::{Method, StatusCode},
    response::Response,
};
use serde::Deserialize;

// --- Query Structs ---

/// VerifyTitleQuery
///
/// Query parameters for the title-only verification endpoint.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct VerifyTitleQuery {
    /// Movie title to score.
    pub title: Option<String>,
}

// --- Handlers ---

/// dispatch_resource
///
/// Catch-all entry point for `/api/{*path}`. Identity is optional here: each
/// viewset action decides through its permission table whether an anonymous
/// caller is acceptable.
pub async fn dispatch_resource(
    State(state): State<AppState>,
    user: Option<AuthUser>,
    method: Method,
    Path(path): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    let pathname = format!("/{}", path.trim_start_matches('/'));
    let ctx = ViewContext {
        user,
        params: HashMap::new(),
        query,
        body,
    };

    state.resources.handle(&method, &pathname, ctx).await
}

/// verify_movie_title
///
/// [Public Route] Scores a title on its own.
#[utoipa::path(
    get,
    path = "/api/ai/verify-movie",
    params(VerifyTitleQuery),
    responses(
        (status = 200, description = "Title verdict", body = TitleVerification),
        (status = 400, description = "Missing title")
    )
)]
pub async fn verify_movie_title(
    Query(params): Query<VerifyTitleQuery>,
) -> ApiResult<Json<ApiResponse<TitleVerification>>> {
    let title = params
        .title
        .filter(|title| !title.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Title parameter is required".to_string()))?;

    Ok(Json(ApiResponse::ok(verify_title(&title))))
}

/// verify_movie_content
///
/// [Public Route] Scores a full submission (title, description, category)
/// without storing anything. Lets distributors preview the verdict.
#[utoipa::path(
    post,
    path = "/api/ai/verify-movie",
    request_body = VerificationRequest,
    responses(
        (status = 200, description = "Content verdict", body = ContentVerification),
        (status = 400, description = "Missing title or malformed body")
    )
)]
pub async fn verify_movie_content(
    payload: Result<Json<VerificationRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<ContentVerification>>> {
    let Json(payload) = payload?;
    if payload.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Title is required".to_string()));
    }

    Ok(Json(ApiResponse::ok(verify_content(&payload))))
}

/// list_users
///
/// [Admin Route] Every account of the hosted auth schema as a public summary.
#[utoipa::path(
    get,
    path = "/api/users",
    responses(
        (status = 200, description = "All accounts", body = [UserSummary]),
        (status = 403, description = "Not an administrator")
    )
)]
pub async fn list_users(
    user: Option<AuthUser>,
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<Vec<UserSummary>>>> {
    permissions::require(user.as_ref(), Permission::Admin)?;

    let users = state.repo.list_users().await?;
    Ok(Json(ApiResponse::ok(
        users.iter().map(UserSummary::from).collect(),
    )))
}

/// get_my_distributor
///
/// [Authenticated Route] The distributor company owned by the caller.
#[utoipa::path(
    get,
    path = "/api/distributors/me",
    responses(
        (status = 200, description = "My distributor", body = DistributorResponse),
        (status = 404, description = "Not registered")
    )
)]
pub async fn get_my_distributor(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<ApiResponse<DistributorResponse>>> {
    let distributor = state
        .repo
        .get_distributor_for_user(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Distributor not found".to_string()))?;

    let data = distributor_response(&state.repo, distributor).await?;
    Ok(Json(ApiResponse::ok(data)))
}

/// register_distributor
///
/// [Authenticated Route] Self-service distributor registration. The company is
/// created unapproved and waits for an administrator; one company per account.
#[utoipa::path(
    post,
    path = "/api/distributors/me",
    request_body = RegisterDistributorRequest,
    responses(
        (status = 201, description = "Registered", body = DistributorResponse),
        (status = 400, description = "Missing company name or malformed body"),
        (status = 409, description = "Already registered")
    )
)]
pub async fn register_distributor(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    payload: Result<Json<RegisterDistributorRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<DistributorResponse>>)> {
    let Json(payload) = payload?;
    let company_name = payload.company_name.trim();
    if company_name.is_empty() {
        return Err(ApiError::BadRequest("Company name is required".to_string()));
    }

    if state.repo.get_distributor_for_user(id).await?.is_some() {
        return Err(ApiError::Conflict(
            "Distributor already registered for this account".to_string(),
        ));
    }

    let distributor = state.repo.create_distributor(id, company_name, false).await?;
    tracing::info!(distributor_id = distributor.id, user_id = %id, "distributor registered");

    let data = distributor_response(&state.repo, distributor).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(data))))
}

/// setup_status
///
/// [Public Route] Reports whether the hosted project credentials are set and
/// the database answers. Database failures are reported, not raised.
#[utoipa::path(
    get,
    path = "/api/setup/status",
    responses((status = 200, description = "Deployment status", body = SetupStatus))
)]
pub async fn setup_status(State(state): State<AppState>) -> Json<ApiResponse<SetupStatus>> {
    let mut status = SetupStatus {
        supabase_configured: state.config.is_supabase_configured(),
        ..SetupStatus::default()
    };

    match state.repo.count_movies().await {
        Ok(count) => {
            status.database_reachable = true;
            status.movies_count = Some(count);
        }
        Err(e) => {
            tracing::warn!(error = %e, "setup check could not reach the database");
            status.database_error = Some(e.to_string());
        }
    }

    Json(ApiResponse::ok(status))
}
