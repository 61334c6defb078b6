use async_trait::async_trait;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::{
    ViewContext, ViewSet,
    nested::{distributor_response, distributor_responses},
    respond,
};
use crate::{
    error::{ApiError, ApiResult},
    models::{ApiResponse, CreateDistributorRequest, Pagination, UpdateDistributorRequest},
    permissions::ViewSetPermissions,
    repository::RepositoryState,
};

/// DistributorViewSet
///
/// Administrative management of distributor companies. Every action requires
/// the admin role; self-service registration lives at `/api/distributors/me`.
pub struct DistributorViewSet {
    repo: RepositoryState,
}

impl DistributorViewSet {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }
}

fn not_found() -> ApiError {
    ApiError::NotFound("Distributor not found".to_string())
}

#[async_trait]
impl ViewSet for DistributorViewSet {
    fn permissions(&self) -> ViewSetPermissions {
        ViewSetPermissions::admin_only()
    }

    async fn list(&self, ctx: &ViewContext) -> ApiResult<Response> {
        let query = ctx.list_query();
        let page = self.repo.list_distributors(&query).await?;
        let data = distributor_responses(&self.repo, page.items).await?;
        let pagination = Pagination::new(query.page, query.limit, page.total);

        Ok(respond(StatusCode::OK, ApiResponse::paginated(data, pagination)))
    }

    async fn create(&self, ctx: &ViewContext) -> ApiResult<Response> {
        let body: CreateDistributorRequest = ctx.json()?;
        let company_name = body.company_name.trim();
        if company_name.is_empty() {
            return Err(ApiError::BadRequest("Company name is required".to_string()));
        }

        let distributor = self
            .repo
            .create_distributor(body.user_id, company_name, body.approved.unwrap_or(false))
            .await?;

        tracing::info!(distributor_id = distributor.id, user_id = %distributor.user_id, "distributor created");

        let data = distributor_response(&self.repo, distributor).await?;
        Ok(respond(StatusCode::CREATED, ApiResponse::ok(data)))
    }

    async fn retrieve(&self, ctx: &ViewContext) -> ApiResult<Response> {
        let distributor = self
            .repo
            .get_distributor(ctx.id()?)
            .await?
            .ok_or_else(not_found)?;

        let data = distributor_response(&self.repo, distributor).await?;
        Ok(respond(StatusCode::OK, ApiResponse::ok(data)))
    }

    async fn update(&self, ctx: &ViewContext) -> ApiResult<Response> {
        self.partial_update(ctx).await
    }

    async fn partial_update(&self, ctx: &ViewContext) -> ApiResult<Response> {
        let id = ctx.id()?;
        let changes: UpdateDistributorRequest = ctx.json()?;

        if changes
            .company_name
            .as_deref()
            .is_some_and(|name| name.trim().is_empty())
        {
            return Err(ApiError::BadRequest("Company name is required".to_string()));
        }

        let distributor = self
            .repo
            .update_distributor(id, &changes)
            .await?
            .ok_or_else(not_found)?;

        if let Some(approved) = changes.approved {
            tracing::info!(distributor_id = id, approved, "distributor approval changed");
        }

        let data = distributor_response(&self.repo, distributor).await?;
        Ok(respond(StatusCode::OK, ApiResponse::ok(data)))
    }

    async fn destroy(&self, ctx: &ViewContext) -> ApiResult<Response> {
        let id = ctx.id()?;
        if !self.repo.delete_distributor(id).await? {
            return Err(not_found());
        }

        tracing::info!(distributor_id = id, "distributor deleted");
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
