use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use axum::{
    Json,
    body::Bytes,
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    models::{ApiResponse, ListQuery},
    permissions::{self, ViewSetPermissions},
    repository::RepositoryState,
    router::{Action, ResourceRouter},
};

mod distributor;
mod movie;
pub mod nested;

pub use distributor::DistributorViewSet;
pub use movie::MovieViewSet;

/// Everything an action needs from the incoming request.
#[derive(Debug, Clone, Default)]
pub struct ViewContext {
    pub user: Option<AuthUser>,
    /// Path parameters extracted from the matched route pattern.
    pub params: HashMap<String, String>,
    pub query: HashMap<String, String>,
    pub body: Bytes,
}

impl ViewContext {
    /// The numeric `{id}` path parameter.
    pub fn id(&self) -> ApiResult<i64> {
        self.params
            .get("id")
            .and_then(|raw| raw.parse().ok())
            .ok_or_else(|| ApiError::BadRequest("Invalid id".to_string()))
    }

    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| ApiError::BadRequest(format!("Invalid request body: {e}")))
    }

    /// The caller, for actions whose permission already guarantees one.
    pub fn caller(&self) -> ApiResult<&AuthUser> {
        self.user.as_ref().ok_or(ApiError::Unauthorized)
    }

    /// list_query
    ///
    /// `page` defaults to 1 and `limit` to 10 (clamped to 1..=100). Unparsable
    /// values fall back to the defaults. `approved` is true only for the
    /// literal `true`.
    pub fn list_query(&self) -> ListQuery {
        let number = |key: &str| self.query.get(key).and_then(|v| v.parse::<i64>().ok());

        ListQuery {
            page: number("page").unwrap_or(1).max(1),
            limit: number("limit")
                .unwrap_or(ListQuery::DEFAULT_LIMIT)
                .clamp(1, ListQuery::MAX_LIMIT),
            approved: self.query.get("approved").map(|v| v == "true"),
            distributor_id: number("distributor"),
        }
    }
}

pub fn respond<T: Serialize>(status: StatusCode, body: ApiResponse<T>) -> Response {
    (status, Json(body)).into_response()
}

/// ViewSet
///
/// The six CRUD actions of a resource plus a permission table. `dispatch`
/// applies the permission for the action before running it and renders any
/// error as the JSON envelope.
#[async_trait]
pub trait ViewSet: Send + Sync {
    fn permissions(&self) -> ViewSetPermissions {
        ViewSetPermissions::default()
    }

    async fn list(&self, ctx: &ViewContext) -> ApiResult<Response>;
    async fn create(&self, ctx: &ViewContext) -> ApiResult<Response>;
    async fn retrieve(&self, ctx: &ViewContext) -> ApiResult<Response>;
    async fn update(&self, ctx: &ViewContext) -> ApiResult<Response>;
    async fn partial_update(&self, ctx: &ViewContext) -> ApiResult<Response>;
    async fn destroy(&self, ctx: &ViewContext) -> ApiResult<Response>;

    async fn dispatch(&self, action: Action, ctx: ViewContext) -> Response {
        let required = self.permissions().for_action(action);
        if let Err(denied) = permissions::require(ctx.user.as_ref(), required) {
            return denied.into_response();
        }

        let outcome = match action {
            Action::List => self.list(&ctx).await,
            Action::Create => self.create(&ctx).await,
            Action::Retrieve => self.retrieve(&ctx).await,
            Action::Update => self.update(&ctx).await,
            Action::PartialUpdate => self.partial_update(&ctx).await,
            Action::Destroy => self.destroy(&ctx).await,
        };

        outcome.unwrap_or_else(IntoResponse::into_response)
    }
}

/// ResourceDispatcher
///
/// Pairs the route table with the viewset implementations named in it.
pub struct ResourceDispatcher {
    router: ResourceRouter,
    viewsets: HashMap<String, Arc<dyn ViewSet>>,
}

pub type DispatcherState = Arc<ResourceDispatcher>;

impl ResourceDispatcher {
    pub fn new(router: ResourceRouter) -> Self {
        Self {
            router,
            viewsets: HashMap::new(),
        }
    }

    pub fn with_viewset(mut self, name: &str, viewset: Arc<dyn ViewSet>) -> Self {
        self.viewsets.insert(name.to_string(), viewset);
        self
    }

    /// The application's movie and distributor resources over `repo`.
    pub fn for_repository(repo: RepositoryState) -> Self {
        Self::new(ResourceRouter::default_routes())
            .with_viewset("MovieViewSet", Arc::new(MovieViewSet::new(repo.clone())))
            .with_viewset("DistributorViewSet", Arc::new(DistributorViewSet::new(repo)))
    }

    pub fn router(&self) -> &ResourceRouter {
        &self.router
    }

    /// handle
    ///
    /// Matches `pathname` (relative to the API root, leading `/`) and runs the
    /// matched action on the owning viewset.
    pub async fn handle(&self, method: &Method, pathname: &str, mut ctx: ViewContext) -> Response {
        let Some(route) = self.router.match_route(pathname, method) else {
            return ApiError::NotFound("Route not found".to_string()).into_response();
        };

        ctx.params = self.router.extract_params(&route.pattern, pathname);

        let Some(config) = self.router.config_for(route) else {
            return ApiError::NotFound("ViewSet not found".to_string()).into_response();
        };

        let Some(viewset) = self.viewsets.get(&config.viewset) else {
            return ApiError::Internal("ViewSet implementation not found".to_string())
                .into_response();
        };

        tracing::debug!(route = %route.name, action = %route.action, "dispatching");
        viewset.dispatch(route.action, ctx).await
    }
}
