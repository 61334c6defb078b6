use async_trait::async_trait;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::{
    ViewContext, ViewSet,
    nested::{movie_response, movie_responses},
    respond,
};
use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    models::{
        ApiResponse, CreateMovieRequest, Distributor, Movie, MovieChanges, NewMovie, Pagination,
        UpdateMovieRequest,
    },
    repository::RepositoryState,
    verification::{ContentVerification, VerificationRequest, VerificationStatus, verify_content},
};

/// MovieViewSet
///
/// Public reads, authenticated writes. Writes are further limited to the
/// account owning the movie's distributor, or an administrator.
pub struct MovieViewSet {
    repo: RepositoryState,
}

impl MovieViewSet {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    async fn find(&self, id: i64) -> ApiResult<Movie> {
        self.repo
            .get_movie(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Movie not found".to_string()))
    }

    /// Loads a movie together with its distributor and checks the caller may modify it.
    async fn find_owned(&self, ctx: &ViewContext) -> ApiResult<(Movie, AuthUser)> {
        let movie = self.find(ctx.id()?).await?;
        let distributor = self
            .repo
            .get_distributor(movie.distributor_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Movie not found".to_string()))?;

        let caller = ctx.caller()?;
        ensure_owner(caller, &distributor)?;
        Ok((movie, caller.clone()))
    }
}

fn ensure_owner(caller: &AuthUser, distributor: &Distributor) -> ApiResult<()> {
    if caller.is_admin() || caller.id == distributor.user_id {
        Ok(())
    } else {
        Err(ApiError::Forbidden("Permission denied".to_string()))
    }
}

/// Runs the content scorer; a `rejected` verdict stops the submission.
fn screen(request: &VerificationRequest) -> ApiResult<(ContentVerification, String)> {
    let verification = verify_content(request);
    if verification.status == VerificationStatus::Rejected {
        tracing::info!(
            score = verification.score,
            title = %request.title,
            "submission rejected by content verification"
        );
        return Err(ApiError::Rejected(verification));
    }

    let details =
        serde_json::to_string(&verification).map_err(|e| ApiError::Internal(e.to_string()))?;
    Ok((verification, details))
}

#[async_trait]
impl ViewSet for MovieViewSet {
    async fn list(&self, ctx: &ViewContext) -> ApiResult<Response> {
        let query = ctx.list_query();
        let page = self.repo.list_movies(&query).await?;
        let data = movie_responses(&self.repo, page.items).await?;
        let pagination = Pagination::new(query.page, query.limit, page.total);

        Ok(respond(StatusCode::OK, ApiResponse::paginated(data, pagination)))
    }

    /// create
    ///
    /// The target distributor must exist and belong to the caller (admins may
    /// submit for anyone); non-admins also need the distributor approved.
    async fn create(&self, ctx: &ViewContext) -> ApiResult<Response> {
        let caller = ctx.caller()?;
        let body: CreateMovieRequest = ctx.json()?;

        // 1. Validate the payload
        if body.title.trim().is_empty() {
            return Err(ApiError::BadRequest("Title is required".to_string()));
        }

        // 2. The caller must own an approved distributor (admins may use any)
        let distributor = self
            .repo
            .get_distributor(body.distributor_id)
            .await?
            .ok_or_else(|| ApiError::Forbidden("Permission denied".to_string()))?;
        ensure_owner(caller, &distributor)?;

        if !caller.is_admin() && !distributor.approved {
            return Err(ApiError::Forbidden("Distributor is not approved".to_string()));
        }

        // 3. Screen the content; a rejected verdict stops here with 422
        let (verification, details) = screen(&VerificationRequest {
            title: body.title.clone(),
            description: body.description.clone(),
            religion_category: body.religion_category.clone(),
        })?;

        // 4. Persist, always unapproved
        let movie = self
            .repo
            .create_movie(&NewMovie {
                title: body.title,
                description: body.description,
                religion_category: body.religion_category,
                language: body.language,
                video_url: body.video_url,
                distributor_id: distributor.id,
                verification_status: verification.status.as_str().to_string(),
                verification_details: details,
            })
            .await?;

        tracing::info!(
            movie_id = movie.id,
            distributor_id = distributor.id,
            verification = verification.status.as_str(),
            "movie submitted for moderation"
        );

        let data = movie_response(&self.repo, movie).await?;
        Ok(respond(StatusCode::CREATED, ApiResponse::ok(data)))
    }

    async fn retrieve(&self, ctx: &ViewContext) -> ApiResult<Response> {
        let movie = self.find(ctx.id()?).await?;
        let data = movie_response(&self.repo, movie).await?;
        Ok(respond(StatusCode::OK, ApiResponse::ok(data)))
    }

    async fn update(&self, ctx: &ViewContext) -> ApiResult<Response> {
        self.partial_update(ctx).await
    }

    /// partial_update
    ///
    /// Only administrators may flip `approved`. Changing the title, description
    /// or category re-runs the content scorer against the merged values.
    async fn partial_update(&self, ctx: &ViewContext) -> ApiResult<Response> {
        let (existing, caller) = self.find_owned(ctx).await?;
        let fields: UpdateMovieRequest = ctx.json()?;

        if fields.approved.is_some() && !caller.is_admin() {
            return Err(ApiError::Forbidden(
                "Only administrators can change approval".to_string(),
            ));
        }
        if fields.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
            return Err(ApiError::BadRequest("Title is required".to_string()));
        }

        // Content edits are re-screened against the merged values.
        let mut changes = MovieChanges::default();
        if fields.touches_content() {
            let (verification, details) = screen(&VerificationRequest {
                title: fields.title.clone().unwrap_or(existing.title),
                description: fields.description.clone().or(existing.description),
                religion_category: fields
                    .religion_category
                    .clone()
                    .or(existing.religion_category),
            })?;
            changes.verification_status = Some(verification.status.as_str().to_string());
            changes.verification_details = Some(details);
        }

        if let Some(approved) = fields.approved {
            tracing::info!(movie_id = existing.id, approved, moderator = %caller.id, "movie moderated");
        }
        changes.fields = fields;

        let movie = self
            .repo
            .update_movie(existing.id, &changes)
            .await?
            .ok_or_else(|| ApiError::NotFound("Movie not found".to_string()))?;

        let data = movie_response(&self.repo, movie).await?;
        Ok(respond(StatusCode::OK, ApiResponse::ok(data)))
    }

    async fn destroy(&self, ctx: &ViewContext) -> ApiResult<Response> {
        let (existing, _) = self.find_owned(ctx).await?;

        if !self.repo.delete_movie(existing.id).await? {
            return Err(ApiError::NotFound("Movie not found".to_string()));
        }

        tracing::info!(movie_id = existing.id, "movie deleted");
        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
