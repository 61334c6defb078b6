use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    models::{Distributor, DistributorResponse, Movie, MovieResponse, UserSummary},
    repository::RepositoryState,
};

/// user_summary
///
/// Innermost level of the movie -> distributor -> account nesting. An account
/// that no longer exists is rendered with empty name and email.
pub async fn user_summary(repo: &RepositoryState, user_id: Uuid) -> ApiResult<UserSummary> {
    Ok(repo
        .get_user(user_id)
        .await?
        .as_ref()
        .map(UserSummary::from)
        .unwrap_or_else(|| UserSummary::missing(user_id)))
}

pub async fn distributor_response(
    repo: &RepositoryState,
    distributor: Distributor,
) -> ApiResult<DistributorResponse> {
    let user = user_summary(repo, distributor.user_id).await?;
    Ok(DistributorResponse {
        id: distributor.id,
        user,
        company_name: distributor.company_name,
        approved: distributor.approved,
        created_at: distributor.created_at,
    })
}

pub async fn movie_response(repo: &RepositoryState, movie: Movie) -> ApiResult<MovieResponse> {
    let distributor = repo.get_distributor(movie.distributor_id).await?.ok_or_else(|| {
        ApiError::Internal(format!(
            "Movie {} references missing distributor {}",
            movie.id, movie.distributor_id
        ))
    })?;

    Ok(MovieResponse {
        id: movie.id,
        title: movie.title,
        description: movie.description,
        religion_category: movie.religion_category,
        language: movie.language,
        video_url: movie.video_url,
        distributor: distributor_response(repo, distributor).await?,
        approved: movie.approved,
        verification_status: movie.verification_status,
        created_at: movie.created_at,
    })
}

pub async fn movie_responses(
    repo: &RepositoryState,
    movies: Vec<Movie>,
) -> ApiResult<Vec<MovieResponse>> {
    let mut out = Vec::with_capacity(movies.len());
    for movie in movies {
        out.push(movie_response(repo, movie).await?);
    }
    Ok(out)
}

pub async fn distributor_responses(
    repo: &RepositoryState,
    distributors: Vec<Distributor>,
) -> ApiResult<Vec<DistributorResponse>> {
    let mut out = Vec::with_capacity(distributors.len());
    for distributor in distributors {
        out.push(distributor_response(repo, distributor).await?);
    }
    Ok(out)
}
