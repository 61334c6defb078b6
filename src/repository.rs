use crate::{
    error::RepositoryError,
    models::{Distributor, ListQuery, Movie, MovieChanges, NewMovie, UpdateDistributorRequest, User},
};
use async_trait::async_trait;
use sqlx::{PgPool, Postgres, query_builder::QueryBuilder};
use std::sync::Arc;
use uuid::Uuid;

pub type RepoResult<T> = Result<T, RepositoryError>;

/// One page of rows plus the total row count of the unpaginated query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

/// Repository Trait
///
/// Abstract contract for every persistence operation, so handlers and viewsets
/// never know whether they talk to Postgres or a test double.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Accounts (hosted auth schema, read-only) ---
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>>;
    async fn list_users(&self) -> RepoResult<Vec<User>>;

    // --- Distributors ---
    // Newest first.
    async fn list_distributors(&self, query: &ListQuery) -> RepoResult<Page<Distributor>>;
    async fn get_distributor(&self, id: i64) -> RepoResult<Option<Distributor>>;
    async fn get_distributor_for_user(&self, user_id: Uuid) -> RepoResult<Option<Distributor>>;
    async fn create_distributor(
        &self,
        user_id: Uuid,
        company_name: &str,
        approved: bool,
    ) -> RepoResult<Distributor>;
    // Uses COALESCE, so absent fields keep their value. None when the row is missing.
    async fn update_distributor(
        &self,
        id: i64,
        changes: &UpdateDistributorRequest,
    ) -> RepoResult<Option<Distributor>>;
    async fn delete_distributor(&self, id: i64) -> RepoResult<bool>;

    // --- Movies ---
    // Filters on `approved` and `distributor_id` when set. Newest first.
    async fn list_movies(&self, query: &ListQuery) -> RepoResult<Page<Movie>>;
    async fn get_movie(&self, id: i64) -> RepoResult<Option<Movie>>;
    // New movies always start unapproved.
    async fn create_movie(&self, movie: &NewMovie) -> RepoResult<Movie>;
    async fn update_movie(&self, id: i64, changes: &MovieChanges) -> RepoResult<Option<Movie>>;
    async fn delete_movie(&self, id: i64) -> RepoResult<bool>;
    async fn count_movies(&self) -> RepoResult<i64>;
}

/// RepositoryState
///
/// The shared handle to the persistence layer held by the application state.
pub type RepositoryState = Arc<dyn Repository>;

const USER_COLUMNS: &str = r#"
    id,
    COALESCE(email, '') AS email,
    raw_user_meta_data->>'username' AS username,
    COALESCE(raw_user_meta_data->>'role', 'user') AS role
"#;

const DISTRIBUTOR_COLUMNS: &str = "id, user_id, company_name, approved, created_at";

const MOVIE_COLUMNS: &str = r#"
    id, title, description, religion_category, language, video_url,
    distributor_id, approved, verification_status, verification_details, created_at
"#;

/// PostgresRepository
///
/// `Repository` backed by the hosted project's Postgres database. Queries are
/// checked at runtime so the crate builds without a database connection.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn push_movie_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &ListQuery) {
        builder.push(" WHERE TRUE");
        if let Some(approved) = query.approved {
            builder.push(" AND approved = ");
            builder.push_bind(approved);
        }
        if let Some(distributor_id) = query.distributor_id {
            builder.push(" AND distributor_id = ");
            builder.push_bind(distributor_id);
        }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM auth.users WHERE id = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_users(&self) -> RepoResult<Vec<User>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM auth.users ORDER BY created_at DESC");
        Ok(sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?)
    }

    async fn list_distributors(&self, query: &ListQuery) -> RepoResult<Page<Distributor>> {
        let sql = format!(
            "SELECT {DISTRIBUTOR_COLUMNS} FROM distributors ORDER BY created_at DESC LIMIT $1 OFFSET $2"
        );
        let items = sqlx::query_as::<_, Distributor>(&sql)
            .bind(query.limit)
            .bind(query.offset())
            .fetch_all(&self.pool)
            .await?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM distributors")
            .fetch_one(&self.pool)
            .await?;

        Ok(Page { items, total })
    }

    async fn get_distributor(&self, id: i64) -> RepoResult<Option<Distributor>> {
        let sql = format!("SELECT {DISTRIBUTOR_COLUMNS} FROM distributors WHERE id = $1");
        Ok(sqlx::query_as::<_, Distributor>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn get_distributor_for_user(&self, user_id: Uuid) -> RepoResult<Option<Distributor>> {
        let sql = format!(
            "SELECT {DISTRIBUTOR_COLUMNS} FROM distributors WHERE user_id = $1 ORDER BY created_at LIMIT 1"
        );
        Ok(sqlx::query_as::<_, Distributor>(&sql)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_distributor(
        &self,
        user_id: Uuid,
        company_name: &str,
        approved: bool,
    ) -> RepoResult<Distributor> {
        let sql = format!(
            "INSERT INTO distributors (user_id, company_name, approved) VALUES ($1, $2, $3) RETURNING {DISTRIBUTOR_COLUMNS}"
        );
        Ok(sqlx::query_as::<_, Distributor>(&sql)
            .bind(user_id)
            .bind(company_name)
            .bind(approved)
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_distributor(
        &self,
        id: i64,
        changes: &UpdateDistributorRequest,
    ) -> RepoResult<Option<Distributor>> {
        let sql = format!(
            r#"
            UPDATE distributors
            SET company_name = COALESCE($2, company_name),
                approved = COALESCE($3, approved)
            WHERE id = $1
            RETURNING {DISTRIBUTOR_COLUMNS}"#
        );
        Ok(sqlx::query_as::<_, Distributor>(&sql)
            .bind(id)
            .bind(changes.company_name.as_deref())
            .bind(changes.approved)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_distributor(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM distributors WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// list_movies
    ///
    /// Builds the filtered page and count queries with QueryBuilder so every
    /// filter value is bound, never interpolated.
    async fn list_movies(&self, query: &ListQuery) -> RepoResult<Page<Movie>> {
        let mut builder: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {MOVIE_COLUMNS} FROM movies"));
        Self::push_movie_filters(&mut builder, query);
        builder.push(" ORDER BY created_at DESC LIMIT ");
        builder.push_bind(query.limit);
        builder.push(" OFFSET ");
        builder.push_bind(query.offset());

        let items = builder
            .build_query_as::<Movie>()
            .fetch_all(&self.pool)
            .await?;

        let mut counter: QueryBuilder<Postgres> = QueryBuilder::new("SELECT COUNT(*) FROM movies");
        Self::push_movie_filters(&mut counter, query);
        let total = counter
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(Page { items, total })
    }

    async fn get_movie(&self, id: i64) -> RepoResult<Option<Movie>> {
        let sql = format!("SELECT {MOVIE_COLUMNS} FROM movies WHERE id = $1");
        Ok(sqlx::query_as::<_, Movie>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_movie(&self, movie: &NewMovie) -> RepoResult<Movie> {
        let sql = format!(
            r#"
            INSERT INTO movies (
                title, description, religion_category, language, video_url,
                distributor_id, approved, verification_status, verification_details
            )
            VALUES ($1, $2, $3, $4, $5, $6, false, $7, $8)
            RETURNING {MOVIE_COLUMNS}"#
        );
        Ok(sqlx::query_as::<_, Movie>(&sql)
            .bind(movie.title.as_str())
            .bind(movie.description.as_deref())
            .bind(movie.religion_category.as_deref())
            .bind(movie.language.as_deref())
            .bind(movie.video_url.as_deref())
            .bind(movie.distributor_id)
            .bind(movie.verification_status.as_str())
            .bind(movie.verification_details.as_str())
            .fetch_one(&self.pool)
            .await?)
    }

    async fn update_movie(&self, id: i64, changes: &MovieChanges) -> RepoResult<Option<Movie>> {
        let sql = format!(
            r#"
            UPDATE movies
            SET title = COALESCE($2, title),
                description = COALESCE($3, description),
                religion_category = COALESCE($4, religion_category),
                language = COALESCE($5, language),
                video_url = COALESCE($6, video_url),
                approved = COALESCE($7, approved),
                verification_status = COALESCE($8, verification_status),
                verification_details = COALESCE($9, verification_details)
            WHERE id = $1
            RETURNING {MOVIE_COLUMNS}"#
        );
        let fields = &changes.fields;
        Ok(sqlx::query_as::<_, Movie>(&sql)
            .bind(id)
            .bind(fields.title.as_deref())
            .bind(fields.description.as_deref())
            .bind(fields.religion_category.as_deref())
            .bind(fields.language.as_deref())
            .bind(fields.video_url.as_deref())
            .bind(fields.approved)
            .bind(changes.verification_status.as_deref())
            .bind(changes.verification_details.as_deref())
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_movie(&self, id: i64) -> RepoResult<bool> {
        let result = sqlx::query("DELETE FROM movies WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count_movies(&self) -> RepoResult<i64> {
        Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM movies")
            .fetch_one(&self.pool)
            .await?)
    }
}
