use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Database Rows ---

/// User
///
/// An account row from the hosted auth schema (`auth.users`). The username and
/// role are read from the account's metadata document.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub username: Option<String>,
    // 'admin' or 'user'.
    pub role: String,
}

impl User {
    /// Metadata username, else the local part of the email address.
    pub fn display_username(&self) -> String {
        match self.username.as_deref().filter(|name| !name.is_empty()) {
            Some(name) => name.to_string(),
            None => self.email.split('@').next().unwrap_or_default().to_string(),
        }
    }
}

/// Distributor
///
/// A row of `public.distributors`: one company per account, pending until an
/// administrator approves it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default, PartialEq)]
pub struct Distributor {
    pub id: i64,
    pub user_id: Uuid,
    pub company_name: String,
    pub approved: bool,
    pub created_at: DateTime<Utc>,
}

/// Movie
///
/// A row of `public.movies`. `verification_details` holds the serialized
/// [`crate::verification::ContentVerification`] computed at submission time.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, Default, PartialEq)]
pub struct Movie {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub religion_category: Option<String>,
    pub language: Option<String>,
    pub video_url: Option<String>,
    pub distributor_id: i64,
    pub approved: bool,
    pub verification_status: Option<String>,
    pub verification_details: Option<String>,
    pub created_at: DateTime<Utc>,
}

// --- Response Schemas ---

/// UserSummary
///
/// Public projection of an account, embedded in distributor responses.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct UserSummary {
    pub id: Uuid,
    pub username: String,
    pub email: String,
}

impl UserSummary {
    /// Summary for an account id whose record could not be found.
    pub fn missing(id: Uuid) -> Self {
        Self {
            id,
            username: String::new(),
            email: String::new(),
        }
    }
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.display_username(),
            email: user.email.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct DistributorResponse {
    pub id: i64,
    pub user: UserSummary,
    pub company_name: String,
    pub approved: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// MovieResponse
///
/// A movie with its distributor and the distributor's account resolved.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct MovieResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub religion_category: Option<String>,
    pub language: Option<String>,
    pub video_url: Option<String>,
    pub distributor: DistributorResponse,
    pub approved: bool,
    pub verification_status: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub pages: i64,
}

impl Pagination {
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
        Self {
            page,
            limit,
            total,
            pages,
        }
    }
}

/// ApiResponse
///
/// The envelope every JSON endpoint answers with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            pagination: None,
        }
    }

    pub fn paginated(data: T, pagination: Pagination) -> Self {
        Self {
            pagination: Some(pagination),
            ..Self::ok(data)
        }
    }
}

/// SetupStatus
///
/// Output of GET /api/setup/status, reporting whether the deployment is wired up.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct SetupStatus {
    pub supabase_configured: bool,
    pub database_reachable: bool,
    pub movies_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_error: Option<String>,
}

// --- Request Payloads ---

/// Pagination and filtering query accepted by list actions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ListQuery {
    pub page: i64,
    pub limit: i64,
    pub approved: Option<bool>,
    pub distributor_id: Option<i64>,
}

impl ListQuery {
    pub const DEFAULT_LIMIT: i64 = 10;
    pub const MAX_LIMIT: i64 = 100;

    /// Rows to skip. Saturates instead of overflowing for absurd page numbers,
    /// which then simply return an empty page.
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateDistributorRequest {
    pub user_id: Uuid,
    pub company_name: String,
    #[serde(default)]
    pub approved: Option<bool>,
}

/// RegisterDistributorRequest
///
/// Self-service registration body; the owning account is the caller.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct RegisterDistributorRequest {
    pub company_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct UpdateDistributorRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateMovieRequest {
    pub title: String,
    pub description: Option<String>,
    pub religion_category: Option<String>,
    pub language: Option<String>,
    pub video_url: Option<String>,
    pub distributor_id: i64,
}

/// UpdateMovieRequest
///
/// Partial update for PUT and PATCH. Absent fields keep their stored value.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default, PartialEq)]
#[ts(export)]
pub struct UpdateMovieRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub religion_category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
}

impl UpdateMovieRequest {
    /// True when a field the content scorer looks at is being changed.
    pub fn touches_content(&self) -> bool {
        self.title.is_some() || self.description.is_some() || self.religion_category.is_some()
    }
}

/// NewMovie
///
/// Fully validated insert, produced by the movie viewset after the ownership
/// and verification checks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewMovie {
    pub title: String,
    pub description: Option<String>,
    pub religion_category: Option<String>,
    pub language: Option<String>,
    pub video_url: Option<String>,
    pub distributor_id: i64,
    pub verification_status: String,
    pub verification_details: String,
}

/// MovieChanges
///
/// Column updates applied by the repository; verification columns are only
/// set when the content was re-scored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MovieChanges {
    pub fields: UpdateMovieRequest,
    pub verification_status: Option<String>,
    pub verification_details: Option<String>,
}
