use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::verification::ContentVerification;

/// RepositoryError
///
/// Persistence failures, classified so handlers can distinguish client mistakes
/// (duplicate rows, dangling references) from infrastructure problems.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    InvalidReference(String),
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        use sqlx::error::ErrorKind;

        if let Some(db_err) = err.as_database_error() {
            let message = db_err.message().to_string();
            match db_err.kind() {
                ErrorKind::UniqueViolation => return Self::Conflict(message),
                ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => return Self::InvalidReference(message),
                _ => {}
            }
        }
        Self::Database(err)
    }
}

/// ApiError
///
/// Every failure a handler can surface. Rendered as the standard JSON envelope
/// `{ "success": false, "message": ... }` with the matching status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Authentication required")]
    Unauthorized,
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    /// The content scorer refused the submission.
    #[error("Submission rejected by content verification")]
    Rejected(ContentVerification),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Repository(RepositoryError::Conflict(_)) => StatusCode::CONFLICT,
            Self::Repository(RepositoryError::InvalidReference(_)) => StatusCode::BAD_REQUEST,
            Self::Repository(RepositoryError::Database(_)) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            Self::Rejected(verification) => json!({
                "success": false,
                "message": self.to_string(),
                "data": verification,
            }),
            Self::Repository(RepositoryError::Database(e)) => {
                tracing::error!(error = ?e, "repository failure");
                json!({ "success": false, "message": "Internal server error" })
            }
            Self::Internal(message) => {
                tracing::error!(%message, "internal error");
                json!({ "success": false, "message": message })
            }
            _ => json!({ "success": false, "message": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

/// Malformed or mistyped JSON bodies answer with the envelope like every
/// other client error.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
