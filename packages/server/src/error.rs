use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use sea_orm::DbErr;
use serde::Serialize;

/// Errors raised by the site-generation core.
#[derive(Debug, thiserror::Error)]
pub enum SsgError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Db(#[from] DbErr),

    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),

    #[error("frontmatter error: {0}")]
    Frontmatter(#[from] serde_yaml::Error),

    #[error("git {step} failed: {detail}")]
    Git { step: &'static str, detail: String },

    #[error("operation cancelled")]
    Cancelled,
}

pub type Result<T> = std::result::Result<T, SsgError>;

impl From<folio_common::ModelError> for SsgError {
    fn from(err: folio_common::ModelError) -> Self {
        SsgError::Validation(err.to_string())
    }
}

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `BAD_REQUEST`,
    /// `NOT_FOUND`, `CONFLICT`, `FORBIDDEN`, `CANCELLED`, `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: &'static str,
    /// Human-readable error description.
    #[schema(example = "Slug must contain only a-z, 0-9 and '-'")]
    pub message: String,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Forbidden(String),
    Cancelled,
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR",
                    message: msg,
                },
            ),
            AppError::BadRequest(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "BAD_REQUEST",
                    message: msg,
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND",
                    message: msg,
                },
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "CONFLICT",
                    message: msg,
                },
            ),
            AppError::Forbidden(msg) => (
                StatusCode::FORBIDDEN,
                ErrorBody {
                    code: "FORBIDDEN",
                    message: msg,
                },
            ),
            AppError::Cancelled => (
                StatusCode::REQUEST_TIMEOUT,
                ErrorBody {
                    code: "CANCELLED",
                    message: "Request was cancelled".into(),
                },
            ),
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR",
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<SsgError> for AppError {
    fn from(err: SsgError) -> Self {
        match err {
            SsgError::Validation(msg) => AppError::Validation(msg),
            SsgError::NotFound(msg) => AppError::NotFound(msg),
            SsgError::Conflict(msg) => AppError::Conflict(msg),
            SsgError::Forbidden(msg) => AppError::Forbidden(msg),
            SsgError::Cancelled => AppError::Cancelled,
            other => AppError::Internal(other.to_string()),
        }
    }
}
