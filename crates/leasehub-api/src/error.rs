use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use thiserror::Error;
use tracing::error;

use leasehub_db::StoreError;
use leasehub_types::api::ErrorBody;

/// Typed handler error. Every variant maps to a stable `code` string in the
/// JSON body so clients can branch without parsing messages.
///
/// Guard variants mean no write was attempted; `Store` means the surrounding
/// transaction rolled back. Either way the caller can retry safely.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Auth(&'static str),
    #[error("{0}")]
    Forbidden(&'static str),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("interest already expressed for this lease")]
    DuplicateInterest,
    #[error("{0}")]
    InvalidOperation(String),
    #[error("storage failure")]
    Store(StoreError),
    #[error("internal error")]
    Internal,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Auth(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::DuplicateInterest => StatusCode::CONFLICT,
            ApiError::InvalidOperation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Store(_) | ApiError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "validation_error",
            ApiError::Auth(_) => "auth_error",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::NotFound(_) => "not_found",
            ApiError::DuplicateInterest => "duplicate_interest",
            ApiError::InvalidOperation(_) => "invalid_operation",
            ApiError::Store(_) => "store_error",
            ApiError::Internal => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        // Log storage details server-side; clients get a generic message.
        let message = match &self {
            ApiError::Store(err) => {
                error!("storage failure: {err}");
                "storage failure, no changes were applied".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            code: self.code().to_string(),
            message,
            partial: false,
        };
        (self.status(), Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(what) => ApiError::NotFound(what),
            StoreError::ThreadNotFound => ApiError::NotFound("thread"),
            StoreError::DuplicateInterest => ApiError::DuplicateInterest,
            StoreError::SelfInterest => {
                ApiError::InvalidOperation("cannot express interest in own listing".into())
            }
            StoreError::ListingCapReached => {
                ApiError::InvalidOperation("user already has an active listing".into())
            }
            StoreError::NotOwner => ApiError::Forbidden("not the owner of this listing"),
            other => ApiError::Store(other),
        }
    }
}
