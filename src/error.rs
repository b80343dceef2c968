use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::users::{dto::MessageResponse, repo::StoreError, services::ValidationError};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid payload.")]
    InvalidPayload,

    #[error("Sorry. That email already exists.")]
    DuplicateEmail,

    #[error("User does not exist")]
    UserNotFound,

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<ValidationError> for ApiError {
    fn from(_: ValidationError) -> Self {
        ApiError::InvalidPayload
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail(_) => ApiError::DuplicateEmail,
            StoreError::NotFound => ApiError::UserNotFound,
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidPayload | ApiError::DuplicateEmail => StatusCode::BAD_REQUEST,
            ApiError::UserNotFound => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match self {
            ApiError::Internal(ref msg) => {
                tracing::error!(error = %msg, "internal error");
                "Something went wrong.".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(MessageResponse::fail(message))).into_response()
    }
}
