use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::response::reply;

/// Controller-boundary error. Entity operations let `sqlx::Error` propagate
/// uncaught; handlers are the single recovery point per request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("todo not found")]
    NotFound,

    #[error("{0}")]
    Internal(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => reply(StatusCode::BAD_REQUEST, message, None),
            ApiError::NotFound => reply(StatusCode::NOT_FOUND, "todo not found", None),
            ApiError::Internal(message) => {
                tracing::error!(%message, "request failed");
                reply(StatusCode::INTERNAL_SERVER_ERROR, message, None)
            }
            ApiError::Database(err) => {
                tracing::error!(error = %err, "storage error");
                reply(StatusCode::INTERNAL_SERVER_ERROR, "internal server error", None)
            }
        }
    }
}
