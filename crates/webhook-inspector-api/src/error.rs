//! API error taxonomy and its HTTP mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;
use webhook_inspector_db::{IdError, PageError, StoreError};

use crate::models::ErrorResponse;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidId(#[from] IdError),

    #[error(transparent)]
    InvalidPage(#[from] PageError),

    #[error("Invalid query string: {0}")]
    InvalidQuery(String),

    #[error("Webhook not found.")]
    NotFound,

    #[error("Request body exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize },

    #[error("Request body could not be read: {0}")]
    UnreadableBody(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidId(_)
            | ApiError::InvalidPage(_)
            | ApiError::InvalidQuery(_)
            | ApiError::UnreadableBody(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidId(_) => "INVALID_ID",
            ApiError::InvalidPage(_) => "INVALID_LIMIT",
            ApiError::InvalidQuery(_) => "INVALID_QUERY",
            ApiError::NotFound => "WEBHOOK_NOT_FOUND",
            ApiError::PayloadTooLarge { .. } => "PAYLOAD_TOO_LARGE",
            ApiError::UnreadableBody(_) => "INVALID_BODY",
            ApiError::Store(_) => "STORAGE_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self {
            // Storage details stay in the logs
            ApiError::Store(e) => {
                error!(error = %e, "Storage failure");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorResponse {
            message,
            code: Some(self.code().to_string()),
        };

        (self.status(), Json(body)).into_response()
    }
}
