use axum::{
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::services::ServiceError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
}

impl From<MultipartError> for ApiError {
    fn from(e: MultipartError) -> Self {
        Self::BadRequest(format!("Malformed multipart body: {}", e))
    }
}

impl ApiError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::Service(err) => match err {
                ServiceError::NotFound { .. } => (StatusCode::NOT_FOUND, err.to_string()),
                ServiceError::InvalidReference(_) => {
                    (StatusCode::BAD_REQUEST, "Invalid incident id".to_string())
                }
                ServiceError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                ServiceError::InvalidTransition { .. } => (StatusCode::CONFLICT, err.to_string()),
                ServiceError::Storage(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Attachment storage failed".to_string(),
                ),
                ServiceError::Database(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            error!("Request failed: {}", self);
            tracing::Span::current().record("error", tracing::field::display(&self));
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}
