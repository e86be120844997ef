use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::typed_header::TypedHeaderRejection;
use serde_json::json;
use shareit_core::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFoundError(String),
    #[error("{0}")]
    ConflictError(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    UnknownState(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    InternalServerError(String),
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound(msg) => AppError::NotFoundError(msg),
            CoreError::Conflict(msg) => AppError::ConflictError(msg),
            e @ CoreError::InvalidInterval { .. } => AppError::ValidationError(e.to_string()),
            CoreError::InvalidArgument(msg) => AppError::UnknownState(msg),
            CoreError::NotEligible(msg) => AppError::BadRequest(msg),
            CoreError::Storage(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

impl From<TypedHeaderRejection> for AppError {
    fn from(rejection: TypedHeaderRejection) -> Self {
        AppError::BadRequest(rejection.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, description) = match self {
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, "Not found".to_string(), msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, "Conflict".to_string(), msg),
            AppError::ValidationError(msg) => {
                (StatusCode::BAD_REQUEST, "Validation failed".to_string(), msg)
            }
            // The message itself is the error title for unknown filters.
            AppError::UnknownState(msg) => (StatusCode::BAD_REQUEST, msg.clone(), msg),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "Bad request".to_string(), msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                    "Internal Server Error".to_string(),
                )
            }
        };

        if status.is_client_error() {
            tracing::debug!("Request rejected with {}: {}", status, description);
        }

        let body = Json(json!({
            "error": error,
            "description": description,
        }));

        (status, body).into_response()
    }
}
