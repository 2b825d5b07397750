use axum::Json;
use axum::http::StatusCode;
use taskboard_core::{ErrorCode, ErrorResponse, ValidationErrors};

use crate::task::TaskServiceError;

/// Error returned by JSON API handlers. Every variant renders as the
/// standard `{"error": {...}}` body.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// One or more payload fields were rejected.
    #[error("Validation failed")]
    Validation(#[from] ValidationErrors),
    /// The request could not be read at all (malformed JSON, bad query string).
    #[error("{0}")]
    BadRequest(String),
    #[error("Task not found")]
    NotFound,
    /// Anything unexpected. Details are logged, never returned.
    #[error("Internal server error")]
    Internal,
}

impl From<TaskServiceError> for ApiError {
    fn from(err: TaskServiceError) -> Self {
        match err {
            TaskServiceError::NotFound(id) => {
                tracing::warn!("Task {} not found", id);
                ApiError::NotFound
            }
            other => {
                tracing::error!("Task operation failed: {}", other);
                ApiError::Internal
            }
        }
    }
}

impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status_code, body) = match self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::validation(errors.into_fields()),
            ),
            ApiError::BadRequest(message) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new(ErrorCode::BadRequest, message),
            ),
            ApiError::NotFound => (StatusCode::NOT_FOUND, ErrorResponse::not_found()),
            ApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, ErrorResponse::internal()),
        };
        (status_code, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use sea_orm::DbErr;
    use serde_json::json;

    async fn render(error: ApiError) -> (StatusCode, serde_json::Value) {
        let response = error.into_response();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn database_errors_are_opaque() {
        let error = ApiError::from(TaskServiceError::Database(DbErr::Custom(
            "connection refused on 10.0.0.7".to_string(),
        )));

        let (status, body) = render(error).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body,
            json!({"error": {"code": "INTERNAL_ERROR", "message": "Internal server error"}})
        );
    }

    #[tokio::test]
    async fn missing_task_maps_to_not_found() {
        let (status, body) = render(ApiError::from(TaskServiceError::NotFound(4))).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert!(body["error"].get("fields").is_none());
    }

    #[tokio::test]
    async fn bad_request_keeps_its_message() {
        let (status, body) =
            render(ApiError::BadRequest("Request body must be a JSON object".into())).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"error": {"code": "BAD_REQUEST", "message": "Request body must be a JSON object"}})
        );
    }
}
