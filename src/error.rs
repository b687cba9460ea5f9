use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::ai::AiError;

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("AI service error: {0}")]
    Ai(#[from] AiError),

    #[error("Internal server error")]
    InternalError,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Ai(AiError::Timeout(_)) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Ai(AiError::NotConfigured) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Ai(_) => StatusCode::BAD_GATEWAY,
            AppError::Database(_) | AppError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to hand back to a client, over HTTP or the relay.
    ///
    /// Database and internal failures are logged in full and reported
    /// generically so SQL and connection details never leave the server.
    pub fn client_message(&self) -> String {
        match self {
            AppError::BadRequest(m)
            | AppError::Unauthorized(m)
            | AppError::Forbidden(m)
            | AppError::NotFound(m) => m.clone(),
            AppError::Validation(e) => format!("Invalid input: {}", e),
            AppError::Ai(AiError::Timeout(_)) => {
                "The AI assistant took too long to respond. Please try again.".to_string()
            }
            AppError::Ai(AiError::NotConfigured) => {
                "The AI assistant is not available right now.".to_string()
            }
            AppError::Ai(_) => "Failed to generate response".to_string(),
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "Failed to process message".to_string()
            }
            AppError::InternalError => "Failed to process message".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let AppError::Ai(e) = &self {
            tracing::error!("AI collaborator failure: {}", e);
        }
        let body = Json(json!({ "message": self.client_message() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::BadRequest("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Ai(AiError::Timeout(Duration::from_secs(5))).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            AppError::Ai(AiError::MalformedResponse("bad".into())).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_database_errors_are_not_leaked() {
        let err = AppError::Database(sqlx::Error::RowNotFound);
        assert_eq!(err.client_message(), "Failed to process message");
    }

    #[test]
    fn test_client_errors_keep_their_message() {
        let err = AppError::Forbidden("Cannot join this conversation".into());
        assert_eq!(err.client_message(), "Cannot join this conversation");
    }
}
