// Error types shared by the store, the search path and the HTTP handlers

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::comparison::ComparisonError;
use crate::embeddings::{EmbeddingError, VectorError};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Embedding service error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Vector error: {0}")]
    Vector(#[from] VectorError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Cards not found: {}", .0.join(", "))]
    CardsNotFound(Vec<String>),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type AppResult<T> = std::result::Result<T, AppError>;

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) | AppError::CardsNotFound(_) => StatusCode::NOT_FOUND,
            AppError::Database(_)
            | AppError::Embedding(_)
            | AppError::Vector(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent to the client. Upstream failures are reduced to a generic line;
    /// the detail only goes to the log.
    fn public_message(&self) -> String {
        match self {
            AppError::InvalidRequest(msg) | AppError::NotFound(msg) => msg.clone(),
            AppError::CardsNotFound(_) => self.to_string(),
            AppError::Database(_) => "Storage is unavailable".to_string(),
            AppError::Embedding(_) => "Embedding service is unavailable".to_string(),
            AppError::Vector(_) | AppError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let body = match &self {
            AppError::CardsNotFound(ids) => json!({
                "error": self.public_message(),
                "missingIds": ids,
            }),
            _ => json!({ "error": self.public_message() }),
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("{field} is invalid"),
                })
            })
            .collect();
        messages.sort();
        AppError::InvalidRequest(messages.join("; "))
    }
}

impl From<ComparisonError> for AppError {
    fn from(err: ComparisonError) -> Self {
        AppError::InvalidRequest(err.to_string())
    }
}
