use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Insufficient data: no reviewed books available for training")]
    InsufficientData,

    #[error("Model not found. Please train the model first.")]
    ModelUnavailable,

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Timed out waiting on the catalog or model artifact")]
    CatalogTimeout,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Model fitting error: {0}")]
    Forest(#[from] crate::forest::ForestError),

    #[error("Model artifact error: {0}")]
    Artifact(String),

    #[error("External API error: {0}")]
    ExternalApi(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::InvalidQuery(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ModelUnavailable => (StatusCode::SERVICE_UNAVAILABLE, self.to_string()),
            AppError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::InsufficientData => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            AppError::CatalogTimeout => (StatusCode::GATEWAY_TIMEOUT, self.to_string()),
            AppError::ExternalApi(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::HttpClient(_) => (StatusCode::BAD_GATEWAY, self.to_string()),
            AppError::Database(_)
            | AppError::Forest(_)
            | AppError::Artifact(_)
            | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, self.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
