use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    middleware::request_id::RequestId,
    models::{RecommendationResult, SummaryRequest, SummaryResponse},
};

use super::AppState;

/// Raw query string; validated by the recommender
#[derive(Debug, Deserialize)]
pub struct RecommendationParams {
    pub genre: Option<String>,
    pub year_published: Option<String>,
}

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

/// Top books for a genre, ranked by average rating
pub async fn recommendations(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(params): Query<RecommendationParams>,
) -> AppResult<Json<Vec<RecommendationResult>>> {
    tracing::info!(
        request_id = %request_id,
        genre = ?params.genre,
        year_published = ?params.year_published,
        "Processing recommendation request"
    );

    let results = state
        .recommender
        .recommend(params.genre.as_deref(), params.year_published.as_deref())
        .await?;

    Ok(Json(results))
}

/// Free-text summary via the remote summarizer
pub async fn generate_summary(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<SummaryRequest>,
) -> AppResult<Json<SummaryResponse>> {
    let content = request
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| {
            AppError::InvalidQuery("Content is required to generate summary.".to_string())
        })?;

    tracing::info!(
        request_id = %request_id,
        content_len = content.len(),
        "Processing summary request"
    );

    let summary = state.summarizer.summarize(&content).await?;
    Ok(Json(SummaryResponse { summary }))
}
