use std::cmp::Ordering;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tracing::instrument;

use crate::{
    db::CatalogStore,
    error::{AppError, AppResult},
    features,
    models::{
        ModelArtifact, RatedBook, RecommendationQuery, RecommendationResult, MAX_RECOMMENDATIONS,
    },
    services::ArtifactStore,
};

/// Everything a recommendation request produced
#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationOutcome {
    /// Catalog-ranked books, best first
    pub results: Vec<RecommendationResult>,
    /// Model estimate for the query; `None` if the artifact could not score it
    pub predicted_rating: Option<f64>,
    /// Query columns the trained schema does not know
    pub dropped_columns: Vec<String>,
}

/// Model-side signal for a single query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryScore {
    pub predicted_rating: Option<f64>,
    pub dropped_columns: Vec<String>,
}

/// Serves genre/year recommendations from the catalog and the trained model
#[derive(Clone)]
pub struct Recommender {
    catalog: Arc<dyn CatalogStore>,
    artifacts: Arc<dyn ArtifactStore>,
    io_timeout: Duration,
}

impl Recommender {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        artifacts: Arc<dyn ArtifactStore>,
        io_timeout: Duration,
    ) -> Self {
        Self {
            catalog,
            artifacts,
            io_timeout,
        }
    }

    /// Returns up to five books of `genre`, highest average rating first
    pub async fn recommend(
        &self,
        genre: Option<&str>,
        year_published: Option<&str>,
    ) -> AppResult<Vec<RecommendationResult>> {
        Ok(self.recommend_detailed(genre, year_published).await?.results)
    }

    /// Like [`Recommender::recommend`], also reporting the model signal
    #[instrument(skip(self))]
    pub async fn recommend_detailed(
        &self,
        genre: Option<&str>,
        year_published: Option<&str>,
    ) -> AppResult<RecommendationOutcome> {
        // 1. A trained artifact is a precondition
        let artifact = match with_timeout(self.io_timeout, self.artifacts.load()).await {
            Ok(Some(artifact)) => artifact,
            Ok(None) => {
                tracing::warn!("Recommendation requested before any model was trained");
                return Err(AppError::ModelUnavailable);
            }
            Err(AppError::CatalogTimeout) => {
                tracing::error!(timeout_ms = self.io_timeout.as_millis(), "Model artifact load timed out");
                return Err(AppError::ModelUnavailable);
            }
            Err(e) => return Err(e),
        };

        // 2. Validate inputs
        let query = RecommendationQuery::parse(genre, year_published)?;

        // 3-5. Encode, reconcile, score
        let score = score_query(&artifact, &query);

        // 6. Catalog ranking
        let candidates = with_timeout(
            self.io_timeout,
            self.catalog.list_books_by_genre(&query.genre),
        )
        .await?;
        let candidate_count = candidates.len();
        let ranked = rank_candidates(candidates);

        tracing::info!(
            genre = %query.genre,
            year_published = query.year_published,
            candidates = candidate_count,
            returned = ranked.len(),
            predicted_rating = ?score.predicted_rating,
            model_version = %artifact.version,
            "Recommendations computed"
        );

        // 7. Shape the response
        Ok(RecommendationOutcome {
            results: ranked.into_iter().map(RecommendationResult::from).collect(),
            predicted_rating: score.predicted_rating,
            dropped_columns: score.dropped_columns,
        })
    }
}

/// Encodes `query`, aligns it to the artifact's schema, and predicts
///
/// Unseen genres are dropped and logged. A model that cannot score the
/// reconciled vector yields no prediction rather than an error.
pub fn score_query(artifact: &ModelArtifact, query: &RecommendationQuery) -> QueryScore {
    let batch = features::encode(std::slice::from_ref(query));
    let Some(vector) = batch.row_vector(0) else {
        return QueryScore {
            predicted_rating: None,
            dropped_columns: Vec::new(),
        };
    };

    let reconciled = features::reconcile(&vector, &artifact.schema);
    if !reconciled.dropped.is_empty() {
        tracing::warn!(
            dropped = ?reconciled.dropped,
            model_version = %artifact.version,
            "Query uses categories unseen at training time, scoring without them"
        );
    }

    let predicted_rating = match artifact.model.predict(reconciled.vector.values()) {
        Ok(prediction) => Some(prediction),
        Err(e) => {
            tracing::error!(error = %e, model_version = %artifact.version, "Model could not score query");
            None
        }
    };

    QueryScore {
        predicted_rating,
        dropped_columns: reconciled.dropped,
    }
}

/// Sorts by descending average rating with unrated books last, keeping
/// catalog order among ties, and keeps the top five
pub fn rank_candidates(mut candidates: Vec<RatedBook>) -> Vec<RatedBook> {
    candidates.sort_by(|a, b| match (a.average_rating, b.average_rating) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });
    candidates.truncate(MAX_RECOMMENDATIONS);
    candidates
}

/// Bounds an I/O future, mapping expiry to `CatalogTimeout`
async fn with_timeout<T, F>(limit: Duration, future: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    tokio::time::timeout(limit, future)
        .await
        .map_err(|_| AppError::CatalogTimeout)?
}
