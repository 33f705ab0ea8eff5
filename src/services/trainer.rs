use std::sync::Arc;
use std::time::Instant;

use tracing::instrument;

use crate::{
    db::CatalogStore,
    error::{AppError, AppResult},
    features,
    forest::{
        mean_squared_error, train_holdout_split, BaggedForest, DEFAULT_N_ESTIMATORS,
        DEFAULT_RANDOM_STATE,
    },
    models::{ModelArtifact, TrainingRow, TrainingSummary},
    services::ArtifactStore,
};

/// Share of eligible rows held out from fitting
pub const HOLDOUT_RATIO: f64 = 0.2;

/// Fits the ratings model from catalog data and publishes it
///
/// Never triggered by the recommender; an operator runs it out of band.
#[derive(Clone)]
pub struct Trainer {
    catalog: Arc<dyn CatalogStore>,
    artifacts: Arc<dyn ArtifactStore>,
    n_estimators: usize,
    random_state: u64,
}

impl Trainer {
    pub fn new(catalog: Arc<dyn CatalogStore>, artifacts: Arc<dyn ArtifactStore>) -> Self {
        Self {
            catalog,
            artifacts,
            n_estimators: DEFAULT_N_ESTIMATORS,
            random_state: DEFAULT_RANDOM_STATE,
        }
    }

    /// Sets the number of trees in the forest
    pub fn with_n_estimators(mut self, n_estimators: usize) -> Self {
        self.n_estimators = n_estimators;
        self
    }

    /// Sets the seed for the split and the bootstrap samples
    pub fn with_random_state(mut self, random_state: u64) -> Self {
        self.random_state = random_state;
        self
    }

    /// Builds a new artifact from the current catalog without publishing it
    ///
    /// Fails with `InsufficientData` when no book has a review.
    #[instrument(skip(self), fields(n_estimators = self.n_estimators, random_state = self.random_state))]
    pub async fn train(&self) -> AppResult<ModelArtifact> {
        let start = Instant::now();

        // 1. Every book with its aggregate rating
        let aggregates = self.catalog.list_books_with_aggregate_rating().await?;
        let total_books = aggregates.len();

        // 2. Unreviewed books carry no label
        let rows: Vec<TrainingRow> = aggregates
            .into_iter()
            .filter_map(TrainingRow::from_aggregate)
            .collect();
        let skipped_unreviewed = total_books - rows.len();

        if rows.is_empty() {
            tracing::warn!(
                total_books,
                skipped_unreviewed,
                "No reviewed books available, training aborted"
            );
            return Err(AppError::InsufficientData);
        }

        tracing::info!(
            eligible = rows.len(),
            skipped_unreviewed,
            "Starting training"
        );

        // 3. Encode against the full training vocabulary
        let batch = features::encode(&rows);
        let labels: Vec<f64> = rows.iter().map(|row| row.average_rating).collect();

        // 4-5. Split, fit, and score the holdout off the async runtime
        let n_estimators = self.n_estimators;
        let random_state = self.random_state;
        let matrix = batch.matrix;
        let (model, summary) = tokio::task::spawn_blocking(move || {
            fit_partitioned(&matrix, &labels, n_estimators, random_state)
        })
        .await
        .map_err(|e| AppError::Internal(format!("Training task failed: {}", e)))??;

        let summary = TrainingSummary {
            skipped_unreviewed,
            ..summary
        };

        // 6. Package model with the schema it was fit on
        let artifact = ModelArtifact::new(batch.schema, model, summary);

        tracing::info!(
            version = %artifact.version,
            features = artifact.schema.len(),
            train_rows = artifact.summary.train_rows,
            holdout_rows = artifact.summary.holdout_rows,
            holdout_mse = ?artifact.summary.holdout_mse,
            elapsed_ms = start.elapsed().as_millis(),
            "Training completed"
        );

        Ok(artifact)
    }

    /// Publishes `artifact`, replacing any previous one
    pub async fn persist(&self, artifact: &ModelArtifact) -> AppResult<()> {
        self.artifacts.save(artifact).await
    }

    /// Trains and persists in one step; nothing is written on failure
    pub async fn run(&self) -> AppResult<ModelArtifact> {
        let artifact = self.train().await?;
        self.persist(&artifact).await?;
        Ok(artifact)
    }
}

/// Fits on the train partition and measures MSE on the holdout
fn fit_partitioned(
    matrix: &[Vec<f64>],
    labels: &[f64],
    n_estimators: usize,
    random_state: u64,
) -> AppResult<(BaggedForest, TrainingSummary)> {
    let partition = train_holdout_split(labels.len(), HOLDOUT_RATIO, random_state);

    let train_x: Vec<Vec<f64>> = partition.train.iter().map(|&i| matrix[i].clone()).collect();
    let train_y: Vec<f64> = partition.train.iter().map(|&i| labels[i]).collect();
    let model = BaggedForest::fit(&train_x, &train_y, n_estimators, random_state)?;

    let predictions = partition
        .holdout
        .iter()
        .map(|&i| model.predict(&matrix[i]))
        .collect::<Result<Vec<f64>, _>>()?;
    let holdout_y: Vec<f64> = partition.holdout.iter().map(|&i| labels[i]).collect();

    let summary = TrainingSummary {
        eligible_rows: labels.len(),
        skipped_unreviewed: 0,
        train_rows: partition.train.len(),
        holdout_rows: partition.holdout.len(),
        holdout_mse: mean_squared_error(&predictions, &holdout_y),
    };

    Ok((model, summary))
}
