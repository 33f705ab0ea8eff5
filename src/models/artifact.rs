use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{features::FeatureSchema, forest::BaggedForest};

/// Row counts and fit quality of one training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingSummary {
    /// Reviewed books that produced a training row
    pub eligible_rows: usize,
    /// Books skipped because they have no reviews
    pub skipped_unreviewed: usize,
    pub train_rows: usize,
    pub holdout_rows: usize,
    /// `None` when the holdout partition is empty
    pub holdout_mse: Option<f64>,
}

/// A fitted model together with the exact column schema it was trained on
///
/// Replaced wholesale by each training run, never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub version: Uuid,
    pub trained_at: DateTime<Utc>,
    pub schema: FeatureSchema,
    pub model: BaggedForest,
    pub summary: TrainingSummary,
}

impl ModelArtifact {
    pub fn new(schema: FeatureSchema, model: BaggedForest, summary: TrainingSummary) -> Self {
        Self {
            version: Uuid::new_v4(),
            trained_at: Utc::now(),
            schema,
            model,
            summary,
        }
    }
}
