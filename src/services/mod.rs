pub mod artifact_store;
pub mod recommender;
pub mod summarizer;
pub mod trainer;

pub use artifact_store::{ArtifactStore, FileArtifactStore};
pub use recommender::{
    rank_candidates, score_query, QueryScore, RecommendationOutcome, Recommender,
};
pub use summarizer::{HttpSummarizer, Summarizer};
pub use trainer::{Trainer, HOLDOUT_RATIO};

#[cfg(test)]
pub use artifact_store::MockArtifactStore;
