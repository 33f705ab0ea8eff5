mod artifact;
mod book;
mod recommendation;
mod review;

pub use artifact::{ModelArtifact, TrainingSummary};
pub use book::{BookAggregate, BookRecord, RatedBook, TrainingRow};
pub use recommendation::{
    RecommendationQuery, RecommendationResult, SummaryRequest, SummaryResponse,
    MAX_RECOMMENDATIONS,
};
pub use review::{average_rating, ReviewRecord, MAX_RATING, MIN_RATING};
