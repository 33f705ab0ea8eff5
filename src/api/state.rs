use std::sync::Arc;

use crate::services::{Recommender, Summarizer};

/// Shared application state
///
/// Holds no mutable data; the model artifact is re-read per request so a
/// newly trained model is picked up without a restart.
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<Recommender>,
    pub summarizer: Arc<dyn Summarizer>,
}

impl AppState {
    pub fn new(recommender: Recommender, summarizer: Arc<dyn Summarizer>) -> Self {
        Self {
            recommender: Arc::new(recommender),
            summarizer,
        }
    }
}
