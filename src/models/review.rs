use serde::{Deserialize, Serialize};

/// Lowest rating a review may carry
pub const MIN_RATING: i32 = 1;

/// Highest rating a review may carry
pub const MAX_RATING: i32 = 5;

/// A single review of a book
///
/// The book owns the review's lifecycle; `book_id` is a reference only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct ReviewRecord {
    pub book_id: i64,
    pub user_id: i64,
    pub rating: i32,
    pub review_text: String,
}

/// Arithmetic mean of the given ratings, `None` for an empty slice
pub fn average_rating(ratings: &[i32]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    Some(sum as f64 / ratings.len() as f64)
}
