use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    db::CatalogStore,
    error::{AppError, AppResult},
    models::{
        average_rating, BookAggregate, BookRecord, RatedBook, ReviewRecord, MAX_RATING,
        MIN_RATING,
    },
};

#[derive(Default)]
struct CatalogData {
    books: Vec<BookRecord>,
    reviews: Vec<ReviewRecord>,
    next_id: i64,
}

impl CatalogData {
    fn ratings_for(&self, book_id: i64) -> Vec<i32> {
        self.reviews
            .iter()
            .filter(|r| r.book_id == book_id)
            .map(|r| r.rating)
            .collect()
    }
}

/// Catalog held in process memory, for tests and local runs
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    inner: Arc<RwLock<CatalogData>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a book and returns it with its assigned id
    pub async fn add_book(
        &self,
        title: &str,
        author: &str,
        genre: &str,
        year_published: i32,
    ) -> BookRecord {
        let mut inner = self.inner.write().await;
        inner.next_id += 1;
        let book = BookRecord {
            id: inner.next_id,
            title: title.to_string(),
            author: author.to_string(),
            genre: genre.to_string(),
            year_published,
            summary: String::new(),
        };
        inner.books.push(book.clone());
        book
    }

    /// Attaches a review to an existing book
    ///
    /// Ratings outside 1..=5 are rejected, as the `reviews` table does.
    pub async fn add_review(&self, book_id: i64, rating: i32, text: &str) -> AppResult<ReviewRecord> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(AppError::Validation(format!(
                "rating must be between {} and {}, got {}",
                MIN_RATING, MAX_RATING, rating
            )));
        }

        let mut inner = self.inner.write().await;
        if !inner.books.iter().any(|b| b.id == book_id) {
            return Err(AppError::NotFound(format!("Book {} does not exist", book_id)));
        }

        let review = ReviewRecord {
            book_id,
            user_id: 0,
            rating,
            review_text: text.to_string(),
        };
        inner.reviews.push(review.clone());
        Ok(review)
    }
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryCatalog {
    async fn list_books_with_aggregate_rating(&self) -> AppResult<Vec<BookAggregate>> {
        let inner = self.inner.read().await;
        Ok(inner
            .books
            .iter()
            .map(|book| BookAggregate {
                genre: book.genre.clone(),
                year_published: book.year_published,
                average_rating: average_rating(&inner.ratings_for(book.id)),
            })
            .collect())
    }

    async fn list_books_by_genre(&self, genre: &str) -> AppResult<Vec<RatedBook>> {
        let inner = self.inner.read().await;
        Ok(inner
            .books
            .iter()
            .filter(|book| book.genre == genre)
            .map(|book| RatedBook {
                book: book.clone(),
                average_rating: average_rating(&inner.ratings_for(book.id)),
            })
            .collect())
    }
}
