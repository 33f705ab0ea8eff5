use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::{BookAggregate, RatedBook},
};

/// Read-side catalog queries the recommendation engine depends on
///
/// Implementations compute `average_rating` on demand; it is `None` for books
/// without reviews.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// Every book's genre and year joined with its aggregate rating
    async fn list_books_with_aggregate_rating(&self) -> AppResult<Vec<BookAggregate>>;

    /// Books whose genre equals `genre` exactly, with aggregate ratings
    async fn list_books_by_genre(&self, genre: &str) -> AppResult<Vec<RatedBook>>;
}

/// Catalog backed by the `books` and `reviews` tables
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl CatalogStore for PgCatalog {
    async fn list_books_with_aggregate_rating(&self) -> AppResult<Vec<BookAggregate>> {
        let rows = sqlx::query_as::<_, BookAggregate>(
            r#"
            SELECT b.genre, b.year_published, AVG(r.rating)::float8 AS average_rating
            FROM books b
            LEFT JOIN reviews r ON r.book_id = b.id
            GROUP BY b.id, b.genre, b.year_published
            ORDER BY b.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(rows = rows.len(), "Loaded book aggregates");
        Ok(rows)
    }

    async fn list_books_by_genre(&self, genre: &str) -> AppResult<Vec<RatedBook>> {
        let rows = sqlx::query_as::<_, RatedBook>(
            r#"
            SELECT b.id, b.title, b.author, b.genre, b.year_published, b.summary,
                   AVG(r.rating)::float8 AS average_rating
            FROM books b
            LEFT JOIN reviews r ON r.book_id = b.id
            WHERE b.genre = $1
            GROUP BY b.id
            ORDER BY b.id
            "#,
        )
        .bind(genre)
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(genre = %genre, rows = rows.len(), "Loaded books by genre");
        Ok(rows)
    }
}
