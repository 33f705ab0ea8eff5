use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

use super::RatedBook;

/// Maximum number of books returned by a recommendation request
pub const MAX_RECOMMENDATIONS: usize = 5;

/// A validated recommendation query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationQuery {
    pub genre: String,
    pub year_published: i32,
}

impl RecommendationQuery {
    /// Validates raw request parameters; both are required and the year must
    /// be an integer. The genre is kept verbatim for exact catalog matching.
    pub fn parse(genre: Option<&str>, year_published: Option<&str>) -> AppResult<Self> {
        let genre = genre
            .filter(|g| !g.trim().is_empty())
            .ok_or_else(|| AppError::InvalidQuery("genre is required".to_string()))?;

        let year = year_published
            .map(str::trim)
            .filter(|y| !y.is_empty())
            .ok_or_else(|| AppError::InvalidQuery("year_published is required".to_string()))?;

        let year_published = year.parse::<i32>().map_err(|_| {
            AppError::InvalidQuery(format!("year_published must be an integer, got '{}'", year))
        })?;

        Ok(Self {
            genre: genre.to_string(),
            year_published,
        })
    }
}

/// One entry of a recommendation response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationResult {
    pub title: String,
    pub author: String,
    pub year_published: i32,
    pub average_rating: Option<f64>,
}

impl From<RatedBook> for RecommendationResult {
    fn from(rated: RatedBook) -> Self {
        Self {
            title: rated.book.title,
            author: rated.book.author,
            year_published: rated.book.year_published,
            average_rating: rated.average_rating,
        }
    }
}

/// Request body for free-text summarization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryRequest {
    #[serde(default)]
    pub content: Option<String>,
}

/// Response body carrying a generated summary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SummaryResponse {
    pub summary: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_query() {
        let query = RecommendationQuery::parse(Some("Fiction"), Some(" 2020 ")).unwrap();
        assert_eq!(query.genre, "Fiction");
        assert_eq!(query.year_published, 2020);
    }

    #[test]
    fn test_parse_keeps_genre_verbatim() {
        let query = RecommendationQuery::parse(Some(" Fiction "), Some("2020")).unwrap();
        assert_eq!(query.genre, " Fiction ");
        assert_ne!(query.genre, "Fiction");
    }

    #[test]
    fn test_parse_requires_both_fields() {
        assert!(matches!(
            RecommendationQuery::parse(None, Some("2020")),
            Err(AppError::InvalidQuery(_))
        ));
        assert!(matches!(
            RecommendationQuery::parse(Some("Fiction"), None),
            Err(AppError::InvalidQuery(_))
        ));
        for blank in ["", "   ", "\t\n"] {
            assert!(matches!(
                RecommendationQuery::parse(Some(blank), Some("2020")),
                Err(AppError::InvalidQuery(_))
            ));
        }
    }

    #[test]
    fn test_parse_rejects_non_integer_year() {
        for year in ["twenty", "2020.5", "1e3"] {
            assert!(matches!(
                RecommendationQuery::parse(Some("Fiction"), Some(year)),
                Err(AppError::InvalidQuery(_))
            ));
        }
    }

    #[test]
    fn test_result_from_rated_book() {
        let rated = RatedBook {
            book: crate::models::BookRecord {
                id: 1,
                title: "Emma".to_string(),
                author: "Jane Austen".to_string(),
                genre: "Fiction".to_string(),
                year_published: 1815,
                summary: "A matchmaker errs.".to_string(),
            },
            average_rating: Some(4.5),
        };
        let result = RecommendationResult::from(rated);
        assert_eq!(result.title, "Emma");
        assert_eq!(result.author, "Jane Austen");
        assert_eq!(result.year_published, 1815);
        assert_eq!(result.average_rating, Some(4.5));
    }
}
