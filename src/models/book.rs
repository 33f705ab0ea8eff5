use serde::{Deserialize, Serialize};

/// A cataloged book
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct BookRecord {
    pub id: i64,
    pub title: String,
    pub author: String,
    /// Open vocabulary; compared verbatim
    pub genre: String,
    pub year_published: i32,
    pub summary: String,
}

/// A book joined with the mean of its review ratings
///
/// `average_rating` is `None` when the book has no reviews.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct RatedBook {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub book: BookRecord,
    pub average_rating: Option<f64>,
}

/// The catalog projection used for training: attributes plus the aggregate label
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct BookAggregate {
    pub genre: String,
    pub year_published: i32,
    pub average_rating: Option<f64>,
}

/// One labeled training example
///
/// Only books with at least one review become training rows.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingRow {
    pub genre: String,
    pub year_published: i32,
    pub average_rating: f64,
}

impl TrainingRow {
    /// Builds a training row, or `None` when the aggregate has no label
    pub fn from_aggregate(aggregate: BookAggregate) -> Option<Self> {
        let average_rating = aggregate.average_rating?;
        Some(Self {
            genre: aggregate.genre,
            year_published: aggregate.year_published,
            average_rating,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_training_row_requires_label() {
        let unreviewed = BookAggregate {
            genre: "Fiction".to_string(),
            year_published: 2001,
            average_rating: None,
        };
        assert_eq!(TrainingRow::from_aggregate(unreviewed), None);
    }

    #[test]
    fn test_training_row_from_reviewed_aggregate() {
        let reviewed = BookAggregate {
            genre: "Horror".to_string(),
            year_published: 1986,
            average_rating: Some(4.5),
        };
        let row = TrainingRow::from_aggregate(reviewed).unwrap();
        assert_eq!(row.genre, "Horror");
        assert_eq!(row.year_published, 1986);
        assert_eq!(row.average_rating, 4.5);
    }

    #[test]
    fn test_rated_book_serializes_flat() {
        let rated = RatedBook {
            book: BookRecord {
                id: 7,
                title: "Dune".to_string(),
                author: "Frank Herbert".to_string(),
                genre: "SciFi".to_string(),
                year_published: 1965,
                summary: String::new(),
            },
            average_rating: None,
        };

        let json = serde_json::to_value(&rated).unwrap();
        assert_eq!(json["title"], "Dune");
        assert!(json["average_rating"].is_null());
    }
}
