use std::collections::BTreeSet;

use crate::models::{RecommendationQuery, TrainingRow};

use super::{FeatureSchema, FeatureVector};

/// Name of the numeric passthrough column
pub const YEAR_COLUMN: &str = "year_published";

/// Prefix of one-hot genre columns
pub const GENRE_PREFIX: &str = "genre=";

/// Anything the encoder can turn into a feature row
pub trait FeatureRow {
    fn genre(&self) -> &str;
    fn year_published(&self) -> i32;
}

impl FeatureRow for TrainingRow {
    fn genre(&self) -> &str {
        &self.genre
    }

    fn year_published(&self) -> i32 {
        self.year_published
    }
}

impl FeatureRow for RecommendationQuery {
    fn genre(&self) -> &str {
        &self.genre
    }

    fn year_published(&self) -> i32 {
        self.year_published
    }
}

/// Column name for a genre value
pub fn genre_column(genre: &str) -> String {
    format!("{GENRE_PREFIX}{genre}")
}

/// A dense feature matrix and the schema describing its columns
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedBatch {
    /// One row per input, each `schema.len()` wide
    pub matrix: Vec<Vec<f64>>,
    pub schema: FeatureSchema,
}

impl EncodedBatch {
    pub fn n_rows(&self) -> usize {
        self.matrix.len()
    }

    /// The row at `index` as a named vector
    pub fn row_vector(&self, index: usize) -> Option<FeatureVector> {
        let values = self.matrix.get(index)?;
        Some(FeatureVector::new(
            self.schema.columns().to_vec(),
            values.clone(),
        ))
    }
}

/// Encodes rows into `year_published` followed by one binary column per
/// distinct genre in the batch, genres in lexicographic order.
///
/// The schema reflects only the genres present in `rows`.
pub fn encode<R: FeatureRow>(rows: &[R]) -> EncodedBatch {
    let genres: BTreeSet<&str> = rows.iter().map(|row| row.genre()).collect();

    let mut columns = Vec::with_capacity(genres.len() + 1);
    columns.push(YEAR_COLUMN.to_string());
    columns.extend(genres.iter().map(|genre| genre_column(genre)));

    let matrix = rows
        .iter()
        .map(|row| {
            let mut values = Vec::with_capacity(columns.len());
            values.push(f64::from(row.year_published()));
            values.extend(
                genres
                    .iter()
                    .map(|genre| if *genre == row.genre() { 1.0 } else { 0.0 }),
            );
            values
        })
        .collect();

    EncodedBatch {
        matrix,
        schema: FeatureSchema::new(columns),
    }
}
