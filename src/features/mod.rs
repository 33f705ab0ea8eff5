//! Feature encoding shared by training and serving.
//!
//! Both sides go through [`encode`]; serving additionally aligns its vector to
//! the schema persisted with the model via [`reconcile`].

mod encoder;
mod schema;

pub use encoder::{encode, genre_column, EncodedBatch, FeatureRow, GENRE_PREFIX, YEAR_COLUMN};
pub use schema::{reconcile, FeatureSchema, FeatureVector, Reconciliation};
