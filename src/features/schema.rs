use serde::{Deserialize, Serialize};

/// Ordered feature column names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureSchema(Vec<String>);

impl FeatureSchema {
    pub fn new(columns: Vec<String>) -> Self {
        Self(columns)
    }

    pub fn columns(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.0.iter().any(|c| c == column)
    }
}

/// Numeric values keyed by column name, in column order
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    columns: Vec<String>,
    values: Vec<f64>,
}

impl FeatureVector {
    /// Pairs `columns` with `values`; extra entries on either side are ignored
    pub fn new(mut columns: Vec<String>, mut values: Vec<f64>) -> Self {
        let len = columns.len().min(values.len());
        columns.truncate(len);
        values.truncate(len);
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.values[i])
    }
}

/// Outcome of aligning a vector to a trained schema
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    /// Laid out exactly as the trained schema
    pub vector: FeatureVector,
    /// Trained columns the input lacked, filled with 0
    pub filled: Vec<String>,
    /// Input columns the trained schema does not know
    pub dropped: Vec<String>,
}

impl Reconciliation {
    /// True when the input already matched the schema
    pub fn is_exact(&self) -> bool {
        self.filled.is_empty() && self.dropped.is_empty()
    }
}

/// Aligns `vector` to `schema`: missing trained columns become 0, unknown
/// columns are dropped, and the result follows the schema's order.
pub fn reconcile(vector: &FeatureVector, schema: &FeatureSchema) -> Reconciliation {
    let mut filled = Vec::new();
    let values = schema
        .columns()
        .iter()
        .map(|column| match vector.get(column) {
            Some(value) => value,
            None => {
                filled.push(column.clone());
                0.0
            }
        })
        .collect();

    let dropped = vector
        .columns()
        .iter()
        .filter(|column| !schema.contains(column))
        .cloned()
        .collect();

    Reconciliation {
        vector: FeatureVector::new(schema.columns().to_vec(), values),
        filled,
        dropped,
    }
}
