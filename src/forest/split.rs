use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Row indices assigned to each partition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub train: Vec<usize>,
    pub holdout: Vec<usize>,
}

/// Seeded shuffle of `0..n_samples` into train and holdout partitions.
///
/// The holdout takes `ceil(n_samples * holdout_ratio)` rows but never
/// leaves the train partition empty.
pub fn train_holdout_split(n_samples: usize, holdout_ratio: f64, seed: u64) -> Partition {
    let mut indices: Vec<usize> = (0..n_samples).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_holdout = ((n_samples as f64) * holdout_ratio).ceil() as usize;
    let n_holdout = n_holdout.min(n_samples.saturating_sub(1));
    let holdout = indices.split_off(n_samples - n_holdout);

    Partition {
        train: indices,
        holdout,
    }
}

/// Mean squared error between paired predictions and labels
pub fn mean_squared_error(predictions: &[f64], labels: &[f64]) -> Option<f64> {
    if predictions.is_empty() || predictions.len() != labels.len() {
        return None;
    }
    let total: f64 = predictions
        .iter()
        .zip(labels)
        .map(|(p, y)| (p - y).powi(2))
        .sum();
    Some(total / predictions.len() as f64)
}
