use serde::{Deserialize, Serialize};

/// Variance below which a node is treated as pure
const PURITY_EPSILON: f64 = 1e-10;

/// A node in a regression tree's arena
///
/// Children are referenced by their position in the tree's node list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TreeNode {
    Split {
        feature_idx: usize,
        /// Rows with `value <= threshold` go left
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        /// Mean label of the training rows that reached this leaf
        value: f64,
        n_samples: usize,
    },
}

/// CART regression tree minimizing mean squared error
///
/// Nodes live in a flat list with the root at index 0, and every child sits
/// after its parent. Walking from the root therefore always terminates, and
/// the serialized form has the same nesting depth however deep the tree grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "NodeList")]
pub struct RegressionTree {
    nodes: Vec<TreeNode>,
}

#[derive(Deserialize)]
struct NodeList {
    nodes: Vec<TreeNode>,
}

impl TryFrom<NodeList> for RegressionTree {
    type Error = String;

    fn try_from(list: NodeList) -> Result<Self, Self::Error> {
        let len = list.nodes.len();
        if len == 0 {
            return Err("regression tree has no nodes".to_string());
        }
        for (idx, node) in list.nodes.iter().enumerate() {
            if let TreeNode::Split { left, right, .. } = *node {
                let in_range = |child: usize| child > idx && child < len;
                if !in_range(left) || !in_range(right) {
                    return Err(format!("node {idx} has out-of-order children"));
                }
            }
        }
        Ok(Self { nodes: list.nodes })
    }
}

impl RegressionTree {
    /// Grows a tree over the rows selected by `indices`
    ///
    /// `indices` may repeat (bootstrap samples) and must be non-empty.
    pub fn fit(x: &[Vec<f64>], y: &[f64], indices: &[usize]) -> Self {
        let placeholder = TreeNode::Leaf {
            value: 0.0,
            n_samples: 0,
        };
        let mut nodes = vec![placeholder.clone()];
        let mut pending = vec![(0usize, indices.to_vec())];

        while let Some((slot, rows)) = pending.pop() {
            let node = match choose_split(x, y, &rows) {
                Some((feature_idx, threshold)) => {
                    let (left_rows, right_rows) = partition(x, &rows, feature_idx, threshold);
                    let left = nodes.len();
                    let right = left + 1;
                    nodes.push(placeholder.clone());
                    nodes.push(placeholder.clone());
                    pending.push((right, right_rows));
                    pending.push((left, left_rows));
                    TreeNode::Split {
                        feature_idx,
                        threshold,
                        left,
                        right,
                    }
                }
                None => TreeNode::Leaf {
                    value: mean(y, &rows),
                    n_samples: rows.len(),
                },
            };
            nodes[slot] = node;
        }

        Self { nodes }
    }

    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                TreeNode::Leaf { value, .. } => return value,
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                } => {
                    let value = row.get(feature_idx).copied().unwrap_or(0.0);
                    idx = if value <= threshold { left } else { right };
                }
            }
        }
    }

    /// Longest root-to-leaf path, counted in splits
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((idx, depth)) = stack.pop() {
            match self.nodes[idx] {
                TreeNode::Leaf { .. } => deepest = deepest.max(depth),
                TreeNode::Split { left, right, .. } => {
                    stack.push((left, depth + 1));
                    stack.push((right, depth + 1));
                }
            }
        }
        deepest
    }
}

fn mean(y: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64
}

fn variance(y: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    let m = mean(y, indices);
    indices.iter().map(|&i| (y[i] - m).powi(2)).sum::<f64>() / indices.len() as f64
}

/// Splits `indices` on `feature_idx <= threshold`
fn partition(
    x: &[Vec<f64>],
    indices: &[usize],
    feature_idx: usize,
    threshold: f64,
) -> (Vec<usize>, Vec<usize>) {
    indices
        .iter()
        .copied()
        .partition(|&i| x[i][feature_idx] <= threshold)
}

/// Best (threshold, gain) for one feature, trying midpoints between
/// consecutive distinct values
fn best_split_for_feature(
    x: &[Vec<f64>],
    y: &[f64],
    indices: &[usize],
    feature_idx: usize,
    current_variance: f64,
) -> Option<(f64, f64)> {
    let mut values: Vec<f64> = indices.iter().map(|&i| x[i][feature_idx]).collect();
    values.sort_by(f64::total_cmp);
    values.dedup();

    let n_total = indices.len() as f64;
    let mut best: Option<(f64, f64)> = None;

    for pair in values.windows(2) {
        let threshold = (pair[0] + pair[1]) / 2.0;
        let (left, right) = partition(x, indices, feature_idx, threshold);
        if left.is_empty() || right.is_empty() {
            continue;
        }

        let weighted = (left.len() as f64 / n_total) * variance(y, &left)
            + (right.len() as f64 / n_total) * variance(y, &right);
        let gain = current_variance - weighted;

        if gain > best.map_or(0.0, |(_, g)| g) {
            best = Some((threshold, gain));
        }
    }

    best
}

/// Feature and threshold with the largest variance reduction, or `None` when
/// the rows should become a leaf
fn choose_split(x: &[Vec<f64>], y: &[f64], indices: &[usize]) -> Option<(usize, f64)> {
    let current_variance = variance(y, indices);
    if indices.len() < 2 || current_variance < PURITY_EPSILON {
        return None;
    }

    let n_features = x[indices[0]].len();
    let mut best: Option<(usize, f64, f64)> = None;
    for feature_idx in 0..n_features {
        if let Some((threshold, gain)) =
            best_split_for_feature(x, y, indices, feature_idx, current_variance)
        {
            if gain > best.map_or(0.0, |(_, _, g)| g) {
                best = Some((feature_idx, threshold, gain));
            }
        }
    }

    best.map(|(feature_idx, threshold, _)| (feature_idx, threshold))
}
