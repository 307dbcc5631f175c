//! CART regression trees.
//!
//! Trees are stored as a flat node array with child indices and grown
//! from an explicit work stack, so deep trees never recurse. Splits are
//! chosen by the largest reduction in squared error; a row goes left when
//! its feature value is `<=` the threshold.

use rand::rngs::StdRng;
use rand::seq::index;
use serde::{Deserialize, Serialize};

/// Gains smaller than this are treated as no improvement.
const MIN_GAIN: f64 = 1e-12;

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeParams {
    /// Maximum depth (`None` grows until leaves are pure).
    pub max_depth: Option<usize>,
    /// Minimum number of rows a node needs before it may split.
    pub min_samples_split: usize,
    /// Minimum number of rows on each side of a split.
    pub min_samples_leaf: usize,
    /// Number of features considered per split (`None` = all).
    pub max_features: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// A fitted regression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    nodes: Vec<Node>,
}

/// Best split found for one node.
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    score: f64,
}

impl RegressionTree {
    /// Grows a tree on the rows selected by `indices`.
    ///
    /// `indices` may contain repeats (bootstrap resamples). Callers must
    /// pass at least one index; `rows` must be rectangular.
    pub(crate) fn fit(
        rows: &[Vec<f64>],
        targets: &[f64],
        indices: Vec<usize>,
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Self {
        let n_features = rows.first().map_or(0, Vec::len);
        let mut nodes = vec![Node::Leaf { value: 0.0 }];
        let mut stack = vec![(0usize, indices, 0usize)];

        while let Some((node_id, node_indices, depth)) = stack.pop() {
            let value = mean(targets, &node_indices);

            let can_split = node_indices.len() >= params.min_samples_split.max(2)
                && params.max_depth.is_none_or(|max| depth < max)
                && !is_pure(targets, &node_indices);

            let split = if can_split {
                best_split(rows, targets, &node_indices, n_features, params, rng)
            } else {
                None
            };

            let Some(split) = split else {
                nodes[node_id] = Node::Leaf { value };
                continue;
            };

            let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = node_indices
                .into_iter()
                .partition(|&i| rows[i][split.feature] <= split.threshold);

            let left = nodes.len();
            let right = left + 1;
            nodes.push(Node::Leaf { value: 0.0 });
            nodes.push(Node::Leaf { value: 0.0 });
            nodes[node_id] = Node::Split {
                feature: split.feature,
                threshold: split.threshold,
                left,
                right,
            };

            stack.push((right, right_indices, depth + 1));
            stack.push((left, left_indices, depth + 1));
        }

        Self { nodes }
    }

    /// Predicts one row. The row must have the fitted width.
    #[must_use]
    pub fn predict_row(&self, row: &[f64]) -> f64 {
        let mut node = 0;
        loop {
            match &self.nodes[node] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Number of nodes (splits and leaves).
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Depth of the deepest leaf (a single leaf has depth 0).
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            match &self.nodes[node] {
                Node::Leaf { .. } => max_depth = max_depth.max(depth),
                Node::Split { left, right, .. } => {
                    stack.push((*left, depth + 1));
                    stack.push((*right, depth + 1));
                }
            }
        }
        max_depth
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(targets: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| targets[i]).sum::<f64>() / indices.len() as f64
}

fn is_pure(targets: &[f64], indices: &[usize]) -> bool {
    let first = targets[indices[0]];
    indices.iter().all(|&i| targets[i] == first)
}

/// Finds the split maximizing `sum_l² / n_l + sum_r² / n_r`, which is
/// equivalent to minimizing the children's total squared error.
#[allow(clippy::cast_precision_loss)]
fn best_split(
    rows: &[Vec<f64>],
    targets: &[f64],
    indices: &[usize],
    n_features: usize,
    params: &TreeParams,
    rng: &mut StdRng,
) -> Option<SplitCandidate> {
    let n = indices.len();
    let min_leaf = params.min_samples_leaf.max(1);
    let total: f64 = indices.iter().map(|&i| targets[i]).sum();
    let parent_score = total * total / n as f64;

    let features: Vec<usize> = match params.max_features {
        Some(k) if k < n_features => index::sample(rng, n_features, k.max(1)).into_vec(),
        _ => (0..n_features).collect(),
    };

    let mut best: Option<SplitCandidate> = None;
    let mut sorted = indices.to_vec();

    for feature in features {
        sorted.sort_unstable_by(|&a, &b| rows[a][feature].total_cmp(&rows[b][feature]));

        let mut left_sum = 0.0;
        for pos in 0..n - 1 {
            left_sum += targets[sorted[pos]];

            let left_count = pos + 1;
            let right_count = n - left_count;
            if left_count < min_leaf || right_count < min_leaf {
                continue;
            }

            let here = rows[sorted[pos]][feature];
            let next = rows[sorted[pos + 1]][feature];
            if here >= next {
                continue;
            }

            let right_sum = total - left_sum;
            let score = left_sum * left_sum / left_count as f64
                + right_sum * right_sum / right_count as f64;

            if score - parent_score > MIN_GAIN && best.as_ref().is_none_or(|b| score > b.score) {
                let mut threshold = here + (next - here) / 2.0;
                if threshold >= next {
                    threshold = here;
                }
                best = Some(SplitCandidate {
                    feature,
                    threshold,
                    score,
                });
            }
        }
    }

    best
}
