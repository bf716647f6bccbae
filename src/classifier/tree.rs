//! Weighted classification tree used as the forest's base learner.
//!
//! Splits minimize weighted gini impurity. Each leaf stores the normalized
//! weighted class distribution of the samples that reached it, so a tree
//! prediction is itself a probability vector and the forest can average
//! distributions instead of votes.

use rand::rngs::StdRng;
use rand::seq::index::sample;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        /// Normalized weighted class distribution; sums to 1.
        distribution: Vec<f64>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    /// Number of candidate features examined per split.
    pub features_per_split: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    root: TreeNode,
    n_classes: usize,
}

impl DecisionTree {
    /// Fit a tree on the given sample indices.
    ///
    /// `samples` is the full feature matrix, `labels` are class indices in
    /// `0..n_classes`, and `weights` are per-sample weights (class-balance
    /// weights times bootstrap multiplicity).
    pub fn fit(
        samples: &[Vec<f64>],
        labels: &[usize],
        weights: &[f64],
        indices: &[usize],
        n_classes: usize,
        params: TreeParams,
        rng: &mut StdRng,
    ) -> Self {
        let root = build_node(samples, labels, weights, indices, n_classes, params, 0, rng);
        Self { root, n_classes }
    }

    /// Class distribution for one feature vector.
    pub fn predict_proba(&self, features: &[f64]) -> Vec<f64> {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { distribution } => return distribution.clone(),
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = features.get(*feature).copied().unwrap_or(0.0);
                    node = if value <= *threshold { left } else { right };
                }
            }
        }
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }
}

/// Weighted class histogram over the given indices.
fn class_weights(
    labels: &[usize],
    weights: &[f64],
    indices: &[usize],
    n_classes: usize,
) -> Vec<f64> {
    let mut counts = vec![0.0; n_classes];
    for &i in indices {
        counts[labels[i]] += weights[i];
    }
    counts
}

fn leaf_from(counts: &[f64]) -> TreeNode {
    let total: f64 = counts.iter().sum();
    let distribution = if total > 0.0 {
        counts.iter().map(|&c| c / total).collect()
    } else {
        vec![1.0 / counts.len() as f64; counts.len()]
    };
    TreeNode::Leaf { distribution }
}

/// Gini impurity of a weighted class histogram.
fn gini(counts: &[f64], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    let sum_sq: f64 = counts.iter().map(|&c| (c / total) * (c / total)).sum();
    1.0 - sum_sq
}

#[allow(clippy::too_many_arguments)]
fn build_node(
    samples: &[Vec<f64>],
    labels: &[usize],
    weights: &[f64],
    indices: &[usize],
    n_classes: usize,
    params: TreeParams,
    depth: usize,
    rng: &mut StdRng,
) -> TreeNode {
    let counts = class_weights(labels, weights, indices, n_classes);
    let positive_classes = counts.iter().filter(|&&c| c > 0.0).count();

    if depth >= params.max_depth
        || indices.len() < params.min_samples_split
        || positive_classes <= 1
    {
        return leaf_from(&counts);
    }

    match find_best_split(samples, labels, weights, indices, n_classes, params, rng) {
        Some((feature, threshold, left_indices, right_indices)) => {
            let left = build_node(
                samples,
                labels,
                weights,
                &left_indices,
                n_classes,
                params,
                depth + 1,
                rng,
            );
            let right = build_node(
                samples,
                labels,
                weights,
                &right_indices,
                n_classes,
                params,
                depth + 1,
                rng,
            );
            TreeNode::Split {
                feature,
                threshold,
                left: Box::new(left),
                right: Box::new(right),
            }
        }
        None => leaf_from(&counts),
    }
}

/// Evaluate a random feature subset and return the impurity-minimizing
/// split, if any usable split exists.
fn find_best_split(
    samples: &[Vec<f64>],
    labels: &[usize],
    weights: &[f64],
    indices: &[usize],
    n_classes: usize,
    params: TreeParams,
    rng: &mut StdRng,
) -> Option<(usize, f64, Vec<usize>, Vec<usize>)> {
    let n_features = samples.first().map(|s| s.len()).unwrap_or(0);
    if n_features == 0 {
        return None;
    }

    let n_candidates = params.features_per_split.min(n_features).max(1);
    let candidates = sample(rng, n_features, n_candidates);

    let parent_counts = class_weights(labels, weights, indices, n_classes);
    let parent_total: f64 = parent_counts.iter().sum();
    let parent_impurity = gini(&parent_counts, parent_total);

    let mut best: Option<(f64, usize, f64, usize)> = None; // (score, feature, threshold, split_at)
    let mut best_order: Vec<usize> = Vec::new();

    for feature in candidates {
        let mut order: Vec<usize> = indices.to_vec();
        order.sort_by(|&a, &b| {
            samples[a][feature]
                .partial_cmp(&samples[b][feature])
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let mut left_counts = vec![0.0; n_classes];
        let mut left_total = 0.0;

        for split_at in 1..order.len() {
            let moved = order[split_at - 1];
            left_counts[labels[moved]] += weights[moved];
            left_total += weights[moved];

            let lo = samples[order[split_at - 1]][feature];
            let hi = samples[order[split_at]][feature];
            if lo == hi {
                continue;
            }

            let right_total = parent_total - left_total;
            let right_counts: Vec<f64> = parent_counts
                .iter()
                .zip(left_counts.iter())
                .map(|(p, l)| p - l)
                .collect();

            let weighted_impurity = (left_total / parent_total) * gini(&left_counts, left_total)
                + (right_total / parent_total) * gini(&right_counts, right_total);
            let gain = parent_impurity - weighted_impurity;

            let improves = best.map(|(s, _, _, _)| gain > s).unwrap_or(gain > 1e-12);
            if improves {
                best = Some((gain, feature, (lo + hi) / 2.0, split_at));
                best_order = order.clone();
            }
        }
    }

    best.map(|(_, feature, threshold, split_at)| {
        let left = best_order[..split_at].to_vec();
        let right = best_order[split_at..].to_vec();
        (feature, threshold, left, right)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn params() -> TreeParams {
        TreeParams {
            max_depth: 16,
            min_samples_split: 2,
            features_per_split: 2,
        }
    }

    #[test]
    fn test_tree_separates_two_classes() {
        // Class 0 has feature 0 high, class 1 has feature 1 high.
        let samples = vec![
            vec![1.0, 0.0],
            vec![0.9, 0.1],
            vec![0.8, 0.0],
            vec![0.0, 1.0],
            vec![0.1, 0.9],
            vec![0.0, 0.8],
        ];
        let labels = vec![0, 0, 0, 1, 1, 1];
        let weights = vec![1.0; 6];
        let indices: Vec<usize> = (0..6).collect();

        let mut rng = StdRng::seed_from_u64(42);
        let tree = DecisionTree::fit(&samples, &labels, &weights, &indices, 2, params(), &mut rng);

        let proba = tree.predict_proba(&[1.0, 0.0]);
        assert!(proba[0] > proba[1]);

        let proba = tree.predict_proba(&[0.0, 1.0]);
        assert!(proba[1] > proba[0]);
    }

    #[test]
    fn test_leaf_distribution_sums_to_one() {
        let samples = vec![vec![0.0], vec![0.0], vec![1.0]];
        let labels = vec![0, 1, 1];
        let weights = vec![1.0, 1.0, 1.0];
        let indices = vec![0, 1, 2];

        let mut rng = StdRng::seed_from_u64(7);
        let tree = DecisionTree::fit(
            &samples,
            &labels,
            &weights,
            &indices,
            2,
            TreeParams {
                max_depth: 1,
                min_samples_split: 2,
                features_per_split: 1,
            },
            &mut rng,
        );

        let proba = tree.predict_proba(&[0.5]);
        let total: f64 = proba.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_pure_node_becomes_leaf() {
        let samples = vec![vec![0.3], vec![0.7]];
        let labels = vec![1, 1];
        let weights = vec![1.0, 1.0];
        let indices = vec![0, 1];

        let mut rng = StdRng::seed_from_u64(0);
        let tree = DecisionTree::fit(&samples, &labels, &weights, &indices, 3, params(), &mut rng);
        let proba = tree.predict_proba(&[0.5]);
        assert_eq!(proba[1], 1.0);
    }
}
