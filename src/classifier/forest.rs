//! Random forest classifier over TF-IDF features.
//!
//! 100 bootstrap-sampled trees with sqrt feature subsampling per split and
//! balanced class weights. Every tree draws its randomness from a seed
//! derived from the forest seed and the tree index, so fitting is
//! deterministic regardless of how rayon schedules the tree builds.

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::classifier::tree::{DecisionTree, TreeParams};
use crate::error::{CategorizerError, Result};

/// Forest hyperparameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_trees: usize,
    pub seed: u64,
    pub max_depth: usize,
    pub min_samples_split: usize,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            seed: 42,
            max_depth: 16,
            min_samples_split: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
    n_classes: usize,
}

impl RandomForest {
    /// Fit a forest on the full training matrix.
    ///
    /// `labels` are class indices in `0..n_classes`. Per-sample weights are
    /// balanced inversely to class frequency, mitigating skew when some
    /// categories are rare.
    pub fn fit(
        config: ForestConfig,
        samples: &[Vec<f64>],
        labels: &[usize],
        n_classes: usize,
    ) -> Result<Self> {
        if samples.is_empty() || samples.len() != labels.len() {
            return Err(CategorizerError::validation(
                "forest requires a non-empty, label-aligned sample matrix",
            ));
        }

        let weights = balanced_weights(labels, n_classes);
        let n_features = samples[0].len();
        let params = TreeParams {
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            features_per_split: (n_features as f64).sqrt().ceil() as usize,
        };

        let trees: Vec<DecisionTree> = (0..config.n_trees)
            .into_par_iter()
            .map(|tree_index| {
                let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(tree_index as u64));
                let bootstrap: Vec<usize> = (0..samples.len())
                    .map(|_| rng.random_range(0..samples.len()))
                    .collect();
                DecisionTree::fit(
                    samples, labels, &weights, &bootstrap, n_classes, params, &mut rng,
                )
            })
            .collect();

        Ok(Self {
            config,
            trees,
            n_classes,
        })
    }

    /// Mean of the per-tree class distributions; sums to 1 within
    /// floating-point tolerance.
    pub fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>> {
        if self.trees.is_empty() {
            return Err(CategorizerError::other("forest has no fitted trees"));
        }

        let mut mean = vec![0.0; self.n_classes];
        for tree in &self.trees {
            let proba = tree.predict_proba(features);
            for (m, p) in mean.iter_mut().zip(proba.iter()) {
                *m += p;
            }
        }
        for m in &mut mean {
            *m /= self.trees.len() as f64;
        }
        Ok(mean)
    }

    /// Index of the most probable class; ties resolve to the lowest index.
    pub fn predict(&self, features: &[f64]) -> Result<usize> {
        let proba = self.predict_proba(features)?;
        argmax(&proba).ok_or_else(|| CategorizerError::other("empty probability vector"))
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }
}

/// First index holding the maximum value; `None` for an empty slice.
/// Strict comparison keeps the lowest index on ties.
pub(crate) fn argmax(proba: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (idx, &p) in proba.iter().enumerate() {
        if best.map_or(true, |b| p > proba[b]) {
            best = Some(idx);
        }
    }
    best
}

/// Balanced class weights: `n_samples / (n_present_classes * count[c])`.
fn balanced_weights(labels: &[usize], n_classes: usize) -> Vec<f64> {
    let mut counts = vec![0usize; n_classes];
    for &label in labels {
        counts[label] += 1;
    }
    let present = counts.iter().filter(|&&c| c > 0).count().max(1);
    let n = labels.len() as f64;

    labels
        .iter()
        .map(|&label| n / (present as f64 * counts[label] as f64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_cluster_data() -> (Vec<Vec<f64>>, Vec<usize>) {
        let mut samples = Vec::new();
        let mut labels = Vec::new();
        for i in 0..8 {
            let jitter = i as f64 * 0.01;
            samples.push(vec![1.0 - jitter, jitter]);
            labels.push(0);
            samples.push(vec![jitter, 1.0 - jitter]);
            labels.push(1);
        }
        (samples, labels)
    }

    #[test]
    fn test_forest_learns_separable_classes() {
        let (samples, labels) = two_cluster_data();
        let config = ForestConfig {
            n_trees: 25,
            ..Default::default()
        };
        let forest = RandomForest::fit(config, &samples, &labels, 2).unwrap();

        assert_eq!(forest.predict(&[0.95, 0.05]).unwrap(), 0);
        assert_eq!(forest.predict(&[0.05, 0.95]).unwrap(), 1);
    }

    #[test]
    fn test_probabilities_sum_to_one() {
        let (samples, labels) = two_cluster_data();
        let forest = RandomForest::fit(ForestConfig::default(), &samples, &labels, 2).unwrap();

        let proba = forest.predict_proba(&[0.5, 0.5]).unwrap();
        let total: f64 = proba.iter().sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_fit_is_deterministic() {
        let (samples, labels) = two_cluster_data();
        let a = RandomForest::fit(ForestConfig::default(), &samples, &labels, 2).unwrap();
        let b = RandomForest::fit(ForestConfig::default(), &samples, &labels, 2).unwrap();

        let pa = a.predict_proba(&[0.3, 0.7]).unwrap();
        let pb = b.predict_proba(&[0.3, 0.7]).unwrap();
        assert_eq!(pa, pb);
    }

    #[test]
    fn test_argmax_tie_prefers_lowest_index() {
        assert_eq!(argmax(&[0.25, 0.4, 0.4]), Some(1));
        assert_eq!(argmax(&[0.5, 0.5]), Some(0));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_empty_input_rejected() {
        let result = RandomForest::fit(ForestConfig::default(), &[], &[], 2);
        assert!(result.is_err());
    }

    #[test]
    fn test_balanced_weights_upweight_rare_class() {
        let labels = vec![0, 0, 0, 1];
        let weights = balanced_weights(&labels, 2);
        assert!(weights[3] > weights[0]);
        // Total weight per class is equal.
        let class0: f64 = weights[..3].iter().sum();
        let class1 = weights[3];
        assert!((class0 - class1).abs() < 1e-9);
    }
}
