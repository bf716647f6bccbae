//! Trainable classification pipeline.
//!
//! The pipeline fuses a TF-IDF vectorizer and a random forest into one
//! opaque, swappable unit behind the [`ExpensePipeline`] trait. There is
//! exactly one concrete implementation; the trait keeps the substitution
//! point open for future alternatives without an inheritance hierarchy.
//!
//! Only the normalized text feature feeds the classifier. The amount
//! features are computed by the feature builder but deliberately not wired
//! into the pipeline input; the rule-based fallback is the only consumer
//! of amounts.

pub mod forest;
pub mod metrics;
pub mod split;
pub mod tfidf;
pub mod tree;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::{CategorizerError, Result};
use crate::features::FeatureRow;
use crate::types::TrainingReport;
use forest::{ForestConfig, RandomForest};
use tfidf::{TfIdfConfig, TfIdfVectorizer};

/// Minimum labeled rows required after category filtering.
pub const MIN_TRAINING_ROWS: usize = 10;

/// Share of rows held out for evaluation.
const TEST_RATIO: f64 = 0.2;

/// Seed for the train/test shuffle.
const SPLIT_SEED: u64 = 42;

/// A fitted or fittable classification pipeline.
pub trait ExpensePipeline: Send + Sync {
    /// Fit on labeled feature rows and evaluate on a held-out split.
    ///
    /// Fails without mutating state when the input is empty, carries no
    /// labels, or keeps fewer than [`MIN_TRAINING_ROWS`] rows after
    /// filtering to the fixed category set.
    fn fit(&mut self, rows: &[FeatureRow]) -> Result<TrainingReport>;

    /// Predicted category and the full per-class probability distribution
    /// for one feature row.
    fn predict(&self, row: &FeatureRow) -> Result<(Category, BTreeMap<Category, f64>)>;

    /// Name of this pipeline, for logging.
    fn name(&self) -> &str;
}

/// The fitted state: vectorizer, forest, and the class list the forest's
/// output indices refer to.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct FittedState {
    vectorizer: TfIdfVectorizer,
    forest: RandomForest,
    classes: Vec<Category>,
}

/// TF-IDF + random forest pipeline; the one concrete [`ExpensePipeline`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfIdfForestPipeline {
    tfidf_config: TfIdfConfig,
    forest_config: ForestConfig,
    fitted: Option<FittedState>,
}

impl Default for TfIdfForestPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl TfIdfForestPipeline {
    pub fn new() -> Self {
        Self {
            tfidf_config: TfIdfConfig::default(),
            forest_config: ForestConfig::default(),
            fitted: None,
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Rows whose label parses into the fixed category set, paired with
    /// the parsed category.
    fn labeled_rows<'a>(rows: &'a [FeatureRow]) -> Vec<(&'a FeatureRow, Category)> {
        rows.iter()
            .filter_map(|row| {
                row.label
                    .as_deref()
                    .and_then(Category::parse)
                    .map(|category| (row, category))
            })
            .collect()
    }
}

impl ExpensePipeline for TfIdfForestPipeline {
    fn fit(&mut self, rows: &[FeatureRow]) -> Result<TrainingReport> {
        if rows.is_empty() {
            return Err(CategorizerError::validation("no training data provided"));
        }
        if rows.iter().all(|row| row.label.is_none()) {
            return Err(CategorizerError::validation(
                "training rows are missing category labels",
            ));
        }

        let labeled = Self::labeled_rows(rows);
        if labeled.len() < MIN_TRAINING_ROWS {
            return Err(CategorizerError::validation(format!(
                "insufficient training data ({} valid rows, minimum {} required)",
                labeled.len(),
                MIN_TRAINING_ROWS
            )));
        }

        // Classes the forest will know, sorted for stable output indices.
        let mut classes: Vec<Category> = labeled.iter().map(|(_, c)| *c).collect();
        classes.sort_unstable();
        classes.dedup();
        let class_index: BTreeMap<Category, usize> = classes
            .iter()
            .enumerate()
            .map(|(idx, &c)| (c, idx))
            .collect();

        let labels: Vec<usize> = labeled.iter().map(|(_, c)| class_index[c]).collect();
        let (train_idx, test_idx) = split::train_test_split(&labels, TEST_RATIO, SPLIT_SEED);

        let train_texts: Vec<String> = train_idx
            .iter()
            .map(|&i| labeled[i].0.processed_text.clone())
            .collect();

        let mut vectorizer = TfIdfVectorizer::new(self.tfidf_config.clone());
        vectorizer.fit(&train_texts)?;

        let train_matrix: Vec<Vec<f64>> = train_texts
            .iter()
            .map(|text| vectorizer.transform(text))
            .collect::<Result<_>>()?;
        let train_labels: Vec<usize> = train_idx.iter().map(|&i| labels[i]).collect();

        let forest = RandomForest::fit(
            self.forest_config,
            &train_matrix,
            &train_labels,
            classes.len(),
        )?;

        // Evaluate on the held-out split.
        let mut truth = Vec::with_capacity(test_idx.len());
        let mut predicted = Vec::with_capacity(test_idx.len());
        for &i in &test_idx {
            let features = vectorizer.transform(&labeled[i].0.processed_text)?;
            let winner = forest.predict(&features)?;
            truth.push(labeled[i].1);
            predicted.push(classes[winner]);
        }

        let accuracy = metrics::accuracy(&truth, &predicted);
        let classification_report = metrics::classification_report(&truth, &predicted);

        self.fitted = Some(FittedState {
            vectorizer,
            forest,
            classes,
        });

        Ok(TrainingReport {
            // Audit tag, not a semantic version: major prefix plus the
            // supplied sample count.
            model_version: format!("1.{}", rows.len()),
            accuracy,
            training_samples: rows.len(),
            test_samples: test_idx.len(),
            last_trained: Utc::now(),
            classification_report,
        })
    }

    fn predict(&self, row: &FeatureRow) -> Result<(Category, BTreeMap<Category, f64>)> {
        let state = self
            .fitted
            .as_ref()
            .ok_or_else(|| CategorizerError::other("pipeline has not been fitted"))?;

        let features = state.vectorizer.transform(&row.processed_text)?;
        let proba = state.forest.predict_proba(&features)?;
        let winner = forest::argmax(&proba)
            .ok_or_else(|| CategorizerError::other("empty probability vector"))?;

        let scores: BTreeMap<Category, f64> = state
            .classes
            .iter()
            .zip(proba.iter())
            .map(|(&class, &p)| (class, p))
            .collect();

        Ok((state.classes[winner], scores))
    }

    fn name(&self) -> &str {
        "tfidf_random_forest"
    }
}

/// A fitted pipeline plus the metadata that travels with it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    pub pipeline: TfIdfForestPipeline,
    pub version: String,
    pub trained_at: Option<DateTime<Utc>>,
    pub accuracy: Option<f64>,
}
