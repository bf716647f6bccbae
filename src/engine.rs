//! Categorization engine: the orchestrator owning the active model.
//!
//! The engine holds the current trained model (or none) behind an
//! atomically swappable handle. Prediction is a two-tier dispatch: attempt
//! the trained pipeline when one is loaded, and on any failure of that
//! attempt use the rule-based fallback. Training rebuilds a fresh pipeline
//! from the full batch and swaps it in only on success, so a failed train
//! never leaves a partially updated model.

use std::path::PathBuf;
use std::sync::Arc;

use log::{info, warn};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::classifier::{ExpensePipeline, TfIdfForestPipeline, TrainedModel};
use crate::error::{CategorizerError, Result};
use crate::fallback::RuleBasedCategorizer;
use crate::features::FeatureBuilder;
use crate::feedback::FeedbackSink;
use crate::store::ModelStore;
use crate::types::{EngineStats, ExpenseRecord, FeedbackEntry, PredictionResult, TrainingReport};

/// Version reported before any model has been trained.
const UNTRAINED_VERSION: &str = "1.0";

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Directory holding the model artifact, metadata, and feedback log.
    pub model_dir: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::from("models"),
        }
    }
}

/// The process-wide categorization engine.
pub struct CategorizationEngine {
    features: FeatureBuilder,
    fallback: RuleBasedCategorizer,
    store: ModelStore,
    feedback: FeedbackSink,
    /// Active model; readers clone the `Arc` under a short read lock, so a
    /// train swap is atomic from their perspective.
    model: RwLock<Option<Arc<TrainedModel>>>,
}

impl CategorizationEngine {
    /// Build an engine, restoring any persisted model from the store.
    pub fn new(config: EngineConfig) -> Result<Self> {
        let store = ModelStore::open(&config.model_dir)?;
        let feedback = FeedbackSink::new(&config.model_dir);
        let model = store.load().map(Arc::new);

        Ok(Self {
            features: FeatureBuilder::new()?,
            fallback: RuleBasedCategorizer::new(),
            store,
            feedback,
            model: RwLock::new(model),
        })
    }

    fn current_model(&self) -> Option<Arc<TrainedModel>> {
        self.model.read().clone()
    }

    /// Categorize one expense record.
    ///
    /// Never fails: with no model loaded, or on any runtime failure of the
    /// trained pipeline, the rule-based fallback answers instead.
    pub fn predict(&self, record: &ExpenseRecord) -> PredictionResult {
        let Some(model) = self.current_model() else {
            return self.fallback.score(record);
        };

        let row = self.features.build_one(record);
        match model.pipeline.predict(&row) {
            Ok((category, scores)) => {
                let confidence = scores.get(&category).copied().unwrap_or(0.0);
                PredictionResult {
                    category,
                    confidence,
                    scores,
                }
            }
            Err(e) => {
                warn!("trained pipeline failed ({e}); using rule-based fallback");
                self.fallback.score(record)
            }
        }
    }

    /// Train a new model from a full batch of labeled records.
    ///
    /// On success the new model atomically replaces the active one and is
    /// persisted. Validation errors propagate without touching existing
    /// state. A persistence failure after a successful fit is reported as
    /// a distinct error: the model is live in memory, but durability
    /// across a restart is not guaranteed.
    pub fn train(&self, records: &[ExpenseRecord]) -> Result<TrainingReport> {
        info!("training model with {} samples", records.len());

        let rows = self.features.build(records);
        let mut pipeline = TfIdfForestPipeline::new();
        let report = pipeline.fit(&rows)?;

        let model = Arc::new(TrainedModel {
            pipeline,
            version: report.model_version.clone(),
            trained_at: Some(report.last_trained),
            accuracy: Some(report.accuracy),
        });

        *self.model.write() = Some(model.clone());
        info!(
            "model trained, version {}, accuracy {:.3}",
            report.model_version, report.accuracy
        );

        if let Err(e) = self.store.save(&model) {
            return Err(CategorizerError::persistence(format!(
                "model {} trained and active in memory, but saving it failed: {e}",
                report.model_version
            )));
        }

        Ok(report)
    }

    /// Append one feedback entry to the sink.
    pub fn record_feedback(&self, entry: &FeedbackEntry) -> Result<()> {
        self.feedback.record(entry)
    }

    /// Engine statistics for monitoring.
    pub fn stats(&self) -> EngineStats {
        let model = self.current_model();
        EngineStats {
            model_version: model
                .as_ref()
                .map(|m| m.version.clone())
                .unwrap_or_else(|| UNTRAINED_VERSION.to_string()),
            last_trained: model.as_ref().and_then(|m| m.trained_at),
            accuracy: model.as_ref().and_then(|m| m.accuracy),
            feedback_count: self.feedback.count(),
            categories: Category::labels(),
            has_trained_model: model.is_some(),
        }
    }

    /// Whether a trained model is currently active.
    pub fn has_model(&self) -> bool {
        self.model.read().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn engine() -> (CategorizationEngine, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig {
            model_dir: dir.path().to_path_buf(),
        };
        (CategorizationEngine::new(config).unwrap(), dir)
    }

    fn labeled(title: &str, category: &str) -> ExpenseRecord {
        ExpenseRecord {
            title: Some(title.to_string()),
            category: Some(category.to_string()),
            ..Default::default()
        }
    }

    fn training_set() -> Vec<ExpenseRecord> {
        let mut records = Vec::new();
        for i in 0..6 {
            records.push(labeled(&format!("team dinner restaurant {i}"), "meals"));
            records.push(labeled(&format!("taxi ride airport {i}"), "transportation"));
        }
        records
    }

    #[test]
    fn test_predict_without_model_uses_fallback() {
        let (engine, _dir) = engine();
        assert!(!engine.has_model());

        let result = engine.predict(&ExpenseRecord {
            title: Some("Dinner at Pizza restaurant".to_string()),
            amount: Some(15.0),
            ..Default::default()
        });
        assert_eq!(result.category, Category::Meals);
    }

    #[test]
    fn test_pipeline_failure_recovers_via_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let store = ModelStore::open(dir.path()).unwrap();

        // A persisted model whose pipeline was never fitted fails at
        // predict time; the engine must answer with the fallback.
        let broken = TrainedModel {
            pipeline: TfIdfForestPipeline::new(),
            version: "1.5".to_string(),
            trained_at: None,
            accuracy: None,
        };
        store.save(&broken).unwrap();

        let engine = CategorizationEngine::new(EngineConfig {
            model_dir: dir.path().to_path_buf(),
        })
        .unwrap();
        assert!(engine.has_model());

        let result = engine.predict(&ExpenseRecord {
            title: Some("Dinner at Pizza restaurant".to_string()),
            amount: Some(15.0),
            ..Default::default()
        });
        assert_eq!(result.category, Category::Meals);
        assert!((result.confidence - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_train_swaps_model_in() {
        let (engine, _dir) = engine();
        let report = engine.train(&training_set()).unwrap();

        assert!(engine.has_model());
        assert!((0.0..=1.0).contains(&report.accuracy));

        let result = engine.predict(&ExpenseRecord {
            title: Some("team dinner restaurant".to_string()),
            ..Default::default()
        });
        let total: f64 = result.scores.values().sum();
        assert!((total - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_failed_train_leaves_model_untouched() {
        let (engine, _dir) = engine();
        engine.train(&training_set()).unwrap();

        let probe = ExpenseRecord {
            title: Some("taxi ride airport".to_string()),
            ..Default::default()
        };
        let before = engine.predict(&probe);

        let err = engine
            .train(&training_set()[..5].to_vec())
            .unwrap_err();
        assert!(err.is_validation());

        let after = engine.predict(&probe);
        assert_eq!(before.category, after.category);
        assert_eq!(before.scores, after.scores);
    }

    #[test]
    fn test_stats_reflect_state() {
        let (engine, _dir) = engine();
        let stats = engine.stats();
        assert!(!stats.has_trained_model);
        assert_eq!(stats.model_version, "1.0");
        assert_eq!(stats.feedback_count, 0);
        assert_eq!(stats.categories.len(), 9);

        engine.train(&training_set()).unwrap();
        let stats = engine.stats();
        assert!(stats.has_trained_model);
        assert_eq!(stats.model_version, "1.12");
        assert!(stats.accuracy.is_some());
    }

    #[test]
    fn test_feedback_counted_in_stats() {
        let (engine, _dir) = engine();
        for i in 0..3 {
            let entry = FeedbackEntry::new(
                ExpenseRecord::default(),
                Category::Other,
                Category::Meals,
                0.1 * i as f64,
            );
            engine.record_feedback(&entry).unwrap();
        }
        assert_eq!(engine.stats().feedback_count, 3);
    }
}
