//! Core data types shared across the categorization engine.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::category::Category;
use crate::classifier::metrics::ClassificationReport;

/// A raw expense record as supplied by callers.
///
/// All text fields are optional and default to the empty string during
/// feature construction. The amount tolerates numeric or string payloads;
/// anything unparseable coerces to zero. `category` is only present on
/// training rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpenseRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub amount: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl ExpenseRecord {
    /// The amount as a non-negative float, with missing or negative
    /// amounts treated as zero.
    pub fn amount_or_zero(&self) -> f64 {
        self.amount.unwrap_or(0.0).max(0.0)
    }

    /// Title, description, and vendor joined with single spaces, missing
    /// fields defaulting to the empty string.
    pub fn combined_text(&self) -> String {
        format!(
            "{} {} {}",
            self.title.as_deref().unwrap_or(""),
            self.description.as_deref().unwrap_or(""),
            self.vendor.as_deref().unwrap_or("")
        )
    }
}

/// Accept a number, a numeric string, or anything else (coerced to `None`).
fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }))
}

/// The result of categorizing one expense record.
///
/// For the trained classifier `scores` is a probability distribution that
/// sums to 1; for the rule-based fallback it is a heuristic weight map and
/// individual scores may exceed 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    pub category: Category,
    pub confidence: f64,
    pub scores: BTreeMap<Category, f64>,
}

/// One human-corrected prediction, appended to the feedback log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub timestamp: DateTime<Utc>,
    pub expense_data: ExpenseRecord,
    pub predicted_category: Category,
    pub actual_category: Category,
    pub confidence: f64,
}

impl FeedbackEntry {
    /// Build an entry stamped with the current time.
    pub fn new(
        expense_data: ExpenseRecord,
        predicted_category: Category,
        actual_category: Category,
        confidence: f64,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            expense_data,
            predicted_category,
            actual_category,
            confidence,
        }
    }
}

/// Summary of a successful training run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub model_version: String,
    pub accuracy: f64,
    /// Number of samples supplied by the caller, before category filtering.
    pub training_samples: usize,
    /// Size of the held-out evaluation split.
    pub test_samples: usize,
    pub last_trained: DateTime<Utc>,
    pub classification_report: ClassificationReport,
}

/// Engine statistics, as reported by `stats()`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineStats {
    pub model_version: String,
    pub last_trained: Option<DateTime<Utc>>,
    pub accuracy: Option<f64>,
    pub feedback_count: usize,
    pub categories: Vec<String>,
    pub has_trained_model: bool,
}
