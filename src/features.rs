//! Feature construction for expense records.
//!
//! One [`FeatureRow`] is derived per record, fresh on every call, and never
//! persisted. The same builder feeds both the trainable classifier and the
//! rule-based fallback, so train-time and predict-time features cannot
//! drift apart.

use serde::{Deserialize, Serialize};

use crate::analysis::TextNormalizer;
use crate::error::Result;
use crate::types::ExpenseRecord;

/// Coarse amount bucket, by half-open boundaries at 20, 100, and 500.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AmountBucket {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl AmountBucket {
    /// Bucket a non-negative amount. Zero falls in the lowest bucket.
    pub fn from_amount(amount: f64) -> AmountBucket {
        if amount <= 20.0 {
            AmountBucket::Low
        } else if amount <= 100.0 {
            AmountBucket::Medium
        } else if amount <= 500.0 {
            AmountBucket::High
        } else {
            AmountBucket::VeryHigh
        }
    }
}

/// Derived features for one expense record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureRow {
    /// Normalized concatenation of title, description, and vendor.
    pub processed_text: String,
    /// Non-negative amount; missing or unparseable amounts are zero.
    pub amount: f64,
    /// ln(1 + amount).
    pub amount_log: f64,
    pub amount_bucket: AmountBucket,
    /// Training label, when the source record carried one.
    pub label: Option<String>,
}

/// Builds feature rows from raw expense records.
#[derive(Debug)]
pub struct FeatureBuilder {
    normalizer: TextNormalizer,
}

impl FeatureBuilder {
    pub fn new() -> Result<Self> {
        Ok(Self {
            normalizer: TextNormalizer::new()?,
        })
    }

    /// Build features for a batch of records. An empty batch yields an
    /// empty feature sequence; callers treat that as "no usable features".
    pub fn build(&self, records: &[ExpenseRecord]) -> Vec<FeatureRow> {
        records.iter().map(|r| self.build_one(r)).collect()
    }

    /// Build features for a single record.
    pub fn build_one(&self, record: &ExpenseRecord) -> FeatureRow {
        let amount = record.amount_or_zero();
        FeatureRow {
            processed_text: self.normalizer.normalize(&record.combined_text()),
            amount,
            amount_log: (1.0 + amount).ln(),
            amount_bucket: AmountBucket::from_amount(amount),
            label: record.category.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(title: &str, amount: Option<f64>) -> ExpenseRecord {
        ExpenseRecord {
            title: Some(title.to_string()),
            amount,
            ..Default::default()
        }
    }

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(AmountBucket::from_amount(0.0), AmountBucket::Low);
        assert_eq!(AmountBucket::from_amount(20.0), AmountBucket::Low);
        assert_eq!(AmountBucket::from_amount(20.01), AmountBucket::Medium);
        assert_eq!(AmountBucket::from_amount(100.0), AmountBucket::Medium);
        assert_eq!(AmountBucket::from_amount(100.01), AmountBucket::High);
        assert_eq!(AmountBucket::from_amount(500.0), AmountBucket::High);
        assert_eq!(AmountBucket::from_amount(500.01), AmountBucket::VeryHigh);
    }

    #[test]
    fn test_amount_log_is_monotonic_and_non_negative() {
        let builder = FeatureBuilder::new().unwrap();
        let amounts = [0.0, 0.5, 10.0, 250.0, 10_000.0];
        let mut previous = -1.0;
        for amount in amounts {
            let row = builder.build_one(&record("x", Some(amount)));
            assert!(row.amount_log >= 0.0);
            assert!(row.amount_log > previous);
            previous = row.amount_log;
        }
    }

    #[test]
    fn test_missing_amount_defaults_to_zero() {
        let builder = FeatureBuilder::new().unwrap();
        let row = builder.build_one(&record("Lunch", None));
        assert_eq!(row.amount, 0.0);
        assert_eq!(row.amount_log, 0.0);
        assert_eq!(row.amount_bucket, AmountBucket::Low);
    }

    #[test]
    fn test_text_fields_are_combined_and_normalized() {
        let builder = FeatureBuilder::new().unwrap();
        let record = ExpenseRecord {
            title: Some("Team Dinner".to_string()),
            description: Some("Dinner with the clients".to_string()),
            vendor: Some("Pizza Palace".to_string()),
            amount: Some(85.0),
            category: None,
        };
        let row = builder.build_one(&record);
        assert_eq!(row.processed_text, "team dinner dinner client pizza palac");
    }

    #[test]
    fn test_empty_batch_yields_empty_features() {
        let builder = FeatureBuilder::new().unwrap();
        assert!(builder.build(&[]).is_empty());
    }
}
