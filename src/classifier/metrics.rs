//! Evaluation metrics for the held-out test split.
//!
//! Produces accuracy plus a per-class precision/recall/F1 report with
//! macro and support-weighted averages, in the shape downstream tooling
//! expects from a classification report.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::category::Category;

/// Precision/recall/F1 for one class (or one averaging mode).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    /// Number of true instances of this class in the test split.
    pub support: usize,
}

/// Per-class report over the evaluation split.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: BTreeMap<String, ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

/// Fraction of predictions matching the truth.
pub fn accuracy(truth: &[Category], predicted: &[Category]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let correct = truth
        .iter()
        .zip(predicted.iter())
        .filter(|(t, p)| t == p)
        .count();
    correct as f64 / truth.len() as f64
}

/// Build the full per-class report. Classes are the union of labels seen
/// in the truth and the predictions.
pub fn classification_report(truth: &[Category], predicted: &[Category]) -> ClassificationReport {
    let mut seen: Vec<Category> = truth.iter().chain(predicted.iter()).copied().collect();
    seen.sort_unstable();
    seen.dedup();

    let mut classes = BTreeMap::new();
    let mut macro_sum = (0.0, 0.0, 0.0);
    let mut weighted_sum = (0.0, 0.0, 0.0);
    let total_support: usize = truth.len();

    for class in &seen {
        let tp = pair_count(truth, predicted, |t, p| t == class && p == class);
        let fp = pair_count(truth, predicted, |t, p| t != class && p == class);
        let fn_ = pair_count(truth, predicted, |t, p| t == class && p != class);
        let support = tp + fn_;

        let precision = ratio(tp, tp + fp);
        let recall = ratio(tp, tp + fn_);
        let f1_score = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        macro_sum.0 += precision;
        macro_sum.1 += recall;
        macro_sum.2 += f1_score;
        weighted_sum.0 += precision * support as f64;
        weighted_sum.1 += recall * support as f64;
        weighted_sum.2 += f1_score * support as f64;

        classes.insert(
            class.as_str().to_string(),
            ClassMetrics {
                precision,
                recall,
                f1_score,
                support,
            },
        );
    }

    let n_classes = seen.len().max(1) as f64;
    let weight = total_support.max(1) as f64;

    ClassificationReport {
        accuracy: accuracy(truth, predicted),
        macro_avg: ClassMetrics {
            precision: macro_sum.0 / n_classes,
            recall: macro_sum.1 / n_classes,
            f1_score: macro_sum.2 / n_classes,
            support: total_support,
        },
        weighted_avg: ClassMetrics {
            precision: weighted_sum.0 / weight,
            recall: weighted_sum.1 / weight,
            f1_score: weighted_sum.2 / weight,
            support: total_support,
        },
        classes,
    }
}

fn pair_count(
    truth: &[Category],
    predicted: &[Category],
    matches: impl Fn(&Category, &Category) -> bool,
) -> usize {
    truth
        .iter()
        .zip(predicted.iter())
        .filter(|(t, p)| matches(t, p))
        .count()
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy() {
        let truth = vec![Category::Meals, Category::Travel, Category::Meals];
        let predicted = vec![Category::Meals, Category::Meals, Category::Meals];
        assert!((accuracy(&truth, &predicted) - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_perfect_predictions() {
        let truth = vec![Category::Meals, Category::Travel];
        let report = classification_report(&truth, &truth);

        assert_eq!(report.accuracy, 1.0);
        for metrics in report.classes.values() {
            assert_eq!(metrics.precision, 1.0);
            assert_eq!(metrics.recall, 1.0);
            assert_eq!(metrics.f1_score, 1.0);
        }
    }

    #[test]
    fn test_precision_recall_asymmetry() {
        // Everything predicted as meals: meals recall 1, precision 1/2.
        let truth = vec![Category::Meals, Category::Travel];
        let predicted = vec![Category::Meals, Category::Meals];
        let report = classification_report(&truth, &predicted);

        let meals = &report.classes["meals"];
        assert_eq!(meals.recall, 1.0);
        assert_eq!(meals.precision, 0.5);

        let travel = &report.classes["travel"];
        assert_eq!(travel.recall, 0.0);
        assert_eq!(travel.f1_score, 0.0);
        assert_eq!(travel.support, 1);
    }

    #[test]
    fn test_empty_split_yields_zero_accuracy() {
        assert_eq!(accuracy(&[], &[]), 0.0);
    }
}
