//! Rule-based fallback categorizer.
//!
//! Always available, with no trained state: scores each category by keyword
//! hits over the raw lowercased text, then applies amount-based bonuses.
//! The scores are heuristic weights, not a normalized distribution, and an
//! amount bonus may push a score above 1. That quirk is intentional and
//! load-bearing for callers comparing fallback output across records.

use std::collections::BTreeMap;

use crate::category::Category;
use crate::types::{ExpenseRecord, PredictionResult};

/// Keyword lists per category, in the fixed iteration order used for
/// tie-breaking. `other` carries no keywords and only wins by default.
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Meals,
        &["restaurant", "food", "lunch", "dinner", "cafe", "pizza"],
    ),
    (
        Category::Transportation,
        &["uber", "taxi", "bus", "flight", "gas", "parking"],
    ),
    (
        Category::Accommodation,
        &["hotel", "airbnb", "booking", "room"],
    ),
    (
        Category::OfficeSupplies,
        &["office", "supplies", "paper", "pen", "printer"],
    ),
    (
        Category::Software,
        &["software", "app", "subscription", "license"],
    ),
    (
        Category::Training,
        &["course", "training", "workshop", "conference"],
    ),
    (
        Category::Marketing,
        &["advertising", "marketing", "promotion"],
    ),
    (Category::Travel, &["travel", "trip", "visa", "luggage"]),
];

/// Stateless keyword/amount scorer used when no trained model is available
/// or the trained pipeline fails at prediction time.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedCategorizer;

impl RuleBasedCategorizer {
    pub fn new() -> Self {
        RuleBasedCategorizer
    }

    /// Score a record against every category. Never fails.
    pub fn score(&self, record: &ExpenseRecord) -> PredictionResult {
        let text = record.combined_text().to_lowercase();
        let amount = record.amount_or_zero();

        let mut scores: BTreeMap<Category, f64> = BTreeMap::new();
        let mut winner: Option<(Category, f64)> = None;

        for (category, keywords) in CATEGORY_KEYWORDS {
            let hits = keywords.iter().filter(|kw| text.contains(*kw)).count();
            let mut score = hits as f64 / keywords.len() as f64;

            // Amount bonuses: small amounts look like meals, large ones
            // like travel and accommodation.
            if amount < 20.0 && *category == Category::Meals {
                score += 0.2;
            } else if amount > 500.0 {
                if *category == Category::Travel {
                    score += 0.3;
                } else if *category == Category::Accommodation {
                    score += 0.2;
                }
            }

            scores.insert(*category, score);

            // Strict comparison keeps the first-encountered category on ties.
            let leading = winner.map(|(_, best)| score > best).unwrap_or(true);
            if leading {
                winner = Some((*category, score));
            }
        }

        match winner {
            Some((category, confidence)) if confidence > 0.0 => PredictionResult {
                category,
                confidence,
                scores,
            },
            _ => {
                // Nothing matched at all: default to `other` with a token
                // confidence instead of an arbitrary zero-scored category.
                let mut scores = BTreeMap::new();
                scores.insert(Category::Other, 0.1);
                PredictionResult {
                    category: Category::Other,
                    confidence: 0.1,
                    scores,
                }
            }
        }
    }
}
