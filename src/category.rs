//! The fixed set of expense categories.
//!
//! The category list is closed: it is never inferred from training data, and
//! training rows labeled outside this set are dropped before fitting.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A spending category for an expense record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Meals,
    Transportation,
    Accommodation,
    OfficeSupplies,
    Software,
    Training,
    Marketing,
    Travel,
    Other,
}

/// All categories, in their canonical order.
pub const CATEGORIES: [Category; 9] = [
    Category::Meals,
    Category::Transportation,
    Category::Accommodation,
    Category::OfficeSupplies,
    Category::Software,
    Category::Training,
    Category::Marketing,
    Category::Travel,
    Category::Other,
];

impl Category {
    /// The canonical label for this category.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Meals => "meals",
            Category::Transportation => "transportation",
            Category::Accommodation => "accommodation",
            Category::OfficeSupplies => "office_supplies",
            Category::Software => "software",
            Category::Training => "training",
            Category::Marketing => "marketing",
            Category::Travel => "travel",
            Category::Other => "other",
        }
    }

    /// Parse a label, returning `None` for anything outside the fixed set.
    pub fn parse(label: &str) -> Option<Category> {
        CATEGORIES.iter().copied().find(|c| c.as_str() == label)
    }

    /// The canonical labels as strings, for stats and metadata payloads.
    pub fn labels() -> Vec<String> {
        CATEGORIES.iter().map(|c| c.as_str().to_string()).collect()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Category::parse(s).ok_or_else(|| format!("unknown category: {s}"))
    }
}
