//! # Expense Categorizer
//!
//! A trainable expense categorization engine for business expense
//! reporting. Free-text expense records (title, description, vendor) plus
//! a numeric amount are mapped to one of nine spending categories, with a
//! confidence value and a full category score distribution so callers can
//! auto-accept confident predictions and queue uncertain ones for review.
//!
//! ## Architecture
//!
//! - Deterministic text normalization (tokenize, stop-word filter, stem)
//! - TF-IDF + random-forest pipeline, trained as a unit
//! - Rule-based keyword/amount fallback, always available
//! - Durable model store and append-only feedback log
//! - One engine orchestrating predict / train / feedback / stats

pub mod analysis;
pub mod category;
pub mod classifier;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod features;
pub mod feedback;
pub mod store;
pub mod types;

pub use category::{CATEGORIES, Category};
pub use engine::{CategorizationEngine, EngineConfig};
pub use error::{CategorizerError, Result};
pub use types::{
    EngineStats, ExpenseRecord, FeedbackEntry, PredictionResult, TrainingReport,
};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
