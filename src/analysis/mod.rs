//! Text analysis for the categorization engine.
//!
//! The normalizer is the single text transformation used at both train and
//! predict time: lowercase, split into alphanumeric tokens, drop stop words,
//! stem the survivors, and join with single spaces. It is pure and
//! deterministic, so the exact same function can be shared across threads.

pub mod stem;
pub mod stop;

use regex::Regex;

use crate::error::Result;
use stem::PorterStemmer;

/// Deterministic text normalizer shared by feature construction and
/// vectorization.
#[derive(Debug)]
pub struct TextNormalizer {
    token_pattern: Regex,
    stemmer: PorterStemmer,
}

impl TextNormalizer {
    /// Create a new normalizer.
    pub fn new() -> Result<Self> {
        let token_pattern = Regex::new(r"[a-z0-9]+")
            .map_err(|e| crate::error::CategorizerError::analysis(e.to_string()))?;
        Ok(Self {
            token_pattern,
            stemmer: PorterStemmer::new(),
        })
    }

    /// Normalize free text into a cleaned, stemmed token string.
    ///
    /// Empty or whitespace-only input yields the empty string.
    pub fn normalize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let lowered = text.to_lowercase();
        let stems: Vec<String> = self
            .token_pattern
            .find_iter(&lowered)
            .map(|m| m.as_str())
            .filter(|token| !stop::is_stop_word(token))
            .map(|token| self.stemmer.stem(token))
            .collect();

        stems.join(" ")
    }
}
