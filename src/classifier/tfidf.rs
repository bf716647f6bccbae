//! TF-IDF vectorizer over 1- and 2-grams of normalized text.
//!
//! The vectorizer is fitted once per training run and serialized alongside
//! the forest as part of the model artifact. Terms must appear in at least
//! `min_df` documents and in at most `max_df_ratio` of all documents; the
//! surviving vocabulary is capped at `max_features` terms by corpus
//! frequency. Vocabulary indices are assigned in sorted term order so a
//! fit is fully deterministic.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Vocabulary construction parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfIdfConfig {
    /// Maximum vocabulary size.
    pub max_features: usize,
    /// Smallest n-gram length.
    pub ngram_min: usize,
    /// Largest n-gram length.
    pub ngram_max: usize,
    /// Minimum number of documents a term must appear in.
    pub min_df: usize,
    /// Maximum fraction of documents a term may appear in.
    pub max_df_ratio: f64,
}

impl Default for TfIdfConfig {
    fn default() -> Self {
        Self {
            max_features: 1000,
            ngram_min: 1,
            ngram_max: 2,
            min_df: 2,
            max_df_ratio: 0.8,
        }
    }
}

/// TF-IDF vectorizer for normalized expense text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfIdfVectorizer {
    config: TfIdfConfig,
    /// Term -> feature index.
    vocabulary: HashMap<String, usize>,
    /// Inverse document frequency per feature index.
    idf: Vec<f64>,
    /// Number of documents seen during fitting.
    n_documents: usize,
}

impl TfIdfVectorizer {
    pub fn new(config: TfIdfConfig) -> Self {
        Self {
            config,
            vocabulary: HashMap::new(),
            idf: Vec::new(),
            n_documents: 0,
        }
    }

    /// Extract 1..=n grams from pre-normalized text.
    fn ngrams(&self, document: &str) -> Vec<String> {
        let tokens: Vec<&str> = document.split_whitespace().collect();
        let mut grams = Vec::new();
        for n in self.config.ngram_min..=self.config.ngram_max {
            if n == 0 || tokens.len() < n {
                continue;
            }
            for window in tokens.windows(n) {
                grams.push(window.join(" "));
            }
        }
        grams
    }

    /// Fit the vocabulary and IDF weights on training documents.
    pub fn fit(&mut self, documents: &[String]) -> Result<()> {
        self.n_documents = documents.len();

        let mut document_frequency: HashMap<String, usize> = HashMap::new();
        let mut corpus_frequency: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let grams = self.ngrams(doc);
            for gram in &grams {
                *corpus_frequency.entry(gram.clone()).or_insert(0) += 1;
            }
            let unique: std::collections::HashSet<_> = grams.into_iter().collect();
            for gram in unique {
                *document_frequency.entry(gram).or_insert(0) += 1;
            }
        }

        let max_df = self.config.max_df_ratio * self.n_documents as f64;
        let mut kept: Vec<(String, usize)> = document_frequency
            .iter()
            .filter(|&(_, &df)| df >= self.config.min_df && df as f64 <= max_df)
            .map(|(term, &df)| (term.clone(), df))
            .collect();

        // Cap the vocabulary by corpus frequency, ties broken
        // lexicographically for determinism.
        kept.sort_by(|a, b| {
            let fa = corpus_frequency[&a.0];
            let fb = corpus_frequency[&b.0];
            fb.cmp(&fa).then_with(|| a.0.cmp(&b.0))
        });
        kept.truncate(self.config.max_features);
        kept.sort_by(|a, b| a.0.cmp(&b.0));

        let mut vocabulary = HashMap::with_capacity(kept.len());
        let mut idf = vec![0.0; kept.len()];
        for (idx, (term, df)) in kept.into_iter().enumerate() {
            // Smoothed IDF: log((N + 1) / (df + 1)) + 1.
            idf[idx] = ((self.n_documents as f64 + 1.0) / (df as f64 + 1.0)).ln() + 1.0;
            vocabulary.insert(term, idx);
        }

        self.vocabulary = vocabulary;
        self.idf = idf;

        Ok(())
    }

    /// Transform a normalized document into a TF-IDF feature vector.
    pub fn transform(&self, document: &str) -> Result<Vec<f64>> {
        let grams = self.ngrams(document);
        let mut tf = vec![0.0; self.vocabulary.len()];

        for gram in &grams {
            if let Some(&idx) = self.vocabulary.get(gram) {
                tf[idx] += 1.0;
            }
        }

        let doc_length = grams.len() as f64;
        if doc_length > 0.0 {
            for count in &mut tf {
                *count /= doc_length;
            }
        }

        for (idx, weight) in tf.iter_mut().enumerate() {
            *weight *= self.idf[idx];
        }

        Ok(tf)
    }

    /// Number of terms kept after document-frequency filtering.
    pub fn vocabulary_size(&self) -> usize {
        self.vocabulary.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_min_df_filters_rare_terms() {
        let mut vectorizer = TfIdfVectorizer::new(TfIdfConfig::default());
        vectorizer
            .fit(&docs(&[
                "taxi airport",
                "taxi downtown",
                "hotel stay",
                "hotel night",
            ]))
            .unwrap();

        // Only "taxi" and "hotel" appear in two documents; every other
        // unigram and all bigrams are singletons.
        assert_eq!(vectorizer.vocabulary_size(), 2);
    }

    #[test]
    fn test_max_df_filters_ubiquitous_terms() {
        let config = TfIdfConfig {
            min_df: 1,
            ..Default::default()
        };
        let mut vectorizer = TfIdfVectorizer::new(config);
        vectorizer
            .fit(&docs(&["expens a", "expens b", "expens c", "expens d"]))
            .unwrap();

        // "expens" appears in all four documents (> 80%) and is dropped.
        let features = vectorizer.transform("expens").unwrap();
        assert!(features.iter().all(|&w| w == 0.0));
    }

    #[test]
    fn test_bigrams_are_indexed() {
        let config = TfIdfConfig {
            min_df: 1,
            ..Default::default()
        };
        let mut vectorizer = TfIdfVectorizer::new(config);
        vectorizer
            .fit(&docs(&["team dinner downtown", "client lunch uptown"]))
            .unwrap();

        // 6 unigrams + 4 bigrams.
        assert_eq!(vectorizer.vocabulary_size(), 10);
    }

    #[test]
    fn test_transform_is_deterministic() {
        let config = TfIdfConfig {
            min_df: 1,
            ..Default::default()
        };
        let mut vectorizer = TfIdfVectorizer::new(config);
        vectorizer
            .fit(&docs(&["taxi ride airport", "hotel room booking"]))
            .unwrap();

        let a = vectorizer.transform("taxi airport").unwrap();
        let b = vectorizer.transform("taxi airport").unwrap();
        assert_eq!(a, b);
        assert!(a.iter().any(|&w| w > 0.0));
    }

    #[test]
    fn test_max_features_caps_vocabulary() {
        let config = TfIdfConfig {
            min_df: 1,
            max_features: 3,
            ..Default::default()
        };
        let mut vectorizer = TfIdfVectorizer::new(config);
        vectorizer
            .fit(&docs(&["a b c d e f", "a b c g h i"]))
            .unwrap();
        assert_eq!(vectorizer.vocabulary_size(), 3);
    }
}
