//! Fixed English stop-word set.
//!
//! Common words that carry no categorization signal are removed from the
//! token stream before stemming. The list is fixed at compile time; the
//! normalizer never learns new stop words from data.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Default English stop words.
const ENGLISH_STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "as", "at", "be", "because", "been", "before", "being", "below", "between", "both", "but",
    "by", "can", "did", "do", "does", "doing", "down", "during", "each", "few", "for", "from",
    "further", "had", "has", "have", "having", "he", "her", "here", "hers", "him", "his", "how",
    "i", "if", "in", "into", "is", "it", "its", "itself", "just", "me", "more", "most", "my",
    "no", "nor", "not", "now", "of", "off", "on", "once", "only", "or", "other", "our", "ours",
    "out", "over", "own", "same", "she", "should", "so", "some", "such", "than", "that", "the",
    "their", "theirs", "them", "then", "there", "these", "they", "this", "those", "through",
    "to", "too", "under", "until", "up", "very", "was", "we", "were", "what", "when", "where",
    "which", "while", "who", "whom", "why", "will", "with", "you", "your", "yours",
];

static STOP_WORD_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ENGLISH_STOP_WORDS.iter().copied().collect());

/// Whether `word` is a member of the fixed English stop-word set.
///
/// Matching is exact; callers are expected to lowercase first.
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORD_SET.contains(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_words_are_stopped() {
        assert!(is_stop_word("the"));
        assert!(is_stop_word("and"));
        assert!(is_stop_word("at"));
    }

    #[test]
    fn test_content_words_pass() {
        assert!(!is_stop_word("restaurant"));
        assert!(!is_stop_word("hotel"));
        assert!(!is_stop_word("flight"));
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        // The normalizer lowercases before filtering.
        assert!(!is_stop_word("The"));
    }
}
