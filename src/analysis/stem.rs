//! Porter-style suffix-stripping stemmer.
//!
//! Reduces English words to approximate root forms so that related tokens
//! ("training", "trained", "trains") collapse to a single feature. This is a
//! simplified rendition of the classic five-step Porter algorithm, applied
//! to lowercase alphanumeric tokens.

/// Porter-style stemmer for English tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct PorterStemmer;

impl PorterStemmer {
    /// Create a new stemmer.
    pub fn new() -> Self {
        PorterStemmer
    }

    /// Stem a single word. Words of one or two characters are returned
    /// unchanged apart from lowercasing.
    pub fn stem(&self, word: &str) -> String {
        let word = word.to_lowercase();
        if word.len() <= 2 {
            return word;
        }

        let word = step1a(&word);
        let word = step1b(&word);
        let word = step2(&word);
        let word = step3(&word);
        let word = step4(&word);
        step5(&word)
    }
}

/// Vowel test with the Porter treatment of 'y': a 'y' after a consonant
/// acts as a vowel.
fn vowel_at(word: &[u8], pos: usize) -> bool {
    match word[pos] {
        b'a' | b'e' | b'i' | b'o' | b'u' => true,
        b'y' => pos > 0 && !vowel_at(word, pos - 1),
        _ => false,
    }
}

/// The measure m of a word: the number of vowel-to-consonant transitions.
fn measure(word: &str) -> usize {
    let bytes = word.as_bytes();
    let mut m = 0;
    let mut prev_vowel = false;
    for i in 0..bytes.len() {
        let vowel = vowel_at(bytes, i);
        if prev_vowel && !vowel {
            m += 1;
        }
        prev_vowel = vowel;
    }
    m
}

fn contains_vowel(word: &str) -> bool {
    let bytes = word.as_bytes();
    (0..bytes.len()).any(|i| vowel_at(bytes, i))
}

fn ends_double_consonant(word: &str) -> bool {
    let bytes = word.as_bytes();
    let n = bytes.len();
    n >= 2 && bytes[n - 1] == bytes[n - 2] && !vowel_at(bytes, n - 1)
}

/// Consonant-vowel-consonant ending, where the final consonant is not
/// 'w', 'x', or 'y'.
fn ends_cvc(word: &str) -> bool {
    let bytes = word.as_bytes();
    let n = bytes.len();
    n >= 3
        && !vowel_at(bytes, n - 3)
        && vowel_at(bytes, n - 2)
        && !vowel_at(bytes, n - 1)
        && !matches!(bytes[n - 1], b'w' | b'x' | b'y')
}

/// Strip `suffix` and append `replacement` when the remaining stem has at
/// least the required measure.
fn replace_if(word: &str, suffix: &str, replacement: &str, min_measure: usize) -> Option<String> {
    let stem = word.strip_suffix(suffix)?;
    if measure(stem) >= min_measure {
        Some(format!("{stem}{replacement}"))
    } else {
        None
    }
}

/// Plural reduction: -sses, -ies, -ss, -s.
fn step1a(word: &str) -> String {
    if let Some(stem) = word.strip_suffix("sses") {
        format!("{stem}ss")
    } else if let Some(stem) = word.strip_suffix("ies") {
        format!("{stem}i")
    } else if word.ends_with("ss") {
        word.to_string()
    } else if word.len() > 1 && word.ends_with('s') {
        word[..word.len() - 1].to_string()
    } else {
        word.to_string()
    }
}

/// Past tense and gerund reduction: -eed, -ed, -ing.
fn step1b(word: &str) -> String {
    let reduced = if word.ends_with("eed") {
        replace_if(word, "eed", "ee", 1).unwrap_or_else(|| word.to_string())
    } else if let Some(stem) = word.strip_suffix("ed") {
        if contains_vowel(stem) {
            stem.to_string()
        } else {
            word.to_string()
        }
    } else if let Some(stem) = word.strip_suffix("ing") {
        if contains_vowel(stem) {
            stem.to_string()
        } else {
            word.to_string()
        }
    } else {
        word.to_string()
    };

    if reduced == word {
        return reduced;
    }

    // Repair the stem left behind by -ed / -ing removal.
    if reduced.ends_with("at") || reduced.ends_with("bl") || reduced.ends_with("iz") {
        format!("{reduced}e")
    } else if ends_double_consonant(&reduced)
        && !matches!(reduced.as_bytes()[reduced.len() - 1], b'l' | b's' | b'z')
    {
        reduced[..reduced.len() - 1].to_string()
    } else if measure(&reduced) == 1 && ends_cvc(&reduced) {
        format!("{reduced}e")
    } else {
        reduced
    }
}

const STEP2_SUFFIXES: &[(&str, &str)] = &[
    ("ational", "ate"),
    ("tional", "tion"),
    ("enci", "ence"),
    ("anci", "ance"),
    ("izer", "ize"),
    ("abli", "able"),
    ("alli", "al"),
    ("entli", "ent"),
    ("eli", "e"),
    ("ousli", "ous"),
    ("ization", "ize"),
    ("ation", "ate"),
    ("ator", "ate"),
    ("alism", "al"),
    ("iveness", "ive"),
    ("fulness", "ful"),
    ("ousness", "ous"),
    ("aliti", "al"),
    ("iviti", "ive"),
    ("biliti", "ble"),
];

fn step2(word: &str) -> String {
    for (suffix, replacement) in STEP2_SUFFIXES {
        if word.ends_with(suffix) {
            return replace_if(word, suffix, replacement, 1).unwrap_or_else(|| word.to_string());
        }
    }
    word.to_string()
}

const STEP3_SUFFIXES: &[(&str, &str)] = &[
    ("icate", "ic"),
    ("ative", ""),
    ("alize", "al"),
    ("iciti", "ic"),
    ("ical", "ic"),
    ("ful", ""),
    ("ness", ""),
];

fn step3(word: &str) -> String {
    for (suffix, replacement) in STEP3_SUFFIXES {
        if word.ends_with(suffix) {
            return replace_if(word, suffix, replacement, 1).unwrap_or_else(|| word.to_string());
        }
    }
    word.to_string()
}

const STEP4_SUFFIXES: &[&str] = &[
    "al", "ance", "ence", "er", "ic", "able", "ible", "ant", "ement", "ment", "ent", "ion", "ou",
    "ism", "ate", "iti", "ous", "ive", "ize",
];

fn step4(word: &str) -> String {
    for suffix in STEP4_SUFFIXES {
        if let Some(stem) = word.strip_suffix(suffix) {
            if measure(stem) > 1 {
                // -ion only drops after s or t.
                if *suffix != "ion" || stem.ends_with('s') || stem.ends_with('t') {
                    return stem.to_string();
                }
            }
        }
    }
    word.to_string()
}

/// Final -e and -ll cleanup.
fn step5(word: &str) -> String {
    let word = if let Some(stem) = word.strip_suffix('e') {
        let m = measure(stem);
        if m > 1 || (m == 1 && !ends_cvc(stem)) {
            stem.to_string()
        } else {
            word.to_string()
        }
    } else {
        word.to_string()
    };

    if word.ends_with("ll") && measure(&word) > 1 {
        word[..word.len() - 1].to_string()
    } else {
        word
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem_common_forms() {
        let stemmer = PorterStemmer::new();

        assert_eq!(stemmer.stem("running"), "run");
        assert_eq!(stemmer.stem("flies"), "fli");
        assert_eq!(stemmer.stem("agreed"), "agre");
        assert_eq!(stemmer.stem("disabled"), "disabl");
        assert_eq!(stemmer.stem("measuring"), "measur");
        assert_eq!(stemmer.stem("itemization"), "item");
        assert_eq!(stemmer.stem("sensational"), "sensat");
        assert_eq!(stemmer.stem("traditional"), "tradit");
    }

    #[test]
    fn test_short_words_unchanged() {
        let stemmer = PorterStemmer::new();
        assert_eq!(stemmer.stem("go"), "go");
        assert_eq!(stemmer.stem("AB"), "ab");
    }

    #[test]
    fn test_measure() {
        assert_eq!(measure("tree"), 0);
        assert_eq!(measure("trees"), 1);
        assert_eq!(measure("trouble"), 1);
        assert_eq!(measure("troubles"), 2);
    }

    #[test]
    fn test_cvc_excludes_wxy() {
        assert!(ends_cvc("hop"));
        assert!(!ends_cvc("snow"));
        assert!(!ends_cvc("box"));
    }
}
